//! Calculation node entity
//!
//! One row per node of the calculation forest. Rows are append-only: a node
//! is never updated after creation, and removal happens only through the
//! `ON DELETE CASCADE` constraint on `parent_id`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// The operation a node applies to its parent's result.
///
/// `Start` is only valid on root nodes, where `result = operand`; the four
/// arithmetic symbols are only valid on replies.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum Operation {
    #[sea_orm(string_value = "start")]
    #[serde(rename = "start")]
    Start,

    #[sea_orm(string_value = "+")]
    #[serde(rename = "+")]
    Add,

    #[sea_orm(string_value = "-")]
    #[serde(rename = "-")]
    Subtract,

    #[sea_orm(string_value = "*")]
    #[serde(rename = "*")]
    Multiply,

    #[sea_orm(string_value = "/")]
    #[serde(rename = "/")]
    Divide,
}

impl Operation {
    /// The wire symbol for this operation
    pub fn symbol(&self) -> &'static str {
        match self {
            Operation::Start => "start",
            Operation::Add => "+",
            Operation::Subtract => "-",
            Operation::Multiply => "*",
            Operation::Divide => "/",
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "calculations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// NULL for roots; otherwise the node this operation applies to
    pub parent_id: Option<i64>,

    pub user_id: i64,

    pub operation: Operation,

    /// For `start`, the initial value; otherwise the right-hand operand
    pub operand: f64,

    /// Derived value, computed server-side and persisted verbatim
    pub result: f64,

    /// 0 for roots, parent.depth + 1 otherwise
    pub depth: i32,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_serde_symbols() {
        assert_eq!(serde_json::to_string(&Operation::Add).unwrap(), "\"+\"");
        assert_eq!(serde_json::to_string(&Operation::Start).unwrap(), "\"start\"");

        let op: Operation = serde_json::from_str("\"/\"").unwrap();
        assert_eq!(op, Operation::Divide);
    }

    #[test]
    fn test_operation_rejects_unknown_symbol() {
        assert!(serde_json::from_str::<Operation>("\"%\"").is_err());
    }

    #[test]
    fn test_symbol_roundtrip() {
        for op in [
            Operation::Start,
            Operation::Add,
            Operation::Subtract,
            Operation::Multiply,
            Operation::Divide,
        ] {
            let json = format!("\"{}\"", op.symbol());
            assert_eq!(serde_json::from_str::<Operation>(&json).unwrap(), op);
        }
    }
}
