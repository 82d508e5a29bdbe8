//! Tree assembler: turns the flat calculation rows into a forest.
//!
//! Pure and allocation-only, linear in the number of rows. Child lists are
//! reconstructed here on every read; they are never persisted.

use crate::db::models::Operation;
use crate::db::CalculationRow;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::Serialize;
use std::collections::HashMap;

/// A calculation annotated with its author name and nested children
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculationTreeNode {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub user_id: i64,
    pub username: String,
    pub operation: Operation,
    pub operand: f64,
    pub result: f64,
    pub depth: i32,
    pub created_at: DateTimeWithTimeZone,
    pub children: Vec<CalculationTreeNode>,
}

impl From<CalculationRow> for CalculationTreeNode {
    fn from(row: CalculationRow) -> Self {
        Self {
            id: row.calculation.id,
            parent_id: row.calculation.parent_id,
            user_id: row.calculation.user_id,
            username: row.username,
            operation: row.calculation.operation,
            operand: row.calculation.operand,
            result: row.calculation.result,
            depth: row.calculation.depth,
            created_at: row.calculation.created_at,
            children: Vec::new(),
        }
    }
}

/// Build the forest from rows in ascending creation order.
///
/// Arena construction: the rows become an indexed arena, parent-child edges
/// are wired as indices, and the nested structure is assembled by moving
/// nodes out of the arena. Children and roots keep the input order.
///
/// A row whose `parent_id` is absent from the input is treated as a root.
/// The store's foreign key makes that unreachable in practice, but a
/// partial snapshot must not fail assembly.
pub fn build_forest(rows: Vec<CalculationRow>) -> Vec<CalculationTreeNode> {
    let index: HashMap<i64, usize> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| (row.calculation.id, i))
        .collect();

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); rows.len()];
    let mut roots: Vec<usize> = Vec::new();

    for (i, row) in rows.iter().enumerate() {
        match row
            .calculation
            .parent_id
            .and_then(|pid| index.get(&pid).copied())
        {
            Some(parent) if parent != i => children[parent].push(i),
            _ => roots.push(i),
        }
    }

    let mut arena: Vec<Option<CalculationTreeNode>> =
        rows.into_iter().map(|row| Some(row.into())).collect();

    roots
        .into_iter()
        .map(|root| assemble(root, &children, &mut arena))
        .collect()
}

fn assemble(
    i: usize,
    children: &[Vec<usize>],
    arena: &mut Vec<Option<CalculationTreeNode>>,
) -> CalculationTreeNode {
    // every index lands in `roots` or exactly one child list
    let mut node = arena[i].take().expect("arena indices are unique");
    node.children = children[i]
        .iter()
        .map(|&child| assemble(child, children, arena))
        .collect();
    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::Calculation;
    use chrono::TimeZone;

    fn row(id: i64, parent_id: Option<i64>, depth: i32) -> CalculationRow {
        CalculationRow {
            calculation: Calculation {
                id,
                parent_id,
                user_id: 1,
                operation: if parent_id.is_none() {
                    Operation::Start
                } else {
                    Operation::Add
                },
                operand: 1.0,
                result: 1.0,
                depth,
                created_at: chrono::Utc.timestamp_opt(1_700_000_000 + id, 0).unwrap().into(),
            },
            username: "alice".to_string(),
        }
    }

    #[test]
    fn test_single_root_with_two_children() {
        let forest = build_forest(vec![
            row(1, None, 0),
            row(2, Some(1), 1),
            row(3, Some(1), 1),
        ]);

        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].id, 1);
        let child_ids: Vec<i64> = forest[0].children.iter().map(|c| c.id).collect();
        assert_eq!(child_ids, vec![2, 3]);
        assert!(forest[0].children.iter().all(|c| c.children.is_empty()));
    }

    #[test]
    fn test_empty_input() {
        assert!(build_forest(Vec::new()).is_empty());
    }

    #[test]
    fn test_multiple_roots_keep_creation_order() {
        let forest = build_forest(vec![row(1, None, 0), row(2, None, 0), row(3, Some(2), 1)]);

        let root_ids: Vec<i64> = forest.iter().map(|n| n.id).collect();
        assert_eq!(root_ids, vec![1, 2]);
        assert_eq!(forest[1].children[0].id, 3);
    }

    #[test]
    fn test_deep_chain() {
        let mut rows = vec![row(1, None, 0)];
        for id in 2..=51 {
            rows.push(row(id, Some(id - 1), (id - 1) as i32));
        }

        let forest = build_forest(rows);
        assert_eq!(forest.len(), 1);

        let mut node = &forest[0];
        let mut depth = 0;
        while let Some(child) = node.children.first() {
            node = child;
            depth += 1;
        }
        assert_eq!(depth, 50);
        assert_eq!(node.id, 51);
    }

    #[test]
    fn test_orphan_is_demoted_to_root() {
        let forest = build_forest(vec![row(1, None, 0), row(7, Some(99), 1)]);

        let root_ids: Vec<i64> = forest.iter().map(|n| n.id).collect();
        assert_eq!(root_ids, vec![1, 7]);
    }

    #[test]
    fn test_deterministic_given_same_input() {
        let rows = vec![row(1, None, 0), row(2, Some(1), 1), row(3, Some(1), 1)];
        assert_eq!(build_forest(rows.clone()), build_forest(rows));
    }
}
