//! Calculation core: result engine, tree assembly, and the service that
//! orchestrates creation.

pub mod engine;
pub mod tree;

pub use engine::{MAX_DEPTH, VALUE_LIMIT};
pub use tree::{build_forest, CalculationTreeNode};

use crate::db::models::{Calculation, Operation};
use crate::db::Repository;
use crate::errors::{AppError, Result};
use crate::metrics;

/// Orchestrates calculation creation and reads.
///
/// Each operation is a single business transaction: load, compute, write.
/// A rejection at any step leaves zero writes behind.
#[derive(Clone)]
pub struct CalculationService {
    repo: Repository,
}

impl CalculationService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Read the full forest in creation order
    pub async fn forest(&self) -> Result<Vec<CalculationTreeNode>> {
        let rows = self.repo.all_calculations().await?;
        Ok(build_forest(rows))
    }

    /// Create a root node holding a starting value
    pub async fn start_calculation(&self, user_id: i64, operand: f64) -> Result<Calculation> {
        ensure_operand_in_range(operand)?;

        let node = self.repo.insert_root_calculation(user_id, operand).await?;
        metrics::record_calculation_created("start");

        tracing::info!(id = node.id, user_id, operand, "Starting number created");
        Ok(node)
    }

    /// Attach an operation to an existing node.
    ///
    /// Check order is user-visible: operand range, then parent lookup, then
    /// depth, then arithmetic. Each short-circuits the rest.
    pub async fn reply_with_operation(
        &self,
        parent_id: i64,
        user_id: i64,
        operation: Operation,
        operand: f64,
    ) -> Result<Calculation> {
        ensure_operand_in_range(operand)?;

        let parent = self
            .repo
            .find_calculation(parent_id)
            .await?
            .ok_or(AppError::ParentNotFound { id: parent_id })?;

        let depth = next_depth(parent.depth)?;

        let result = engine::apply(parent.result, operation, operand).inspect_err(|err| {
            metrics::record_calculation_rejected(match err {
                AppError::DivisionByZero => "division_by_zero",
                AppError::ResultLimitExceeded => "result_limit",
                _ => "invalid_operation",
            });
        })?;

        let node = self
            .repo
            .insert_child_calculation(parent_id, user_id, operation, operand, result, depth)
            .await?;
        metrics::record_calculation_created("reply");

        tracing::info!(
            id = node.id,
            parent_id,
            user_id,
            operation = operation.symbol(),
            result,
            "Operation added"
        );
        Ok(node)
    }
}

fn ensure_operand_in_range(operand: f64) -> Result<()> {
    if !operand.is_finite() || operand.abs() > VALUE_LIMIT {
        metrics::record_calculation_rejected("operand_range");
        return Err(AppError::OperandOutOfRange { value: operand });
    }
    Ok(())
}

fn next_depth(parent_depth: i32) -> Result<i32> {
    let depth = parent_depth + 1;
    if depth > MAX_DEPTH {
        metrics::record_calculation_rejected("depth_limit");
        return Err(AppError::DepthLimitExceeded { limit: MAX_DEPTH });
    }
    Ok(depth)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operand_range_check() {
        assert!(ensure_operand_in_range(0.0).is_ok());
        assert!(ensure_operand_in_range(1_000_000.0).is_ok());
        assert!(ensure_operand_in_range(-1_000_000.0).is_ok());

        assert!(matches!(
            ensure_operand_in_range(1_000_000.01),
            Err(AppError::OperandOutOfRange { .. })
        ));
        assert!(matches!(
            ensure_operand_in_range(f64::NAN),
            Err(AppError::OperandOutOfRange { .. })
        ));
        assert!(matches!(
            ensure_operand_in_range(f64::INFINITY),
            Err(AppError::OperandOutOfRange { .. })
        ));
    }

    #[test]
    fn test_depth_limit() {
        assert_eq!(next_depth(0).unwrap(), 1);
        assert_eq!(next_depth(49).unwrap(), 50);
        assert!(matches!(
            next_depth(50),
            Err(AppError::DepthLimitExceeded { limit: 50 })
        ));
    }
}
