//! Calculation-tree handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use validator::Validate;

use crate::handlers::ApiResponse;
use crate::middleware::auth::CurrentUser;
use crate::AppState;
use calctree_common::{
    calc::CalculationTreeNode,
    db::models::{Calculation, Operation},
    errors::{AppError, Result},
};

#[derive(Debug, Deserialize, Validate)]
pub struct StartCalculationRequest {
    #[validate(range(min = -1_000_000.0, max = 1_000_000.0))]
    pub operand: f64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddOperationRequest {
    pub operation: Operation,

    #[validate(range(min = -1_000_000.0, max = 1_000_000.0))]
    pub operand: f64,
}

/// Only the four arithmetic symbols may be attached to a parent
fn ensure_arithmetic(operation: Operation) -> Result<()> {
    if matches!(operation, Operation::Start) {
        return Err(AppError::InvalidOperation {
            operation: operation.symbol().to_string(),
        });
    }
    Ok(())
}

/// Fetch the whole forest as nested trees (public, no auth required)
pub async fn get_calculations(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<CalculationTreeNode>>>> {
    let forest = state.calc.forest().await?;

    Ok(Json(ApiResponse::new(
        forest,
        "Calculations fetched successfully",
    )))
}

/// Create a starting number (auth required)
pub async fn create_starting_number(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<StartCalculationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Calculation>>)> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let node = state.calc.start_calculation(user.id, request.operand).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(node, "Starting number created successfully")),
    ))
}

/// Attach an operation to an existing calculation (auth required)
pub async fn add_operation(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(parent_id): Path<i64>,
    Json(request): Json<AddOperationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Calculation>>)> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;
    ensure_arithmetic(request.operation)?;

    let node = state
        .calc
        .reply_with_operation(parent_id, user.id, request.operation, request.operand)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(node, "Operation added successfully")),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_body_parses_symbols() {
        let request: AddOperationRequest =
            serde_json::from_str(r#"{"operation": "/", "operand": 3}"#).unwrap();
        assert_eq!(request.operation, Operation::Divide);
        assert_eq!(request.operand, 3.0);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_reply_body_rejects_unknown_symbol() {
        assert!(serde_json::from_str::<AddOperationRequest>(
            r#"{"operation": "^", "operand": 2}"#
        )
        .is_err());
    }

    #[test]
    fn test_operand_range_is_validated_at_the_boundary() {
        let request: StartCalculationRequest =
            serde_json::from_str(r#"{"operand": 1000001}"#).unwrap();
        assert!(request.validate().is_err());

        let request: StartCalculationRequest =
            serde_json::from_str(r#"{"operand": -1000000}"#).unwrap();
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_start_symbol_is_not_a_reply_operation() {
        let request: AddOperationRequest =
            serde_json::from_str(r#"{"operation": "start", "operand": 5}"#).unwrap();
        assert!(matches!(
            ensure_arithmetic(request.operation),
            Err(AppError::InvalidOperation { .. })
        ));

        for op in [
            Operation::Add,
            Operation::Subtract,
            Operation::Multiply,
            Operation::Divide,
        ] {
            assert!(ensure_arithmetic(op).is_ok());
        }
    }

    #[test]
    fn test_non_finite_operand_is_rejected_by_serde() {
        assert!(serde_json::from_str::<StartCalculationRequest>(r#"{"operand": NaN}"#).is_err());
    }
}
