//! Result engine: applies one operation to a parent value and an operand.
//!
//! Pure and deterministic, no I/O, no shared state. Every branch rounds to
//! 2 decimal places (half away from zero on the scaled value) and then
//! enforces the ±1,000,000 bound on the rounded result.

use crate::db::models::Operation;
use crate::errors::{AppError, Result};

/// Closed bound on operands and results
pub const VALUE_LIMIT: f64 = 1_000_000.0;

/// Maximum chain length from a root
pub const MAX_DEPTH: i32 = 50;

/// Compute the outcome of applying `operation` to `left` and `right`.
pub fn apply(left: f64, operation: Operation, right: f64) -> Result<f64> {
    let raw = match operation {
        Operation::Add => left + right,
        Operation::Subtract => left - right,
        Operation::Multiply => left * right,
        Operation::Divide => {
            if right == 0.0 {
                return Err(AppError::DivisionByZero);
            }
            left / right
        }
        // `start` carries a value, it is not applied to anything
        Operation::Start => {
            return Err(AppError::InvalidOperation {
                operation: operation.symbol().to_string(),
            })
        }
    };

    let rounded = round_to_cents(raw);

    if !rounded.is_finite() || rounded.abs() > VALUE_LIMIT {
        return Err(AppError::ResultLimitExceeded);
    }

    Ok(rounded)
}

/// Round to 2 decimal places, half away from zero on the scaled value
fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_arithmetic() {
        assert_eq!(apply(100.0, Operation::Add, 50.0).unwrap(), 150.0);
        assert_eq!(apply(100.0, Operation::Subtract, 150.0).unwrap(), -50.0);
        assert_eq!(apply(12.0, Operation::Multiply, 3.0).unwrap(), 36.0);
        assert_eq!(apply(12.0, Operation::Divide, 4.0).unwrap(), 3.0);
    }

    #[test]
    fn test_division_rounds_to_two_decimals() {
        assert_eq!(apply(10.0, Operation::Divide, 3.0).unwrap(), 3.33);
        assert_eq!(apply(1.0, Operation::Divide, 3.0).unwrap(), 0.33);
        assert_eq!(apply(-10.0, Operation::Divide, 3.0).unwrap(), -3.33);
    }

    #[test]
    fn test_rounds_half_away_from_zero() {
        // 0.125 and 12.5 are exactly representable, so the half case is real
        assert_eq!(apply(0.0, Operation::Add, 0.125).unwrap(), 0.13);
        assert_eq!(apply(0.0, Operation::Subtract, 0.125).unwrap(), -0.13);
    }

    #[test]
    fn test_division_by_zero() {
        for left in [0.0, 1.0, -42.5, 1_000_000.0] {
            assert!(matches!(
                apply(left, Operation::Divide, 0.0),
                Err(AppError::DivisionByZero)
            ));
        }
    }

    #[test]
    fn test_result_limit() {
        assert!(matches!(
            apply(1_000_000.0, Operation::Add, 1.0),
            Err(AppError::ResultLimitExceeded)
        ));
        assert!(matches!(
            apply(-999_999.0, Operation::Subtract, 2.0),
            Err(AppError::ResultLimitExceeded)
        ));
        assert!(matches!(
            apply(1_000.0, Operation::Multiply, 2_000.0),
            Err(AppError::ResultLimitExceeded)
        ));
    }

    #[test]
    fn test_limit_is_a_closed_bound() {
        assert_eq!(
            apply(999_999.0, Operation::Add, 1.0).unwrap(),
            1_000_000.0
        );
        assert_eq!(
            apply(-999_999.0, Operation::Subtract, 1.0).unwrap(),
            -1_000_000.0
        );
    }

    #[test]
    fn test_limit_checked_after_rounding() {
        // 1,000,000.004 rounds back inside the bound
        assert_eq!(
            apply(1_000_000.0, Operation::Add, 0.004).unwrap(),
            1_000_000.0
        );
    }

    #[test]
    fn test_start_is_not_applicable() {
        assert!(matches!(
            apply(1.0, Operation::Start, 1.0),
            Err(AppError::InvalidOperation { .. })
        ));
    }

    #[test]
    fn test_deterministic() {
        let a = apply(10.0, Operation::Divide, 7.0).unwrap();
        let b = apply(10.0, Operation::Divide, 7.0).unwrap();
        assert_eq!(a, b);
    }
}
