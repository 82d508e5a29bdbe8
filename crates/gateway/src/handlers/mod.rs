//! API handlers module

pub mod auth;
pub mod calculations;
pub mod health;

use serde::Serialize;

/// Success envelope used by every API response
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub payload: T,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn new(payload: T, message: impl Into<String>) -> Self {
        Self {
            payload,
            message: message.into(),
        }
    }
}
