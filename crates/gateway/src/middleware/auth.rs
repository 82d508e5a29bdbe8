//! Request authentication
//!
//! `CurrentUser` is the extractor handlers take to require a valid
//! `Authorization: Bearer <jwt>` header. The core never authenticates;
//! it only receives the already-verified user id from here.

use axum::{extract::FromRequestParts, http::header, http::request::Parts};

use crate::AppState;
use calctree_common::{
    auth::extract_bearer_token,
    errors::{AppError, Result},
};

/// The authenticated user on a request
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    pub id: i64,
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized {
                message: "No token provided".to_string(),
            })?;

        let token = extract_bearer_token(auth_header).ok_or_else(|| AppError::Unauthorized {
            message: "Authorization header must be a bearer token".to_string(),
        })?;

        let id = state.jwt.validate_token(token)?;

        Ok(CurrentUser { id })
    }
}
