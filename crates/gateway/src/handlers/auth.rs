//! Account handlers: registration, login, and the password-reset flow

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Duration, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::handlers::ApiResponse;
use crate::AppState;
use calctree_common::{
    auth::{generate_reset_token, hash_password, hash_reset_token, verify_password},
    db::models::User,
    errors::{AppError, Result},
    metrics,
};

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 3, max = 32))]
    pub username: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PasswordResetRequest {
    #[validate(length(min = 1))]
    pub username: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PasswordConfirmRequest {
    #[validate(length(min = 1))]
    pub token: String,

    #[validate(length(min = 8, max = 128))]
    pub new_password: String,
}

/// User fields safe to expose in responses
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub role: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            role: user.role,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthPayload {
    pub token: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
pub struct ResetTokenPayload {
    pub token: String,
    pub expires_at: DateTime<FixedOffset>,
}

#[derive(Debug, Serialize)]
pub struct PasswordResetConfirmed {
    pub success: bool,
}

/// Register a new account and issue a token for it
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthPayload>>)> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let password_hash = hash_password(&request.password)?;
    let user = state
        .repo
        .create_user(request.email, request.username, password_hash)
        .await?;

    metrics::record_registration();
    tracing::info!(user_id = user.id, username = %user.username, "User registered");

    let token = state.jwt.generate_token(user.id)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            AuthPayload {
                token,
                user: user.into(),
            },
            "User created successfully",
        )),
    ))
}

/// Log in with email and password.
///
/// Unknown email and wrong password are indistinguishable to the caller.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthPayload>>> {
    let user = match state.repo.find_user_by_email(&request.email).await? {
        Some(user) => user,
        None => {
            metrics::record_login(false);
            return Err(AppError::InvalidCredentials);
        }
    };

    if !verify_password(&request.password, &user.password_hash)? {
        metrics::record_login(false);
        return Err(AppError::InvalidCredentials);
    }

    metrics::record_login(true);
    let token = state.jwt.generate_token(user.id)?;

    Ok(Json(ApiResponse::new(
        AuthPayload {
            token,
            user: user.into(),
        },
        "Login successful",
    )))
}

/// Generate a reset token for a user, replacing any previous one.
///
/// The raw token is returned to the caller; only its digest is stored.
pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(request): Json<PasswordResetRequest>,
) -> Result<Json<ApiResponse<ResetTokenPayload>>> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let user = state
        .repo
        .find_user_by_username(&request.username)
        .await?
        .ok_or_else(|| AppError::UserNotFound {
            username: request.username.clone(),
        })?;

    let token = generate_reset_token();
    let ttl_secs = state.config.auth.reset_token_ttl_secs;
    let expires_at: DateTime<FixedOffset> =
        (Utc::now() + Duration::seconds(ttl_secs as i64)).into();

    state
        .repo
        .replace_reset_token(user.id, hash_reset_token(&token), expires_at)
        .await?;

    tracing::info!(user_id = user.id, "Password reset token issued");

    Ok(Json(ApiResponse::new(
        ResetTokenPayload { token, expires_at },
        format!(
            "Reset token generated. Use it to reset your password within {} minutes.",
            ttl_secs / 60
        ),
    )))
}

/// Set a new password with a reset token; the token is consumed on use
pub async fn confirm_password_reset(
    State(state): State<AppState>,
    Json(request): Json<PasswordConfirmRequest>,
) -> Result<Json<ApiResponse<PasswordResetConfirmed>>> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let reset_token = state
        .repo
        .find_reset_token(&hash_reset_token(&request.token))
        .await?
        .ok_or(AppError::InvalidResetToken)?;

    if reset_token.is_expired() {
        state.repo.delete_reset_token(reset_token.id).await?;
        return Err(AppError::InvalidResetToken);
    }

    let password_hash = hash_password(&request.new_password)?;
    state
        .repo
        .reset_password(reset_token.user_id, password_hash, reset_token.id)
        .await?;

    tracing::info!(user_id = reset_token.user_id, "Password reset completed");

    Ok(Json(ApiResponse::new(
        PasswordResetConfirmed { success: true },
        "Password reset successfully",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_validation() {
        let valid = RegisterRequest {
            email: "alice@example.com".into(),
            username: "alice".into(),
            password: "correct-horse".into(),
        };
        assert!(valid.validate().is_ok());

        let bad_email = RegisterRequest {
            email: "not-an-email".into(),
            ..valid_clone(&valid)
        };
        assert!(bad_email.validate().is_err());

        let short_password = RegisterRequest {
            password: "short".into(),
            ..valid_clone(&valid)
        };
        assert!(short_password.validate().is_err());

        let short_username = RegisterRequest {
            username: "ab".into(),
            ..valid_clone(&valid)
        };
        assert!(short_username.validate().is_err());
    }

    fn valid_clone(req: &RegisterRequest) -> RegisterRequest {
        RegisterRequest {
            email: req.email.clone(),
            username: req.username.clone(),
            password: req.password.clone(),
        }
    }

    #[test]
    fn test_confirm_request_validation() {
        let req = PasswordConfirmRequest {
            token: "".into(),
            new_password: "long-enough-pw".into(),
        };
        assert!(req.validate().is_err());
    }
}
