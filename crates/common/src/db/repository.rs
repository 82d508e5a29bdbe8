//! Repository pattern for database operations
//!
//! All data access goes through here. Calculation writes are append-only:
//! a single INSERT allocates the id and makes the row visible as one unit,
//! which is what keeps concurrent replies to the same parent safe.

use crate::db::models::*;
use crate::db::DbPool;
use crate::errors::{AppError, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    SqlErr, TransactionTrait,
};
use sea_orm::prelude::DateTimeWithTimeZone;

/// A calculation row joined with its author's display name
#[derive(Debug, Clone, PartialEq)]
pub struct CalculationRow {
    pub calculation: Calculation,
    pub username: String,
}

/// Repository for data access operations
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> &DatabaseConnection {
        self.pool.conn()
    }

    /// Ping the database
    pub async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }

    // ========================================================================
    // User Operations
    // ========================================================================

    /// Create a new user, mapping unique violations to duplicate errors
    pub async fn create_user(
        &self,
        email: String,
        username: String,
        password_hash: String,
    ) -> Result<User> {
        let user = UserActiveModel {
            email: Set(email),
            username: Set(username),
            password_hash: Set(password_hash),
            role: Set("user".to_string()),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };

        match user.insert(self.conn()).await {
            Ok(model) => Ok(model),
            Err(err) => match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(constraint)) => {
                    if constraint.contains("email") {
                        Err(AppError::DuplicateEmail)
                    } else {
                        Err(AppError::DuplicateUsername)
                    }
                }
                _ => Err(err.into()),
            },
        }
    }

    /// Find a user by email
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        UserEntity::find()
            .filter(UserColumn::Email.eq(email))
            .one(self.conn())
            .await
            .map_err(Into::into)
    }

    /// Find a user by username
    pub async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        UserEntity::find()
            .filter(UserColumn::Username.eq(username))
            .one(self.conn())
            .await
            .map_err(Into::into)
    }

    /// Find a user by ID
    pub async fn find_user_by_id(&self, id: i64) -> Result<Option<User>> {
        UserEntity::find_by_id(id)
            .one(self.conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Password Reset Token Operations
    // ========================================================================

    /// Store a new reset token digest for a user, replacing any previous one
    pub async fn replace_reset_token(
        &self,
        user_id: i64,
        token_hash: String,
        expires_at: DateTimeWithTimeZone,
    ) -> Result<PasswordResetToken> {
        let txn = self.conn().begin().await?;

        PasswordResetTokenEntity::delete_many()
            .filter(PasswordResetTokenColumn::UserId.eq(user_id))
            .exec(&txn)
            .await?;

        let token = PasswordResetTokenActiveModel {
            user_id: Set(user_id),
            token_hash: Set(token_hash),
            expires_at: Set(expires_at),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok(token)
    }

    /// Find a reset token by its digest
    pub async fn find_reset_token(&self, token_hash: &str) -> Result<Option<PasswordResetToken>> {
        PasswordResetTokenEntity::find()
            .filter(PasswordResetTokenColumn::TokenHash.eq(token_hash))
            .one(self.conn())
            .await
            .map_err(Into::into)
    }

    /// Delete a reset token by ID (used for expired tokens)
    pub async fn delete_reset_token(&self, id: i64) -> Result<()> {
        PasswordResetTokenEntity::delete_by_id(id)
            .exec(self.conn())
            .await?;
        Ok(())
    }

    /// Set a new password for a user and consume the reset token atomically
    pub async fn reset_password(
        &self,
        user_id: i64,
        password_hash: String,
        token_id: i64,
    ) -> Result<()> {
        let txn = self.conn().begin().await?;

        UserActiveModel {
            id: Set(user_id),
            password_hash: Set(password_hash),
            ..Default::default()
        }
        .update(&txn)
        .await?;

        PasswordResetTokenEntity::delete_by_id(token_id)
            .exec(&txn)
            .await?;

        txn.commit().await?;
        Ok(())
    }

    // ========================================================================
    // Calculation Operations
    // ========================================================================

    /// Fetch every calculation with its author, in creation order.
    ///
    /// Timestamps may collide at sub-second granularity, so the id is the
    /// stable secondary key.
    pub async fn all_calculations(&self) -> Result<Vec<CalculationRow>> {
        let rows = CalculationEntity::find()
            .find_also_related(UserEntity)
            .order_by_asc(CalculationColumn::CreatedAt)
            .order_by_asc(CalculationColumn::Id)
            .all(self.conn())
            .await?;

        Ok(rows
            .into_iter()
            .map(|(calculation, user)| CalculationRow {
                username: user.map(|u| u.username).unwrap_or_default(),
                calculation,
            })
            .collect())
    }

    /// Find a single calculation by ID
    pub async fn find_calculation(&self, id: i64) -> Result<Option<Calculation>> {
        CalculationEntity::find_by_id(id)
            .one(self.conn())
            .await
            .map_err(Into::into)
    }

    /// Insert a root node holding a starting value
    pub async fn insert_root_calculation(&self, user_id: i64, operand: f64) -> Result<Calculation> {
        let node = CalculationActiveModel {
            parent_id: Set(None),
            user_id: Set(user_id),
            operation: Set(Operation::Start),
            operand: Set(operand),
            result: Set(operand),
            depth: Set(0),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };

        node.insert(self.conn()).await.map_err(Into::into)
    }

    /// Insert a reply node. The caller has already validated depth and
    /// result; the foreign key still backstops referential integrity, so a
    /// concurrently deleted parent surfaces as `ParentNotFound` here too.
    pub async fn insert_child_calculation(
        &self,
        parent_id: i64,
        user_id: i64,
        operation: Operation,
        operand: f64,
        result: f64,
        depth: i32,
    ) -> Result<Calculation> {
        let node = CalculationActiveModel {
            parent_id: Set(Some(parent_id)),
            user_id: Set(user_id),
            operation: Set(operation),
            operand: Set(operand),
            result: Set(result),
            depth: Set(depth),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };

        match node.insert(self.conn()).await {
            Ok(model) => Ok(model),
            Err(err) => match err.sql_err() {
                Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
                    Err(AppError::ParentNotFound { id: parent_id })
                }
                _ => Err(err.into()),
            },
        }
    }
}
