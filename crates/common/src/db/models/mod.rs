//! SeaORM entity models

pub mod calculation;
pub mod password_reset_token;
pub mod user;

pub use calculation::{
    Entity as CalculationEntity, Model as Calculation, Operation,
    ActiveModel as CalculationActiveModel, Column as CalculationColumn,
};
pub use password_reset_token::{
    Entity as PasswordResetTokenEntity, Model as PasswordResetToken,
    ActiveModel as PasswordResetTokenActiveModel, Column as PasswordResetTokenColumn,
};
pub use user::{
    Entity as UserEntity, Model as User, ActiveModel as UserActiveModel, Column as UserColumn,
};
