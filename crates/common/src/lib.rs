//! CalcTree Common Library
//!
//! Shared code for the CalcTree service including:
//! - The calculation core (result engine, tree assembly, service)
//! - Database models and the repository
//! - Error types and handling
//! - Configuration management
//! - Authentication utilities
//! - Metrics and observability

pub mod auth;
pub mod calc;
pub mod config;
pub mod db;
pub mod errors;
pub mod metrics;

// Re-export commonly used types
pub use calc::CalculationService;
pub use config::AppConfig;
pub use db::{CalculationRow, Repository};
pub use errors::{AppError, Result};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
