//! Convenience result type alias for ExtHooks.

use crate::error::AppError;

/// A specialized `Result` type for harness operations at the application
/// boundary.
pub type AppResult<T> = Result<T, AppError>;
