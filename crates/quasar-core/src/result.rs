//! Convenience result type alias for Quasar.

use crate::error::AppError;

/// A specialized `Result` type for Quasar operations.
pub type AppResult<T> = Result<T, AppError>;
