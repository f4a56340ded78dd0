//! Result alias for the unified error type.

use crate::error::AppError;

/// Application-wide result type.
pub type AppResult<T> = Result<T, AppError>;
