//! Medibed diagnostics and error handling
//!
//! This crate provides the error reporting infrastructure shared by the
//! workspace: structured error codes and user-facing diagnostics.

mod error;
mod error_code;

pub use error::*;
pub use error_code::*;

/// Result type for Medibed operations
pub type Result<T> = std::result::Result<T, MedibedError>;
