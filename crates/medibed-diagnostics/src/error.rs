//! Medibed error types

use crate::ErrorCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// The requested action was not carried out
    Error,
    /// The action went through but needs attention
    Warning,
    /// Informational message
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// A user-facing diagnostic message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity level
    pub severity: Severity,
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional context or help
    pub help: Option<String>,
}

impl Diagnostic {
    /// Create a new error diagnostic
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            help: None,
        }
    }

    /// Create a new warning diagnostic
    pub fn warning(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            help: None,
        }
    }

    /// Set help text
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Render with terminal colors
    #[cfg(feature = "colored")]
    pub fn render_colored(&self) -> String {
        use colored::Colorize;

        let head = match self.severity {
            Severity::Error => format!("{}[{}]", "error".red().bold(), self.code),
            Severity::Warning => format!("{}[{}]", "warning".yellow().bold(), self.code),
            Severity::Info => format!("{}[{}]", "info".cyan().bold(), self.code),
        };
        let mut out = format!("{}: {}", head, self.message);
        if let Some(help) = &self.help {
            out.push_str(&format!("\n  {} {}", "help:".green().bold(), help));
        }
        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} - {}", self.severity, self.code, self.message)?;
        if let Some(help) = &self.help {
            write!(f, " (help: {})", help)?;
        }
        Ok(())
    }
}

/// Main Medibed error type
#[derive(Debug, Clone, Error)]
pub enum MedibedError {
    /// Rejected input
    #[error("{code}: {message}")]
    Validation {
        code: ErrorCode,
        message: String,
        field: Option<String>,
    },

    /// Workflow rule violation (transition, capacity, concurrency)
    #[error("{code}: {message}")]
    Workflow {
        code: ErrorCode,
        message: String,
        entity_id: Option<String>,
    },

    /// Entity store failure
    #[error("{code}: {message}")]
    Store {
        code: ErrorCode,
        message: String,
        kind: Option<String>,
    },

    /// System error
    #[error("{code}: {message}")]
    System {
        code: ErrorCode,
        message: String,
        context: Option<String>,
    },
}

impl MedibedError {
    /// Create a validation error
    pub fn validation(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Validation {
            code,
            message: message.into(),
            field: None,
        }
    }

    /// Create a validation error naming the offending field
    pub fn validation_field(
        code: ErrorCode,
        message: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        Self::Validation {
            code,
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a workflow error
    pub fn workflow(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Workflow {
            code,
            message: message.into(),
            entity_id: None,
        }
    }

    /// Create a workflow error tied to an entity
    pub fn workflow_on(
        code: ErrorCode,
        message: impl Into<String>,
        entity_id: impl Into<String>,
    ) -> Self {
        Self::Workflow {
            code,
            message: message.into(),
            entity_id: Some(entity_id.into()),
        }
    }

    /// Create a store error
    pub fn store(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Store {
            code,
            message: message.into(),
            kind: None,
        }
    }

    /// Create a system error
    pub fn system(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::System {
            code,
            message: message.into(),
            context: None,
        }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation { code, .. } => *code,
            Self::Workflow { code, .. } => *code,
            Self::Store { code, .. } => *code,
            Self::System { code, .. } => *code,
        }
    }

    /// Get the raw message without the code prefix
    pub fn message(&self) -> &str {
        match self {
            Self::Validation { message, .. }
            | Self::Workflow { message, .. }
            | Self::Store { message, .. }
            | Self::System { message, .. } => message,
        }
    }

    /// Convert to a diagnostic, pulling help text from the code registry
    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = Diagnostic::error(self.code(), self.message());
        match self {
            Self::Validation { field: Some(field), .. } => {
                diag = diag.with_help(format!("check the `{}` field", field));
            }
            Self::System { context: Some(ctx), .. } => {
                diag = diag.with_help(ctx.clone());
            }
            _ => {
                if let Some(help) = self.code().info().help {
                    diag = diag.with_help(help);
                }
            }
        }
        diag
    }
}
