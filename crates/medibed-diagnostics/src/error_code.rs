//! Medibed error codes following a structured numbering system
//!
//! Error code ranges:
//! - MB0001-MB0099: Validation errors (rejected input)
//! - MB0100-MB0199: Workflow errors (state machine, capacity, concurrency)
//! - MB0200-MB0299: Store errors (entity store, serialization)
//! - MB0300-MB0399: System errors (I/O, configuration, LLM backend)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Error code identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorCode(u16);

impl ErrorCode {
    /// Create a new error code
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Get the numeric code
    pub const fn code(&self) -> u16 {
        self.0
    }

    /// Get error information for this code
    pub fn info(&self) -> &'static ErrorInfo {
        ERROR_INFO.get(&self.0).unwrap_or(&UNKNOWN_ERROR)
    }

    /// Check if this is a validation error (0001-0099)
    pub const fn is_validation_error(&self) -> bool {
        self.0 >= 1 && self.0 < 100
    }

    /// Check if this is a workflow error (0100-0199)
    pub const fn is_workflow_error(&self) -> bool {
        self.0 >= 100 && self.0 < 200
    }

    /// Check if this is a store error (0200-0299)
    pub const fn is_store_error(&self) -> bool {
        self.0 >= 200 && self.0 < 300
    }

    /// Check if this is a system error (0300-0399)
    pub const fn is_system_error(&self) -> bool {
        self.0 >= 300 && self.0 < 400
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MB{:04}", self.0)
    }
}

/// Information about an error code
#[derive(Debug, Clone)]
pub struct ErrorInfo {
    /// Short description of the error
    pub description: &'static str,
    /// Detailed help text
    pub help: Option<&'static str>,
}

impl ErrorInfo {
    const fn new(description: &'static str) -> Self {
        Self {
            description,
            help: None,
        }
    }

    const fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }
}

static UNKNOWN_ERROR: ErrorInfo = ErrorInfo::new("Unknown error");

static ERROR_INFO: LazyLock<HashMap<u16, ErrorInfo>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    // Validation errors (0001-0099)
    map.insert(1, ErrorInfo::new("Missing required field")
        .with_help("Fill in the patient name before submitting the request"));
    map.insert(2, ErrorInfo::new("Invalid bed counts"));
    map.insert(3, ErrorInfo::new("Invalid field value"));

    // Workflow errors (0100-0199)
    map.insert(100, ErrorInfo::new("Invalid status transition")
        .with_help("Only pending bookings can be approved or rejected, and only approved bookings discharged"));
    map.insert(101, ErrorInfo::new("No bed available")
        .with_help("Free a bed of this category or raise its capacity before approving"));
    map.insert(102, ErrorInfo::new("Ambulance unavailable")
        .with_help("Pick another ambulance from the available list"));
    map.insert(103, ErrorInfo::new("Concurrent update conflict")
        .with_help("Another admin changed this record; reload and try again"));

    // Store errors (0200-0299)
    map.insert(200, ErrorInfo::new("Entity not found"));
    map.insert(201, ErrorInfo::new("Entity store failure"));
    map.insert(202, ErrorInfo::new("Record serialization failed"));
    map.insert(203, ErrorInfo::new("Record version mismatch"));

    // System errors (0300-0399)
    map.insert(300, ErrorInfo::new("Internal error"));
    map.insert(301, ErrorInfo::new("I/O error"));
    map.insert(302, ErrorInfo::new("Configuration error"));
    map.insert(303, ErrorInfo::new("LLM invocation failed"));

    map
});

// Validation errors
pub const MB0001: ErrorCode = ErrorCode::new(1);
pub const MB0002: ErrorCode = ErrorCode::new(2);
pub const MB0003: ErrorCode = ErrorCode::new(3);

// Workflow errors
pub const MB0100: ErrorCode = ErrorCode::new(100);
pub const MB0101: ErrorCode = ErrorCode::new(101);
pub const MB0102: ErrorCode = ErrorCode::new(102);
pub const MB0103: ErrorCode = ErrorCode::new(103);

// Store errors
pub const MB0200: ErrorCode = ErrorCode::new(200);
pub const MB0201: ErrorCode = ErrorCode::new(201);
pub const MB0202: ErrorCode = ErrorCode::new(202);
pub const MB0203: ErrorCode = ErrorCode::new(203);

// System errors
pub const MB0300: ErrorCode = ErrorCode::new(300);
pub const MB0301: ErrorCode = ErrorCode::new(301);
pub const MB0302: ErrorCode = ErrorCode::new(302);
pub const MB0303: ErrorCode = ErrorCode::new(303);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(MB0001.to_string(), "MB0001");
        assert_eq!(MB0103.to_string(), "MB0103");
    }

    #[test]
    fn test_error_categories() {
        assert!(MB0001.is_validation_error());
        assert!(!MB0001.is_workflow_error());

        assert!(MB0100.is_workflow_error());
        assert!(MB0200.is_store_error());
        assert!(MB0300.is_system_error());
    }

    #[test]
    fn test_error_info() {
        assert_eq!(MB0102.info().description, "Ambulance unavailable");
        assert!(MB0100.info().help.is_some());
        assert_eq!(ErrorCode::new(999).info().description, "Unknown error");
    }
}
