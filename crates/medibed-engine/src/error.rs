//! Workflow errors

use medibed_diagnostics::{MB0001, MB0100, MB0101, MB0102, MB0103, MB0200, MedibedError};
use medibed_store::StoreError;
use medibed_types::{BedType, BookingStatus, EntityKind};
use std::fmt;
use thiserror::Error;

/// Result type for workflow operations
pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Admin action applied to a booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkflowAction {
    Approve,
    Reject,
    Discharge,
}

impl WorkflowAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowAction::Approve => "approve",
            WorkflowAction::Reject => "reject",
            WorkflowAction::Discharge => "discharge",
        }
    }

    /// Status the booking moves to
    pub fn target(&self) -> BookingStatus {
        match self {
            WorkflowAction::Approve => BookingStatus::Approved,
            WorkflowAction::Reject => BookingStatus::Rejected,
            WorkflowAction::Discharge => BookingStatus::Discharged,
        }
    }
}

impl fmt::Display for WorkflowAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resource that could not be allocated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unavailable {
    Bed { bed_type: BedType, hospital: String },
    Ambulance { vehicle_number: String },
}

impl fmt::Display for Unavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unavailable::Bed { bed_type, hospital } => {
                write!(f, "No {} bed available at {}", bed_type, hospital)
            }
            Unavailable::Ambulance { vehicle_number } => {
                write!(f, "Ambulance {} is already dispatched", vehicle_number)
            }
        }
    }
}

/// Errors raised by the booking workflow
#[derive(Debug, Error, Clone, PartialEq)]
pub enum WorkflowError {
    /// Required input missing or malformed
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    /// Action not allowed from the booking's current status
    #[error("Cannot {action} a booking that is {from}")]
    InvalidTransition {
        from: BookingStatus,
        action: WorkflowAction,
    },

    #[error("{0}")]
    Unavailable(Unavailable),

    #[error("{kind} '{id}' not found")]
    NotFound { kind: EntityKind, id: String },

    /// Optimistic update lost every attempt, or the booking moved underneath
    #[error("Conflicting update on {kind} '{id}'")]
    Conflict { kind: EntityKind, id: String },

    /// Backend failure, surfaced as-is
    #[error("Store error: {0}")]
    Store(StoreError),
}

impl WorkflowError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn invalid_transition(from: BookingStatus, action: WorkflowAction) -> Self {
        Self::InvalidTransition { from, action }
    }

    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn conflict(kind: EntityKind, id: impl Into<String>) -> Self {
        Self::Conflict {
            kind,
            id: id.into(),
        }
    }
}

impl From<StoreError> for WorkflowError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { kind, id } => Self::NotFound { kind, id },
            StoreError::VersionConflict { kind, id, .. } => Self::Conflict { kind, id },
            other => Self::Store(other),
        }
    }
}

impl From<WorkflowError> for MedibedError {
    fn from(err: WorkflowError) -> Self {
        let message = err.to_string();
        match err {
            WorkflowError::Validation { field, .. } => {
                MedibedError::validation_field(MB0001, message, field)
            }
            WorkflowError::InvalidTransition { .. } => MedibedError::workflow(MB0100, message),
            WorkflowError::Unavailable(Unavailable::Bed { .. }) => {
                MedibedError::workflow(MB0101, message)
            }
            WorkflowError::Unavailable(Unavailable::Ambulance { .. }) => {
                MedibedError::workflow(MB0102, message)
            }
            WorkflowError::NotFound { kind, .. } => MedibedError::Store {
                code: MB0200,
                message,
                kind: Some(kind.to_string()),
            },
            WorkflowError::Conflict { id, .. } => MedibedError::workflow_on(MB0103, message, id),
            WorkflowError::Store(inner) => inner.into(),
        }
    }
}
