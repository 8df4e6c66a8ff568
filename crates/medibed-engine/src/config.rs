//! Workflow configuration

use serde::{Deserialize, Serialize};

/// What to do when approving a booking whose bed category is full
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverCommitPolicy {
    /// Fail with `Unavailable`; the booking stays Pending
    #[default]
    Reject,
    /// Approve anyway and leave the counts untouched
    AllowWithoutDecrement,
}

/// Knobs of the booking workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub over_commit: OverCommitPolicy,
    /// Record `booking_created` and `ambulance_booked` audit entries
    pub audit_patient_actions: bool,
    /// Attempts of the version-checked hospital update before giving up
    pub max_update_attempts: u32,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            over_commit: OverCommitPolicy::Reject,
            audit_patient_actions: true,
            max_update_attempts: 5,
        }
    }
}

impl WorkflowConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_over_commit(mut self, policy: OverCommitPolicy) -> Self {
        self.over_commit = policy;
        self
    }

    pub fn with_patient_audit(mut self, enabled: bool) -> Self {
        self.audit_patient_actions = enabled;
        self
    }

    /// At least one attempt is always made
    pub fn with_max_update_attempts(mut self, attempts: u32) -> Self {
        self.max_update_attempts = attempts.max(1);
        self
    }
}
