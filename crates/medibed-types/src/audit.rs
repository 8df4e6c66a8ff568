//! Append-only audit log

use crate::{Entity, EntityKind, RecordMeta};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of mutation recorded in the audit log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    BedUpdate,
    BookingApproved,
    BookingRejected,
    PatientDischarged,
    BookingCreated,
    AmbulanceBooked,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::BedUpdate => "bed_update",
            AuditAction::BookingApproved => "booking_approved",
            AuditAction::BookingRejected => "booking_rejected",
            AuditAction::PatientDischarged => "patient_discharged",
            AuditAction::BookingCreated => "booking_created",
            AuditAction::AmbulanceBooked => "ambulance_booked",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    #[serde(flatten)]
    pub meta: RecordMeta,
    /// Who performed the action
    pub admin_email: String,
    pub action: AuditAction,
    pub details: String,
    #[serde(default)]
    pub hospital_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(
        actor: impl Into<String>,
        action: AuditAction,
        details: impl Into<String>,
        hospital_id: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            meta: RecordMeta::default(),
            admin_email: actor.into(),
            action,
            details: details.into(),
            hospital_id: hospital_id.into(),
            related_id: None,
            timestamp,
        }
    }

    pub fn related_to(mut self, id: impl Into<String>) -> Self {
        self.related_id = Some(id.into());
        self
    }
}

impl Entity for AuditEntry {
    const KIND: EntityKind = EntityKind::AuditLog;

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }
}
