//! Discharge records

use crate::{BedType, Condition, Entity, EntityKind, RecordMeta};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Immutable record written when an admitted patient leaves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DischargeRecord {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub patient_name: String,
    pub patient_email: String,
    pub hospital_id: String,
    #[serde(default)]
    pub hospital_name: String,
    pub bed_type: BedType,
    #[serde(default)]
    pub condition_type: Condition,
    pub admitted_date: DateTime<Utc>,
    pub discharged_date: DateTime<Utc>,
    pub booking_id: String,
}

impl DischargeRecord {
    pub fn length_of_stay(&self) -> chrono::Duration {
        self.discharged_date - self.admitted_date
    }
}

impl Entity for DischargeRecord {
    const KIND: EntityKind = EntityKind::DischargeRecord;

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }
}
