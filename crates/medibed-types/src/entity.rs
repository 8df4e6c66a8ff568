//! Entity kinds and store-managed record metadata

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Collections held by the entity store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    Hospital,
    Ambulance,
    BedBooking,
    AmbulanceBooking,
    DischargeRecord,
    AuditLog,
}

impl EntityKind {
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Hospital,
        EntityKind::Ambulance,
        EntityKind::BedBooking,
        EntityKind::AmbulanceBooking,
        EntityKind::DischargeRecord,
        EntityKind::AuditLog,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Hospital => "Hospital",
            EntityKind::Ambulance => "Ambulance",
            EntityKind::BedBooking => "BedBooking",
            EntityKind::AmbulanceBooking => "AmbulanceBooking",
            EntityKind::DischargeRecord => "DischargeRecord",
            EntityKind::AuditLog => "AuditLog",
        }
    }

    /// Whether records of this kind may be modified after creation
    pub fn is_append_only(&self) -> bool {
        matches!(self, EntityKind::DischargeRecord | EntityKind::AuditLog)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown entity kind '{}'", s))
    }
}

/// Fields the store stamps on every record.
///
/// Entities flatten this into their own JSON representation, so a record
/// read back from the store deserializes straight into the entity type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordMeta {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub version: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_date: Option<DateTime<Utc>>,
}

impl RecordMeta {
    pub const FIELDS: [&'static str; 4] = ["id", "version", "created_date", "updated_date"];

    /// Last modification time, falling back to creation time
    pub fn last_touched(&self) -> Option<DateTime<Utc>> {
        self.updated_date.or(self.created_date)
    }
}

/// A typed entity stored under a fixed [`EntityKind`]
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync {
    const KIND: EntityKind;

    fn meta(&self) -> &RecordMeta;

    fn id(&self) -> &str {
        &self.meta().id
    }

    fn version(&self) -> u64 {
        self.meta().version
    }
}
