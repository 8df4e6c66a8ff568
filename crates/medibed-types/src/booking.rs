//! Bed bookings

use crate::{BedType, Entity, EntityKind, GeoPoint, RecordMeta};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of the patient's condition as declared on the request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Condition {
    Emergency,
    Serious,
    #[default]
    Normal,
}

impl Condition {
    pub const ALL: [Condition; 3] = [Condition::Emergency, Condition::Serious, Condition::Normal];

    pub fn label(&self) -> &'static str {
        match self {
            Condition::Emergency => "Emergency",
            Condition::Serious => "Serious",
            Condition::Normal => "Normal",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Condition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Condition::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown condition '{}'", s))
    }
}

/// Booking lifecycle.
///
/// `Pending -> Approved | Rejected`, `Approved -> Discharged`. Rejected and
/// Discharged are terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookingStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Discharged,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 4] = [
        BookingStatus::Pending,
        BookingStatus::Approved,
        BookingStatus::Rejected,
        BookingStatus::Discharged,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Approved => "Approved",
            BookingStatus::Rejected => "Rejected",
            BookingStatus::Discharged => "Discharged",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Rejected | BookingStatus::Discharged)
    }

    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        matches!(
            (*self, next),
            (BookingStatus::Pending, BookingStatus::Approved)
                | (BookingStatus::Pending, BookingStatus::Rejected)
                | (BookingStatus::Approved, BookingStatus::Discharged)
        )
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BookingStatus::ALL
            .into_iter()
            .find(|st| st.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown booking status '{}'", s))
    }
}

/// What the patient fills in when requesting a bed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookingForm {
    pub patient_name: String,
    #[serde(default)]
    pub patient_phone: String,
    #[serde(default)]
    pub condition_type: Condition,
    pub bed_type: BedType,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub patient_name: String,
    pub patient_email: String,
    #[serde(default)]
    pub patient_phone: String,
    pub hospital_id: String,
    #[serde(default)]
    pub hospital_name: String,
    pub bed_type: BedType,
    #[serde(default)]
    pub condition_type: Condition,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub status: BookingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_longitude: Option<f64>,
}

impl Booking {
    pub fn patient_location(&self) -> Option<GeoPoint> {
        match (self.patient_latitude, self.patient_longitude) {
            (Some(lat), Some(lng)) => Some(GeoPoint::new(lat, lng)),
            _ => None,
        }
    }
}

impl Entity for Booking {
    const KIND: EntityKind = EntityKind::BedBooking;

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }
}
