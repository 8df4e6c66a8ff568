//! Ambulances and ambulance bookings

use crate::{Entity, EntityKind, GeoPoint, RecordMeta};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Basic or advanced life support
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AmbulanceType {
    #[serde(rename = "BLS")]
    Bls,
    #[serde(rename = "ALS")]
    Als,
}

impl AmbulanceType {
    pub fn label(&self) -> &'static str {
        match self {
            AmbulanceType::Bls => "BLS",
            AmbulanceType::Als => "ALS",
        }
    }
}

impl fmt::Display for AmbulanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AmbulanceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BLS" => Ok(AmbulanceType::Bls),
            "ALS" => Ok(AmbulanceType::Als),
            _ => Err(format!("unknown ambulance type '{}'", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ambulance {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub vehicle_number: String,
    #[serde(rename = "type")]
    pub ambulance_type: AmbulanceType,
    #[serde(default)]
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    pub is_available: bool,
    #[serde(default)]
    pub driver_name: String,
    #[serde(default)]
    pub driver_phone: Option<String>,
    /// Hospital the vehicle delivers to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hospital_id: Option<String>,
}

impl Ambulance {
    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

impl Entity for Ambulance {
    const KIND: EntityKind = EntityKind::Ambulance;

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }
}

/// A dispatched ambulance.
///
/// Distance and ETA are captured when the booking is made and never
/// recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmbulanceBooking {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub patient_email: String,
    pub patient_name: String,
    pub ambulance_id: String,
    pub ambulance_type: AmbulanceType,
    pub vehicle_number: String,
    pub pickup_latitude: f64,
    pub pickup_longitude: f64,
    #[serde(default)]
    pub destination_hospital_id: String,
    #[serde(default)]
    pub destination_hospital_name: String,
    pub estimated_eta_minutes: u32,
    pub distance_km: f64,
}

impl AmbulanceBooking {
    pub fn pickup(&self) -> GeoPoint {
        GeoPoint::new(self.pickup_latitude, self.pickup_longitude)
    }
}

impl Entity for AmbulanceBooking {
    const KIND: EntityKind = EntityKind::AmbulanceBooking;

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }
}
