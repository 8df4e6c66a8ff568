//! Hospitals and their bed inventory

use crate::{Entity, EntityKind, GeoPoint, RecordMeta};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Bed category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BedType {
    #[serde(rename = "ICU")]
    Icu,
    #[default]
    General,
    Emergency,
    Ventilator,
}

impl BedType {
    pub const ALL: [BedType; 4] = [
        BedType::Icu,
        BedType::General,
        BedType::Emergency,
        BedType::Ventilator,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            BedType::Icu => "ICU",
            BedType::General => "General",
            BedType::Emergency => "Emergency",
            BedType::Ventilator => "Ventilator",
        }
    }
}

impl fmt::Display for BedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BedType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BedType::ALL
            .into_iter()
            .find(|t| t.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown bed type '{}'", s))
    }
}

/// Capacity and free beds of one category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BedCount {
    pub total: u32,
    pub available: u32,
}

impl BedCount {
    pub const fn new(available: u32, total: u32) -> Self {
        Self { total, available }
    }

    pub const fn occupied(&self) -> u32 {
        self.total.saturating_sub(self.available)
    }
}

impl fmt::Display for BedCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.available, self.total)
    }
}

impl FromStr for BedCount {
    type Err = String;

    /// Parses `available/total`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (avail, total) = s
            .split_once('/')
            .ok_or_else(|| format!("expected 'available/total', got '{}'", s))?;
        let available = avail
            .trim()
            .parse::<u32>()
            .map_err(|e| format!("invalid available count '{}': {}", avail, e))?;
        let total = total
            .trim()
            .parse::<u32>()
            .map_err(|e| format!("invalid total count '{}': {}", total, e))?;
        Ok(Self { total, available })
    }
}

/// Bed inventory of a hospital, one count per category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BedCounts {
    #[serde(default)]
    pub icu: BedCount,
    #[serde(default)]
    pub general: BedCount,
    #[serde(default)]
    pub emergency: BedCount,
    #[serde(default)]
    pub ventilator: BedCount,
}

impl BedCounts {
    pub fn get(&self, bed_type: BedType) -> BedCount {
        match bed_type {
            BedType::Icu => self.icu,
            BedType::General => self.general,
            BedType::Emergency => self.emergency,
            BedType::Ventilator => self.ventilator,
        }
    }

    pub fn get_mut(&mut self, bed_type: BedType) -> &mut BedCount {
        match bed_type {
            BedType::Icu => &mut self.icu,
            BedType::General => &mut self.general,
            BedType::Emergency => &mut self.emergency,
            BedType::Ventilator => &mut self.ventilator,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (BedType, BedCount)> + '_ {
        BedType::ALL.into_iter().map(|t| (t, self.get(t)))
    }
}

/// Derived ICU scarcity classification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IcuLoad {
    #[default]
    Safe,
    Medium,
    High,
}

impl IcuLoad {
    pub fn as_str(&self) -> &'static str {
        match self {
            IcuLoad::Safe => "safe",
            IcuLoad::Medium => "medium",
            IcuLoad::High => "high",
        }
    }

    /// Badge text shown next to a hospital
    pub fn label(&self) -> &'static str {
        match self {
            IcuLoad::Safe => "Safe",
            IcuLoad::Medium => "Medium Load",
            IcuLoad::High => "High Load",
        }
    }
}

impl fmt::Display for IcuLoad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hospital {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub name: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub total_reviews: Option<u32>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub admin_email: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub beds: BedCounts,
    /// Recomputed by the rule engine on every ICU count change
    #[serde(default)]
    pub icu_load_prediction: IcuLoad,
}

fn default_true() -> bool {
    true
}

impl Hospital {
    pub fn new(name: impl Into<String>, location: GeoPoint) -> Self {
        Self {
            meta: RecordMeta::default(),
            name: name.into(),
            city: String::new(),
            address: String::new(),
            phone: None,
            rating: None,
            total_reviews: None,
            latitude: location.lat,
            longitude: location.lng,
            admin_email: String::new(),
            is_active: true,
            beds: BedCounts::default(),
            icu_load_prediction: IcuLoad::Safe,
        }
    }

    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    pub fn beds_of(&self, bed_type: BedType) -> BedCount {
        self.beds.get(bed_type)
    }
}

impl Entity for Hospital {
    const KIND: EntityKind = EntityKind::Hospital;

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }
}
