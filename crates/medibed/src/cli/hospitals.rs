//! Hospital commands: seeding, listing, bed edits, analytics and audit

use super::session::{Session, diagnose};
use super::output;
use anyhow::{Context, Result};
use medibed_engine::{
    NearbyHospital, SeedSource, nearby_hospitals, overall_availability_band, seed_if_empty,
};
use medibed_types::{BedCount, BedCounts, BedType, City};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// One line of the hospital listing
#[derive(Debug, Serialize)]
pub struct HospitalRow {
    pub id: String,
    pub name: String,
    pub city: String,
    pub distance_km: Option<f64>,
    pub icu: String,
    pub general: String,
    pub emergency: String,
    pub ventilator: String,
    pub icu_load: String,
    pub availability: &'static str,
}

impl From<&NearbyHospital> for HospitalRow {
    fn from(nearby: &NearbyHospital) -> Self {
        let h = &nearby.hospital;
        Self {
            id: h.meta.id.clone(),
            name: h.name.clone(),
            city: h.city.clone(),
            distance_km: nearby.distance_km.map(|d| medibed_engine::geo::round_to(d, 1)),
            icu: h.beds.icu.to_string(),
            general: h.beds.general.to_string(),
            emergency: h.beds.emergency.to_string(),
            ventilator: h.beds.ventilator.to_string(),
            icu_load: h.icu_load_prediction.to_string(),
            availability: overall_availability_band(&h.beds).as_str(),
        }
    }
}

/// Fill an empty store from a hospital document
pub async fn seed(session: &Session, file: &Path, rng_seed: u64) -> Result<()> {
    let content = fs::read_to_string(file)
        .with_context(|| format!("Failed to read seed file: {}", file.display()))?;
    let document: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse seed file: {}", file.display()))?;

    let report = seed_if_empty(session.service().repository(), SeedSource::Document(&document), rng_seed)
        .await
        .map_err(diagnose)?;

    if report.is_noop() {
        eprintln!(
            "{}",
            output::format_warning(&format!(
                "{} already holds hospitals and ambulances",
                session.data_path().display()
            ))
        );
    } else {
        session.save()?;
    }
    session.print(&report)
}

/// Active hospitals, nearest first when a location is set
pub async fn list(session: &Session, city: Option<City>, free: Option<BedType>) -> Result<()> {
    let service = session.service();
    let hospitals = match city {
        Some(city) => service.hospitals_in_city(city.name()).await,
        None => service.active_hospitals().await,
    }
    .map_err(diagnose)?;

    let rows: Vec<HospitalRow> = nearby_hospitals(&hospitals, service.location())
        .iter()
        .filter(|n| free.is_none_or(|t| n.hospital.beds_of(t).available > 0))
        .map(HospitalRow::from)
        .collect();
    session.print(&rows)
}

/// Overwrite bed counts; categories left out keep their current values
pub async fn set_beds(
    session: &Session,
    hospital_id: &str,
    updates: &[(BedType, Option<BedCount>)],
) -> Result<()> {
    let service = session.service();
    let current = service.hospital(hospital_id).await.map_err(diagnose)?;

    let mut counts: BedCounts = current.beds;
    for (bed_type, count) in updates {
        if let Some(count) = count {
            *counts.get_mut(*bed_type) = *count;
        }
    }

    let updated = service
        .set_bed_counts(hospital_id, counts)
        .await
        .map_err(diagnose)?;
    session.save()?;
    session.print(&HospitalRow::from(&NearbyHospital {
        hospital: updated,
        distance_km: None,
    }))
}

pub async fn analytics(session: &Session, hospital_id: &str) -> Result<()> {
    let report = session
        .service()
        .analytics(hospital_id)
        .await
        .map_err(diagnose)?;
    session.print(&report)
}

pub async fn audit(session: &Session, hospital_id: &str) -> Result<()> {
    let entries = session
        .service()
        .audit_log(hospital_id)
        .await
        .map_err(diagnose)?;
    session.print(&entries)
}
