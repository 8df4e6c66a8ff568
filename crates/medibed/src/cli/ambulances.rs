//! Ambulance commands and the assistant context

use super::output;
use super::session::{Session, diagnose};
use anyhow::{Result, anyhow};
use medibed_engine::nearby::AMBULANCE_RADIUS_KM;
use medibed_engine::{NearbyAmbulance, assistant_context, nearby_ambulances, nearby_hospitals};
use medibed_types::{AmbulanceType, Hospital};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct AmbulanceRow {
    pub id: String,
    pub vehicle_number: String,
    #[serde(rename = "type")]
    pub ambulance_type: AmbulanceType,
    pub distance_km: f64,
    pub eta_minutes: u32,
    pub driver: String,
    pub phone: Option<String>,
}

impl From<NearbyAmbulance> for AmbulanceRow {
    fn from(nearby: NearbyAmbulance) -> Self {
        let a = nearby.ambulance;
        Self {
            id: a.meta.id,
            vehicle_number: a.vehicle_number,
            ambulance_type: a.ambulance_type,
            distance_km: medibed_engine::geo::round_to(nearby.distance_km, 2),
            eta_minutes: nearby.eta_minutes,
            driver: a.driver_name,
            phone: a.driver_phone,
        }
    }
}

/// Available ambulances nearest first; only those in range unless `all`
pub async fn list(session: &Session, ambulance_type: Option<AmbulanceType>, all: bool) -> Result<()> {
    let service = session.service();
    let origin = service
        .location()
        .ok_or_else(|| anyhow!("No location set; pass --city or --lat/--lng"))?;
    let fleet = service.ambulances().await.map_err(diagnose)?;

    let rows: Vec<AmbulanceRow> = nearby_ambulances(&fleet, origin, ambulance_type)
        .into_iter()
        .filter(|a| all || a.distance_km <= AMBULANCE_RADIUS_KM)
        .map(AmbulanceRow::from)
        .collect();
    if rows.is_empty() && !all {
        eprintln!(
            "{}",
            output::format_warning(&format!(
                "No ambulance within {} km; pass --all to widen the search",
                AMBULANCE_RADIUS_KM
            ))
        );
    }
    session.print(&rows)
}

pub async fn book(session: &Session, ambulance_id: &str) -> Result<()> {
    let trip = session
        .service()
        .book_ambulance(ambulance_id)
        .await
        .map_err(diagnose)?;
    session.save()?;
    session.print(&trip)
}

/// The acting patient's ambulance trips
pub async fn trips(session: &Session) -> Result<()> {
    let trips = session
        .service()
        .my_ambulance_bookings()
        .await
        .map_err(diagnose)?;
    session.print(&trips)
}

/// Trips bound for a hospital
pub async fn inbound(session: &Session, hospital_id: &str) -> Result<()> {
    let trips = session
        .service()
        .inbound_ambulances(hospital_id)
        .await
        .map_err(diagnose)?;
    session.print(&trips)
}

/// Print the availability snapshot the assistant is grounded on
pub async fn context(session: &Session) -> Result<()> {
    let service = session.service();
    let origin = service.location();
    let active = service.active_hospitals().await.map_err(diagnose)?;
    let hospitals: Vec<Hospital> = nearby_hospitals(&active, origin)
        .into_iter()
        .map(|n| n.hospital)
        .collect();
    let fleet = service.ambulances().await.map_err(diagnose)?;
    let text = assistant_context(&hospitals, &fleet, origin);
    output::write_output(text.trim_end(), session.output_file())
}
