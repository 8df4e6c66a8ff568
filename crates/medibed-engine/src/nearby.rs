//! Nearby hospitals and ambulances for a patient

use crate::geo::{Located, distance_between, estimate_eta_minutes, sort_by_distance};
use medibed_types::{Ambulance, AmbulanceType, BedType, GeoPoint, Hospital};
use serde::Serialize;
use std::cmp::Ordering;

/// Ambulances further away than this are not offered
pub const AMBULANCE_RADIUS_KM: f64 = 4.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyHospital {
    pub hospital: Hospital,
    /// `None` when the patient's location is unknown
    pub distance_km: Option<f64>,
}

impl Located for NearbyHospital {
    fn position(&self) -> GeoPoint {
        self.hospital.location()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyAmbulance {
    pub ambulance: Ambulance,
    pub distance_km: f64,
    pub eta_minutes: u32,
}

/// Active hospitals, nearest first when `origin` is known
pub fn nearby_hospitals(hospitals: &[Hospital], origin: Option<GeoPoint>) -> Vec<NearbyHospital> {
    let mut nearby: Vec<NearbyHospital> = hospitals
        .iter()
        .filter(|h| h.is_active)
        .map(|h| NearbyHospital {
            hospital: h.clone(),
            distance_km: origin.map(|o| distance_between(o, h.location())),
        })
        .collect();
    sort_by_distance(&mut nearby, origin);
    nearby
}

/// Nearest active hospital with a free bed of `bed_type`
pub fn nearest_with_free_bed(
    hospitals: &[Hospital],
    origin: Option<GeoPoint>,
    bed_type: BedType,
) -> Option<NearbyHospital> {
    nearby_hospitals(hospitals, origin)
        .into_iter()
        .find(|n| n.hospital.beds_of(bed_type).available > 0)
}

/// Available ambulances nearest first, optionally of one type
pub fn nearby_ambulances(
    ambulances: &[Ambulance],
    origin: GeoPoint,
    ambulance_type: Option<AmbulanceType>,
) -> Vec<NearbyAmbulance> {
    let mut nearby: Vec<NearbyAmbulance> = ambulances
        .iter()
        .filter(|a| a.is_available)
        .filter(|a| ambulance_type.is_none_or(|t| a.ambulance_type == t))
        .map(|a| {
            let distance_km = distance_between(origin, a.location());
            NearbyAmbulance {
                ambulance: a.clone(),
                distance_km,
                eta_minutes: estimate_eta_minutes(distance_km),
            }
        })
        .collect();
    nearby.sort_by(|a, b| {
        a.distance_km
            .partial_cmp(&b.distance_km)
            .unwrap_or(Ordering::Equal)
    });
    nearby
}

/// Available ambulances within [`AMBULANCE_RADIUS_KM`]
pub fn ambulances_in_range(ambulances: &[Ambulance], origin: GeoPoint) -> Vec<NearbyAmbulance> {
    nearby_ambulances(ambulances, origin, None)
        .into_iter()
        .filter(|a| a.distance_km <= AMBULANCE_RADIUS_KM)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use medibed_types::{BedCount, RecordMeta};

    const PATIENT: GeoPoint = GeoPoint::new(17.385, 78.4867);

    fn hospital(name: &str, lat: f64, lng: f64, icu_free: u32) -> Hospital {
        let mut h = Hospital::new(name, GeoPoint::new(lat, lng));
        h.beds.icu = BedCount::new(icu_free, 10);
        h
    }

    fn ambulance(plate: &str, lat: f64, kind: AmbulanceType, available: bool) -> Ambulance {
        Ambulance {
            meta: RecordMeta::default(),
            vehicle_number: plate.into(),
            ambulance_type: kind,
            city: "Hyderabad".into(),
            latitude: lat,
            longitude: 78.4867,
            is_available: available,
            driver_name: String::new(),
            driver_phone: None,
            hospital_id: None,
        }
    }

    #[test]
    fn test_hospitals_sorted_and_inactive_hidden() {
        let mut closed = hospital("Closed", 17.386, 78.4867, 5);
        closed.is_active = false;
        let hospitals = vec![
            hospital("Far", 17.50, 78.4867, 5),
            closed,
            hospital("Near", 17.39, 78.4867, 0),
        ];

        let nearby = nearby_hospitals(&hospitals, Some(PATIENT));
        let names: Vec<_> = nearby.iter().map(|n| n.hospital.name.as_str()).collect();
        assert_eq!(names, vec!["Near", "Far"]);
        assert!(nearby[0].distance_km.unwrap() < 1.0);

        let icu = nearest_with_free_bed(&hospitals, Some(PATIENT), BedType::Icu).unwrap();
        assert_eq!(icu.hospital.name, "Far");
    }

    #[test]
    fn test_hospitals_without_location_keep_order() {
        let hospitals = vec![hospital("A", 17.50, 78.4867, 1), hospital("B", 17.39, 78.4867, 1)];
        let nearby = nearby_hospitals(&hospitals, None);
        assert_eq!(nearby[0].hospital.name, "A");
        assert_eq!(nearby[0].distance_km, None);
    }

    #[test]
    fn test_ambulance_filters() {
        let fleet = vec![
            ambulance("BLS-far", 17.45, AmbulanceType::Bls, true),
            ambulance("ALS-near", 17.39, AmbulanceType::Als, true),
            ambulance("ALS-busy", 17.386, AmbulanceType::Als, false),
            ambulance("BLS-near", 17.40, AmbulanceType::Bls, true),
        ];

        let all: Vec<_> = nearby_ambulances(&fleet, PATIENT, None)
            .into_iter()
            .map(|a| a.ambulance.vehicle_number)
            .collect();
        assert_eq!(all, vec!["ALS-near", "BLS-near", "BLS-far"]);

        let bls = nearby_ambulances(&fleet, PATIENT, Some(AmbulanceType::Bls));
        assert_eq!(bls.len(), 2);

        let in_range = ambulances_in_range(&fleet, PATIENT);
        assert_eq!(in_range.len(), 2);
        assert!(in_range.iter().all(|a| a.eta_minutes <= 8));
    }
}
