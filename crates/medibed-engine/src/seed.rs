//! Initial data
//!
//! A fresh store is filled with hospitals, taken from a JSON document or
//! generated by the LLM with web grounding, and a small ambulance fleet
//! scattered around each city's hospitals.

use crate::error::{WorkflowError, WorkflowResult};
use crate::rules::{icu_load_for, normalize};
use medibed_store::{LlmProvider, LlmRequest, Repository};
use medibed_types::{
    Ambulance, AmbulanceType, BedCount, BedCounts, City, Hospital, RecordMeta,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Value, json};

/// Ambulances generated per city
pub const AMBULANCES_PER_CITY: usize = 4;

/// Max offset in degrees of a generated ambulance from the city center
pub const FLEET_SPREAD_DEG: f64 = 0.05;

pub const HOSPITAL_PROMPT: &str = "Generate real hospital data for emergency management system in these Indian cities: Hyderabad, Bangalore, Chennai, Mumbai, Delhi.

For each city, provide 3-4 major well-known hospitals with:
- Exact real hospital names
- Real addresses
- Approximate real latitude/longitude coordinates
- Real phone numbers (use actual hospital numbers if known, otherwise use format +91 XX XXXX XXXX)
- Realistic bed capacity (ICU: 20-60, General: 80-250, Emergency: 15-40, Ventilator: 10-30)
- Current availability should be 40-80% of total capacity
- Rating between 4.0-4.8
- Review count between 500-5000

Return ONLY valid JSON with no markdown, no explanations.";

/// One hospital as it appears in a seed document.
///
/// Counts accept any JSON number; fractions are rounded and negatives read
/// as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedHospital {
    pub name: String,
    pub city: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub phone: Option<String>,
    pub rating: Option<f64>,
    #[serde(deserialize_with = "optional_count")]
    pub total_reviews: Option<u32>,
    #[serde(deserialize_with = "count")]
    pub icu_beds_total: u32,
    #[serde(deserialize_with = "count")]
    pub icu_beds_available: u32,
    #[serde(deserialize_with = "count")]
    pub general_beds_total: u32,
    #[serde(deserialize_with = "count")]
    pub general_beds_available: u32,
    #[serde(deserialize_with = "count")]
    pub emergency_beds_total: u32,
    #[serde(deserialize_with = "count")]
    pub emergency_beds_available: u32,
    #[serde(deserialize_with = "count")]
    pub ventilator_beds_total: u32,
    #[serde(deserialize_with = "count")]
    pub ventilator_beds_available: u32,
}

fn whole(value: f64) -> u32 {
    // `as` saturates at u32::MAX and maps NaN to 0
    value.max(0.0).round() as u32
}

fn count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.map_or(0, whole))
}

fn optional_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.map(whole))
}

impl SeedHospital {
    /// Active hospital with clamped counts and a computed ICU load.
    ///
    /// Any load value in the document is ignored.
    pub fn into_hospital(self) -> Hospital {
        let beds = BedCounts {
            icu: normalize(BedCount::new(self.icu_beds_available, self.icu_beds_total)),
            general: normalize(BedCount::new(self.general_beds_available, self.general_beds_total)),
            emergency: normalize(BedCount::new(
                self.emergency_beds_available,
                self.emergency_beds_total,
            )),
            ventilator: normalize(BedCount::new(
                self.ventilator_beds_available,
                self.ventilator_beds_total,
            )),
        };
        Hospital {
            meta: RecordMeta::default(),
            name: self.name,
            city: self.city,
            address: self.address,
            phone: self.phone,
            rating: self.rating,
            total_reviews: self.total_reviews,
            latitude: self.latitude,
            longitude: self.longitude,
            admin_email: String::new(),
            is_active: true,
            icu_load_prediction: icu_load_for(&beds),
            beds,
        }
    }
}

/// JSON schema requested from the LLM
pub fn hospital_schema() -> Value {
    let number = json!({ "type": "number" });
    let integer = json!({ "type": "integer" });
    let string = json!({ "type": "string" });
    json!({
        "type": "object",
        "properties": {
            "hospitals": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": string,
                        "city": string,
                        "address": string,
                        "latitude": number,
                        "longitude": number,
                        "phone": string,
                        "rating": number,
                        "total_reviews": integer,
                        "icu_beds_total": integer,
                        "icu_beds_available": integer,
                        "general_beds_total": integer,
                        "general_beds_available": integer,
                        "emergency_beds_total": integer,
                        "emergency_beds_available": integer,
                        "ventilator_beds_total": integer,
                        "ventilator_beds_available": integer
                    }
                }
            }
        }
    })
}

/// Parse `{ "hospitals": [...] }`, or a bare array of hospitals
pub fn parse_seed_document(document: &Value) -> WorkflowResult<Vec<SeedHospital>> {
    let list = match document {
        Value::Array(_) => document,
        Value::Object(map) => map.get("hospitals").ok_or_else(|| {
            WorkflowError::validation("hospitals", "seed document has no 'hospitals' list")
        })?,
        _ => {
            return Err(WorkflowError::validation(
                "hospitals",
                "seed document must be an object or an array",
            ));
        }
    };
    let hospitals: Vec<SeedHospital> = serde_json::from_value(list.clone())
        .map_err(|e| WorkflowError::validation("hospitals", e.to_string()))?;

    if let Some(unnamed) = hospitals.iter().position(|h| h.name.trim().is_empty()) {
        return Err(WorkflowError::validation(
            "hospitals",
            format!("hospital #{} has no name", unnamed + 1),
        ));
    }
    Ok(hospitals)
}

fn plate<R: Rng>(city: City, rng: &mut R) -> String {
    let prefix: String = city.name().chars().take(2).collect::<String>().to_uppercase();
    let letter = |rng: &mut R| char::from(b'A' + rng.gen_range(0..26u8));
    let first = letter(rng);
    let second = letter(rng);
    format!(
        "{} {:02} {}{} {}",
        prefix,
        rng.gen_range(1..=99u32),
        first,
        second,
        rng.gen_range(1000..=9999u32)
    )
}

/// Generate ambulances around the hospitals of each supported city.
///
/// Each city with at least one hospital gets [`AMBULANCES_PER_CITY`]
/// vehicles alternating BLS/ALS, placed within [`FLEET_SPREAD_DEG`] of the
/// mean hospital position.
pub fn generate_fleet<R: Rng>(hospitals: &[Hospital], rng: &mut R) -> Vec<Ambulance> {
    let mut fleet = Vec::new();
    for city in City::ALL {
        let in_city: Vec<&Hospital> = hospitals.iter().filter(|h| h.city == city.name()).collect();
        if in_city.is_empty() {
            continue;
        }
        let n = in_city.len() as f64;
        let center_lat = in_city.iter().map(|h| h.latitude).sum::<f64>() / n;
        let center_lng = in_city.iter().map(|h| h.longitude).sum::<f64>() / n;

        for i in 0..AMBULANCES_PER_CITY {
            let ambulance_type = if i % 2 == 0 {
                AmbulanceType::Bls
            } else {
                AmbulanceType::Als
            };
            fleet.push(Ambulance {
                meta: RecordMeta::default(),
                vehicle_number: plate(city, rng),
                ambulance_type,
                city: city.name().to_string(),
                latitude: center_lat + rng.gen_range(-FLEET_SPREAD_DEG..FLEET_SPREAD_DEG),
                longitude: center_lng + rng.gen_range(-FLEET_SPREAD_DEG..FLEET_SPREAD_DEG),
                is_available: true,
                driver_name: format!("Driver {}", i + 1),
                driver_phone: Some(format!(
                    "+91 {} {}",
                    98700 + rng.gen_range(0..1000u32),
                    rng.gen_range(10000..100000u32)
                )),
                hospital_id: None,
            });
        }
    }
    fleet
}

/// Where hospital data comes from when the store is empty
pub enum SeedSource<'a> {
    /// A `{ "hospitals": [...] }` document
    Document(&'a Value),
    /// Ask the LLM, grounded with web results
    Llm(&'a dyn LlmProvider),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub hospitals_created: usize,
    pub ambulances_created: usize,
}

impl SeedReport {
    pub fn is_noop(&self) -> bool {
        self.hospitals_created == 0 && self.ambulances_created == 0
    }
}

async fn load_hospitals(source: SeedSource<'_>) -> WorkflowResult<Vec<SeedHospital>> {
    match source {
        SeedSource::Document(doc) => parse_seed_document(doc),
        SeedSource::Llm(llm) => {
            let request = LlmRequest::new(HOSPITAL_PROMPT)
                .with_internet_context()
                .with_schema(hospital_schema());
            let response = llm.invoke(&request).await?;
            parse_seed_document(&response)
        }
    }
}

/// Fill an empty store.
///
/// Nothing happens when hospitals and ambulances both exist. Existing
/// hospitals are kept; the source is only consulted when there are none.
/// The fleet is generated from `rng_seed` so runs are reproducible.
pub async fn seed_if_empty(
    repo: &Repository,
    source: SeedSource<'_>,
    rng_seed: u64,
) -> WorkflowResult<SeedReport> {
    let existing_hospitals: Vec<Hospital> = repo.list().await?;
    let existing_ambulances: Vec<Ambulance> = repo.list().await?;
    if !existing_hospitals.is_empty() && !existing_ambulances.is_empty() {
        log::debug!(
            "store already holds {} hospitals and {} ambulances",
            existing_hospitals.len(),
            existing_ambulances.len()
        );
        return Ok(SeedReport::default());
    }

    let mut report = SeedReport::default();
    let hospitals = if existing_hospitals.is_empty() {
        let seeds = load_hospitals(source).await?;
        let hospitals: Vec<Hospital> = seeds.into_iter().map(SeedHospital::into_hospital).collect();
        let created = repo.bulk_create(&hospitals).await?;
        report.hospitals_created = created.len();
        created
    } else {
        existing_hospitals
    };

    if existing_ambulances.is_empty() {
        let mut rng = StdRng::seed_from_u64(rng_seed);
        let fleet = generate_fleet(&hospitals, &mut rng);
        report.ambulances_created = repo.bulk_create(&fleet).await?.len();
    }

    log::info!(
        "seeded {} hospitals and {} ambulances",
        report.hospitals_created,
        report.ambulances_created
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use medibed_types::IcuLoad;
    use pretty_assertions::assert_eq;

    fn seed(name: &str, city: &str, lat: f64, lng: f64) -> SeedHospital {
        SeedHospital {
            name: name.into(),
            city: city.into(),
            latitude: lat,
            longitude: lng,
            icu_beds_total: 20,
            icu_beds_available: 3,
            general_beds_total: 100,
            general_beds_available: 140,
            ..SeedHospital::default()
        }
    }

    #[test]
    fn test_into_hospital_normalizes() {
        let h = seed("Apollo", "Hyderabad", 17.41, 78.41).into_hospital();
        assert!(h.is_active);
        assert_eq!(h.admin_email, "");
        assert_eq!(h.beds.general, BedCount::new(100, 100));
        assert_eq!(h.icu_load_prediction, IcuLoad::High);
    }

    #[test]
    fn test_parse_document_shapes() {
        let doc = json!({ "hospitals": [{ "name": "Apollo", "city": "Hyderabad", "icu_beds_total": 10 }] });
        let parsed = parse_seed_document(&doc).unwrap();
        assert_eq!(parsed[0].icu_beds_total, 10);

        let bare = json!([{ "name": "KIMS" }]);
        assert_eq!(parse_seed_document(&bare).unwrap().len(), 1);

        assert!(parse_seed_document(&json!({ "clinics": [] })).is_err());
        assert!(parse_seed_document(&json!([{ "city": "Delhi" }])).is_err());
    }

    #[test]
    fn test_counts_accept_fractional_numbers() {
        let doc = json!([{
            "name": "Apollo",
            "total_reviews": 1523.0,
            "icu_beds_total": 40.0,
            "icu_beds_available": 20.0,
            "general_beds_total": 120.6,
            "general_beds_available": -4,
            "emergency_beds_total": null
        }]);
        let parsed = parse_seed_document(&doc).unwrap();
        let h = &parsed[0];
        assert_eq!(h.total_reviews, Some(1523));
        assert_eq!((h.icu_beds_available, h.icu_beds_total), (20, 40));
        assert_eq!((h.general_beds_available, h.general_beds_total), (0, 121));
        assert_eq!(h.emergency_beds_total, 0);

        let hospital = parsed[0].clone().into_hospital();
        assert_eq!(hospital.beds.icu, BedCount::new(20, 40));

        assert!(parse_seed_document(&json!([{ "name": "KIMS", "icu_beds_total": "many" }])).is_err());
    }

    #[test]
    fn test_schema_declares_integer_counts() {
        let schema = hospital_schema();
        let fields = &schema["properties"]["hospitals"]["items"]["properties"];
        assert_eq!(fields["icu_beds_available"]["type"], "integer");
        assert_eq!(fields["total_reviews"]["type"], "integer");
        assert_eq!(fields["rating"]["type"], "number");
    }

    #[test]
    fn test_fleet_per_city() {
        let hospitals: Vec<Hospital> = vec![
            seed("A", "Hyderabad", 17.40, 78.40).into_hospital(),
            seed("B", "Hyderabad", 17.44, 78.50).into_hospital(),
            seed("C", "Delhi", 28.61, 77.20).into_hospital(),
            seed("D", "Pune", 18.52, 73.85).into_hospital(),
        ];
        let mut rng = StdRng::seed_from_u64(7);
        let fleet = generate_fleet(&hospitals, &mut rng);

        assert_eq!(fleet.len(), 8);
        let hyd: Vec<_> = fleet.iter().filter(|a| a.city == "Hyderabad").collect();
        assert_eq!(hyd.len(), 4);
        let types: Vec<_> = hyd.iter().map(|a| a.ambulance_type).collect();
        assert_eq!(
            types,
            vec![AmbulanceType::Bls, AmbulanceType::Als, AmbulanceType::Bls, AmbulanceType::Als]
        );
        for a in &hyd {
            assert!((a.latitude - 17.42).abs() <= FLEET_SPREAD_DEG + 1e-9);
            assert!((a.longitude - 78.45).abs() <= FLEET_SPREAD_DEG + 1e-9);
            assert!(a.vehicle_number.starts_with("HY "));
            assert_eq!(a.vehicle_number.len(), "HY 07 KT 4821".len());
            assert!(a.is_available);
        }
        assert_eq!(hyd[2].driver_name, "Driver 3");
    }

    #[test]
    fn test_fleet_is_deterministic() {
        let hospitals = vec![seed("A", "Chennai", 13.08, 80.27).into_hospital()];
        let a = generate_fleet(&hospitals, &mut StdRng::seed_from_u64(42));
        let b = generate_fleet(&hospitals, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }
}
