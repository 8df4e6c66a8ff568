//! Medibed workflow engine
//!
//! This crate holds the reproducible core of the booking system:
//!
//! - **Geo utilities**: haversine distance, ETA estimates, nearest-first ordering
//! - **Bed inventory rules**: occupancy, ICU load classification, clamped bed deltas
//! - **Booking workflow**: pure `Pending -> Approved | Rejected -> Discharged` transitions
//! - **Booking service**: the workflow run against an [`EntityStore`](medibed_store::EntityStore)
//!   with optimistic concurrency on hospital bed counts
//! - **Analytics, nearby search, assistant context and seeding** for the front ends
//!
//! # Example
//!
//! ```ignore
//! use medibed_engine::{BookingService, WorkflowConfig};
//! use medibed_store::{InMemoryStore, StaticAuth};
//! use medibed_types::UserIdentity;
//! use std::sync::Arc;
//!
//! let admin = StaticAuth::new(UserIdentity::new("admin@citygeneral.in"));
//! let service = BookingService::new(Arc::new(InMemoryStore::new()), Arc::new(admin))
//!     .with_config(WorkflowConfig::default());
//!
//! let approved = service.approve("booking-id").await?;
//! ```

pub mod analytics;
pub mod assistant;
pub mod config;
pub mod error;
pub mod geo;
pub mod nearby;
pub mod rules;
pub mod seed;
pub mod service;
pub mod workflow;

pub use analytics::{BedOccupancy, DailyFlow, HospitalAnalytics, Totals, hospital_analytics};
pub use assistant::{Assistant, assistant_context};
pub use config::{OverCommitPolicy, WorkflowConfig};
pub use error::{Unavailable, WorkflowAction, WorkflowError, WorkflowResult};
pub use geo::{Located, distance_between, distance_km, estimate_eta_minutes, sort_by_distance, within_radius};
pub use nearby::{NearbyAmbulance, NearbyHospital, nearby_ambulances, nearby_hospitals};
pub use rules::{
    AvailabilityBand, apply_bed_delta, availability_band, icu_load_prediction, occupancy_percent,
    overall_availability_band, set_bed_counts,
};
pub use seed::{SeedReport, SeedSource, seed_if_empty};
pub use service::BookingService;
pub use workflow::{Discharge, Dispatch, Transition};
