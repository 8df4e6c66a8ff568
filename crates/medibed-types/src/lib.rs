//! Medibed domain types
//!
//! This crate defines the entities exchanged with the entity store:
//! - Hospitals with per-category bed inventory and ICU load
//! - Bed bookings and their status lifecycle
//! - Ambulances and ambulance bookings
//! - Discharge records and the audit log
//! - Geographic points and the supported city centers

pub mod ambulance;
pub mod audit;
pub mod booking;
pub mod discharge;
pub mod entity;
pub mod geo;
pub mod hospital;
pub mod user;

pub use ambulance::*;
pub use audit::*;
pub use booking::*;
pub use discharge::*;
pub use entity::*;
pub use geo::*;
pub use hospital::*;
pub use user::*;
