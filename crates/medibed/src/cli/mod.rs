//! CLI functionality for the medibed tool
//!
//! This module contains all CLI-related functionality including:
//! - Session setup from global flags and the store snapshot file
//! - Hospital, booking and ambulance commands
//! - Output formatting

pub mod ambulances;
pub mod bookings;
pub mod hospitals;
pub mod output;
pub mod session;

pub use session::{Session, SessionConfig};
