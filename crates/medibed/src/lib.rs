//! Hospital bed and ambulance booking
//!
//! This crate bundles the Medibed workspace:
//! - Domain types for hospitals, bookings, ambulances and the audit log
//! - The entity store abstraction with an in-memory, file-backed backend
//! - The bed inventory rules, booking workflow and geo utilities
//! - Structured error codes and diagnostics
//!
//! # Example
//!
//! ```ignore
//! use medibed::{BookingService, InMemoryStore, StaticAuth, UserIdentity};
//! use std::sync::Arc;
//!
//! let store = Arc::new(InMemoryStore::load("medibed.json")?);
//! let admin = StaticAuth::new(UserIdentity::new("admin@citygeneral.in"));
//! let service = BookingService::new(store, Arc::new(admin));
//!
//! let booking = service.approve("booking-id").await?;
//! ```

// Re-export all public APIs from internal crates
pub use medibed_diagnostics as diagnostics;
pub use medibed_engine as engine;
pub use medibed_store as store;
pub use medibed_types as types;

// Convenience re-exports
pub use medibed_diagnostics::{MedibedError, Result};
pub use medibed_engine::{BookingService, OverCommitPolicy, WorkflowConfig, WorkflowError};
pub use medibed_store::{EntityStore, InMemoryStore, Repository, StaticAuth};
pub use medibed_types::{Booking, BookingStatus, Hospital, UserIdentity};

// CLI module (only available with cli feature)
#[cfg(feature = "cli")]
pub mod cli;
