//! Medibed backend abstraction
//!
//! This crate provides:
//! - The `EntityStore` trait over the hosted entity store, with filters,
//!   sort specs and version-checked updates
//! - Auth, location and LLM provider traits
//! - A typed `Repository` layer over raw JSON records
//! - An in-memory store with JSON snapshot persistence
//! - Static and no-op providers for tests and the CLI

pub mod memory;
pub mod provider;
pub mod providers;
pub mod query;
pub mod repository;

pub use memory::*;
pub use provider::*;
pub use providers::*;
pub use query::*;
pub use repository::*;
