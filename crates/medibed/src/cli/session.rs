//! Shared state of one CLI invocation

use super::output::OutputFormat;
use anyhow::{Context, Result};
use medibed_diagnostics::MedibedError;
use medibed_engine::{BookingService, OverCommitPolicy, WorkflowConfig, WorkflowError};
use medibed_store::{CityLocation, FixedLocation, InMemoryStore, LocationSource, StaticAuth};
use medibed_types::{City, UserIdentity};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Options every command shares
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Store snapshot file
    pub data: PathBuf,
    pub user: String,
    pub name: Option<String>,
    pub city: Option<City>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub allow_overcommit: bool,
    pub no_patient_audit: bool,
    pub max_update_attempts: Option<u32>,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
}

impl SessionConfig {
    pub fn new(data: impl Into<PathBuf>, user: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            user: user.into(),
            name: None,
            city: None,
            lat: None,
            lng: None,
            allow_overcommit: false,
            no_patient_audit: false,
            max_update_attempts: None,
            format: OutputFormat::default(),
            output: None,
        }
    }

    pub fn workflow_config(&self) -> WorkflowConfig {
        let mut config = WorkflowConfig::default().with_patient_audit(!self.no_patient_audit);
        if self.allow_overcommit {
            config = config.with_over_commit(OverCommitPolicy::AllowWithoutDecrement);
        }
        if let Some(attempts) = self.max_update_attempts {
            config = config.with_max_update_attempts(attempts);
        }
        config
    }

    pub fn identity(&self) -> UserIdentity {
        let user = UserIdentity::new(self.user.trim());
        match &self.name {
            Some(name) => user.with_name(name.clone()),
            None => user,
        }
    }

    /// Coordinates win over a city pick; neither means unknown
    pub fn location_source(&self) -> Arc<dyn LocationSource> {
        match (self.lat, self.lng, self.city) {
            (Some(lat), Some(lng), _) => Arc::new(FixedLocation::at(lat, lng)),
            (_, _, Some(city)) => Arc::new(CityLocation(city)),
            _ => Arc::new(FixedLocation::unknown()),
        }
    }
}

/// The store loaded from disk and a service acting as the configured user
pub struct Session {
    config: SessionConfig,
    store: Arc<InMemoryStore>,
    service: BookingService,
}

impl Session {
    pub fn open(config: SessionConfig) -> Result<Self> {
        let store = InMemoryStore::load(&config.data)
            .map_err(MedibedError::from)
            .with_context(|| format!("Failed to load store from {}", config.data.display()))?;
        let store = Arc::new(store);
        log::debug!("acting as {} against {}", config.user, config.data.display());

        let service = BookingService::new(store.clone(), Arc::new(StaticAuth::new(config.identity())))
            .with_location(config.location_source())
            .with_config(config.workflow_config());

        Ok(Self {
            config,
            store,
            service,
        })
    }

    pub fn service(&self) -> &BookingService {
        &self.service
    }

    pub fn data_path(&self) -> &Path {
        &self.config.data
    }

    pub fn output_file(&self) -> Option<&Path> {
        self.config.output.as_deref()
    }

    /// Write the store back to its snapshot file
    pub fn save(&self) -> Result<()> {
        self.store
            .save(&self.config.data)
            .map_err(MedibedError::from)
            .with_context(|| format!("Failed to save store to {}", self.config.data.display()))
    }

    pub fn print<T: Serialize>(&self, value: &T) -> Result<()> {
        super::output::print_output(value, self.config.format, self.output_file())
    }
}

/// Lift an engine error into a coded diagnostic
pub fn diagnose(err: WorkflowError) -> anyhow::Error {
    MedibedError::from(err).into()
}
