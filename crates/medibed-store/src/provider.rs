//! Backend traits consumed by the booking workflow

use crate::query::{Filter, SortSpec};
use async_trait::async_trait;
use medibed_diagnostics::{
    MB0200, MB0201, MB0202, MB0203, MB0301, MB0303, MedibedError,
};
use medibed_types::{EntityKind, GeoPoint, UserIdentity};
use serde_json::{Map, Value};

/// A stored record: a JSON object including the store-managed fields
pub type Record = Map<String, Value>;

/// Trait for the hosted entity store
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Insert a record; the store assigns `id`, `version` and timestamps
    async fn create(&self, kind: EntityKind, record: Record) -> Result<Record, StoreError>;

    /// Insert several records
    async fn bulk_create(
        &self,
        kind: EntityKind,
        records: Vec<Record>,
    ) -> Result<Vec<Record>, StoreError> {
        let mut created = Vec::with_capacity(records.len());
        for record in records {
            created.push(self.create(kind, record).await?);
        }
        Ok(created)
    }

    /// Fetch one record by id
    async fn get(&self, kind: EntityKind, id: &str) -> Result<Option<Record>, StoreError>;

    /// Merge `fields` into the record, unconditionally
    async fn update(&self, kind: EntityKind, id: &str, fields: Record) -> Result<(), StoreError>;

    /// Merge `fields` only if the record is still at `expected_version`.
    ///
    /// Returns the new version, or [`StoreError::VersionConflict`] when another
    /// writer got there first.
    async fn update_if_version(
        &self,
        kind: EntityKind,
        id: &str,
        expected_version: u64,
        fields: Record,
    ) -> Result<u64, StoreError>;

    /// Remove a record; append-only kinds refuse
    async fn delete(&self, kind: EntityKind, id: &str) -> Result<(), StoreError>;

    /// Records matching every condition of `filter`, optionally sorted
    async fn filter(
        &self,
        kind: EntityKind,
        filter: &Filter,
        sort: Option<&SortSpec>,
    ) -> Result<Vec<Record>, StoreError>;

    /// All records of a kind in insertion order
    async fn list(&self, kind: EntityKind) -> Result<Vec<Record>, StoreError> {
        self.filter(kind, &Filter::all(), None).await
    }
}

/// Trait for the authentication backend
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// The signed-in user
    async fn current_user(&self) -> Result<UserIdentity, StoreError>;
}

/// Source of the patient's position (device geolocation or a chosen city)
pub trait LocationSource: Send + Sync {
    fn location(&self) -> Option<GeoPoint>;
}

/// Request sent to the LLM integration
#[derive(Debug, Clone, PartialEq)]
pub struct LlmRequest {
    pub prompt: String,
    /// Let the backend ground the answer with web results
    pub add_context_from_internet: bool,
    /// When set, the response is a JSON value following this schema
    pub response_json_schema: Option<Value>,
}

impl LlmRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            add_context_from_internet: false,
            response_json_schema: None,
        }
    }

    pub fn with_internet_context(mut self) -> Self {
        self.add_context_from_internet = true;
        self
    }

    pub fn with_schema(mut self, schema: Value) -> Self {
        self.response_json_schema = Some(schema);
        self
    }
}

/// Trait for the LLM integration
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Plain requests answer with a JSON string, schema requests with structured JSON
    async fn invoke(&self, request: &LlmRequest) -> Result<Value, StoreError>;
}

/// Backend error
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("{kind} '{id}' not found")]
    NotFound { kind: EntityKind, id: String },

    #[error("{kind} '{id}' already exists")]
    Duplicate { kind: EntityKind, id: String },

    #[error("{kind} '{id}' changed concurrently (expected version {expected}, found {actual})")]
    VersionConflict {
        kind: EntityKind,
        id: String,
        expected: u64,
        actual: u64,
    },

    #[error("{0} records are append-only")]
    AppendOnly(EntityKind),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("LLM error: {0}")]
    Llm(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err.to_string())
    }
}

impl From<StoreError> for MedibedError {
    fn from(err: StoreError) -> Self {
        let code = match &err {
            StoreError::NotFound { .. } => MB0200,
            StoreError::VersionConflict { .. } => MB0203,
            StoreError::Serialization(_) => MB0202,
            StoreError::Io(_) => MB0301,
            StoreError::Llm(_) => return MedibedError::system(MB0303, err.to_string()),
            _ => MB0201,
        };
        let kind = match &err {
            StoreError::NotFound { kind, .. }
            | StoreError::Duplicate { kind, .. }
            | StoreError::VersionConflict { kind, .. }
            | StoreError::AppendOnly(kind) => Some(kind.to_string()),
            _ => None,
        };
        MedibedError::Store {
            code,
            message: err.to_string(),
            kind,
        }
    }
}
