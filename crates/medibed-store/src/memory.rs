//! In-memory entity store
//!
//! Implements [`EntityStore`] over process-local maps. Used by tests and by
//! the CLI, which persists the whole store as a JSON snapshot between runs.

use crate::provider::{EntityStore, Record, StoreError};
use crate::query::{Filter, SortSpec};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use indexmap::IndexMap;
use medibed_types::{EntityKind, RecordMeta};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

type Collection = IndexMap<String, Record>;

/// Thread-safe in-memory store; clones share the same data
#[derive(Clone, Default)]
pub struct InMemoryStore {
    collections: Arc<RwLock<BTreeMap<EntityKind, Collection>>>,
}

fn now_value() -> Value {
    Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true))
}

fn record_version(record: &Record) -> u64 {
    record.get("version").and_then(Value::as_u64).unwrap_or(0)
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records of a kind
    pub fn count(&self, kind: EntityKind) -> usize {
        self.collections.read().get(&kind).map_or(0, |c| c.len())
    }

    /// Serialize every collection as `{ "Hospital": [...], ... }`
    pub fn to_snapshot(&self) -> Value {
        let collections = self.collections.read();
        let mut out = serde_json::Map::new();
        for (kind, records) in collections.iter() {
            let records = records.values().cloned().map(Value::Object).collect();
            out.insert(kind.as_str().to_string(), Value::Array(records));
        }
        Value::Object(out)
    }

    /// Build a store from a snapshot produced by [`Self::to_snapshot`]
    pub fn from_snapshot(snapshot: &Value) -> Result<Self, StoreError> {
        let object = snapshot
            .as_object()
            .ok_or_else(|| StoreError::Serialization("snapshot must be a JSON object".into()))?;

        let mut collections = BTreeMap::new();
        for (name, records) in object {
            let kind: EntityKind = name.parse().map_err(StoreError::Serialization)?;
            let records = records.as_array().ok_or_else(|| {
                StoreError::Serialization(format!("snapshot entry '{}' must be an array", name))
            })?;

            let mut collection = Collection::new();
            for record in records {
                let record = record.as_object().cloned().ok_or_else(|| {
                    StoreError::Serialization(format!("{} record must be an object", kind))
                })?;
                let id = record
                    .get("id")
                    .and_then(Value::as_str)
                    .filter(|id| !id.is_empty())
                    .ok_or_else(|| StoreError::Serialization(format!("{} record without id", kind)))?
                    .to_string();
                collection.insert(id, record);
            }
            collections.insert(kind, collection);
        }

        Ok(Self {
            collections: Arc::new(RwLock::new(collections)),
        })
    }

    /// Load a snapshot file; a missing file yields an empty store
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("no snapshot at {}, starting empty", path.display());
            return Ok(Self::new());
        }
        let content = std::fs::read_to_string(path)?;
        let snapshot: Value = serde_json::from_str(&content)?;
        let store = Self::from_snapshot(&snapshot)?;
        log::debug!("loaded snapshot from {}", path.display());
        Ok(store)
    }

    /// Write the snapshot file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(&self.to_snapshot())?;
        std::fs::write(path, content)?;
        log::debug!("saved snapshot to {}", path.display());
        Ok(())
    }

    fn merge(record: &mut Record, fields: Record) {
        for (key, value) in fields {
            if RecordMeta::FIELDS.contains(&key.as_str()) {
                continue;
            }
            record.insert(key, value);
        }
        let version = record_version(record) + 1;
        record.insert("version".into(), Value::from(version));
        record.insert("updated_date".into(), now_value());
    }
}

#[async_trait]
impl EntityStore for InMemoryStore {
    async fn create(&self, kind: EntityKind, mut record: Record) -> Result<Record, StoreError> {
        let mut collections = self.collections.write();
        let collection = collections.entry(kind).or_default();

        let id = match record.get("id").and_then(Value::as_str) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => uuid::Uuid::new_v4().to_string(),
        };
        if collection.contains_key(&id) {
            return Err(StoreError::Duplicate { kind, id });
        }

        let now = now_value();
        record.insert("id".into(), Value::String(id.clone()));
        record.insert("version".into(), Value::from(1u64));
        record.insert("created_date".into(), now.clone());
        record.insert("updated_date".into(), now);

        log::debug!("create {} {}", kind, id);
        collection.insert(id, record.clone());
        Ok(record)
    }

    async fn get(&self, kind: EntityKind, id: &str) -> Result<Option<Record>, StoreError> {
        Ok(self
            .collections
            .read()
            .get(&kind)
            .and_then(|c| c.get(id))
            .cloned())
    }

    async fn update(&self, kind: EntityKind, id: &str, fields: Record) -> Result<(), StoreError> {
        if kind.is_append_only() {
            return Err(StoreError::AppendOnly(kind));
        }
        let mut collections = self.collections.write();
        let record = collections
            .get_mut(&kind)
            .and_then(|c| c.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                kind,
                id: id.to_string(),
            })?;

        log::debug!("update {} {}", kind, id);
        Self::merge(record, fields);
        Ok(())
    }

    async fn update_if_version(
        &self,
        kind: EntityKind,
        id: &str,
        expected_version: u64,
        fields: Record,
    ) -> Result<u64, StoreError> {
        if kind.is_append_only() {
            return Err(StoreError::AppendOnly(kind));
        }
        let mut collections = self.collections.write();
        let record = collections
            .get_mut(&kind)
            .and_then(|c| c.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                kind,
                id: id.to_string(),
            })?;

        let actual = record_version(record);
        if actual != expected_version {
            return Err(StoreError::VersionConflict {
                kind,
                id: id.to_string(),
                expected: expected_version,
                actual,
            });
        }

        log::debug!("update {} {} at version {}", kind, id, expected_version);
        Self::merge(record, fields);
        Ok(record_version(record))
    }

    async fn delete(&self, kind: EntityKind, id: &str) -> Result<(), StoreError> {
        if kind.is_append_only() {
            return Err(StoreError::AppendOnly(kind));
        }
        let removed = self
            .collections
            .write()
            .get_mut(&kind)
            .and_then(|c| c.shift_remove(id));
        match removed {
            Some(_) => {
                log::debug!("delete {} {}", kind, id);
                Ok(())
            }
            None => Err(StoreError::NotFound {
                kind,
                id: id.to_string(),
            }),
        }
    }

    async fn filter(
        &self,
        kind: EntityKind,
        filter: &Filter,
        sort: Option<&SortSpec>,
    ) -> Result<Vec<Record>, StoreError> {
        let mut records: Vec<Record> = self
            .collections
            .read()
            .get(&kind)
            .map(|c| c.values().filter(|r| filter.matches(r)).cloned().collect())
            .unwrap_or_default();

        if let Some(sort) = sort {
            sort.apply(&mut records);
        }
        Ok(records)
    }
}
