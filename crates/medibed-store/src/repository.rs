//! Typed access to the entity store

use crate::provider::{EntityStore, Record, StoreError};
use crate::query::{Filter, SortSpec};
use medibed_types::{Entity, RecordMeta};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Convert a serializable value into a record, dropping store-managed fields
pub fn to_record<T: Serialize>(value: &T) -> Result<Record, StoreError> {
    match serde_json::to_value(value)? {
        Value::Object(mut map) => {
            for field in RecordMeta::FIELDS {
                map.remove(field);
            }
            Ok(map)
        }
        other => Err(StoreError::Serialization(format!(
            "expected a JSON object, got {}",
            other
        ))),
    }
}

/// Build a partial update from a `json!({...})` literal
pub fn fields(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        _ => Record::new(),
    }
}

fn from_record<T: Entity>(record: Record) -> Result<T, StoreError> {
    Ok(serde_json::from_value(Value::Object(record))?)
}

/// Entity store wrapper that (de)serializes [`Entity`] types
#[derive(Clone)]
pub struct Repository {
    store: Arc<dyn EntityStore>,
}

impl Repository {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn EntityStore> {
        &self.store
    }

    pub async fn create<T: Entity>(&self, entity: &T) -> Result<T, StoreError> {
        let record = self.store.create(T::KIND, to_record(entity)?).await?;
        from_record(record)
    }

    pub async fn bulk_create<T: Entity>(&self, entities: &[T]) -> Result<Vec<T>, StoreError> {
        let records = entities.iter().map(to_record).collect::<Result<Vec<_>, _>>()?;
        self.store
            .bulk_create(T::KIND, records)
            .await?
            .into_iter()
            .map(from_record)
            .collect()
    }

    pub async fn find<T: Entity>(&self, id: &str) -> Result<Option<T>, StoreError> {
        self.store
            .get(T::KIND, id)
            .await?
            .map(from_record)
            .transpose()
    }

    /// Like [`Self::find`] but a missing record is an error
    pub async fn get<T: Entity>(&self, id: &str) -> Result<T, StoreError> {
        self.find(id).await?.ok_or_else(|| StoreError::NotFound {
            kind: T::KIND,
            id: id.to_string(),
        })
    }

    pub async fn list<T: Entity>(&self) -> Result<Vec<T>, StoreError> {
        self.store
            .list(T::KIND)
            .await?
            .into_iter()
            .map(from_record)
            .collect()
    }

    pub async fn filter<T: Entity>(
        &self,
        filter: &Filter,
        sort: Option<&SortSpec>,
    ) -> Result<Vec<T>, StoreError> {
        self.store
            .filter(T::KIND, filter, sort)
            .await?
            .into_iter()
            .map(from_record)
            .collect()
    }

    pub async fn update<T: Entity>(&self, id: &str, fields: Record) -> Result<(), StoreError> {
        self.store.update(T::KIND, id, fields).await
    }

    pub async fn update_if_version<T: Entity>(
        &self,
        id: &str,
        expected_version: u64,
        fields: Record,
    ) -> Result<u64, StoreError> {
        self.store
            .update_if_version(T::KIND, id, expected_version, fields)
            .await
    }

    pub async fn delete<T: Entity>(&self, id: &str) -> Result<(), StoreError> {
        self.store.delete(T::KIND, id).await
    }
}
