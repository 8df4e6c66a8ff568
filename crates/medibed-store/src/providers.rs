//! Static and no-op provider implementations

use crate::provider::{AuthProvider, LlmProvider, LlmRequest, LocationSource, StoreError};
use async_trait::async_trait;
use medibed_types::{City, GeoPoint, UserIdentity};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;

/// Auth provider that always returns the same user
#[derive(Debug, Clone)]
pub struct StaticAuth {
    user: UserIdentity,
}

impl StaticAuth {
    pub fn new(user: UserIdentity) -> Self {
        Self { user }
    }
}

#[async_trait]
impl AuthProvider for StaticAuth {
    async fn current_user(&self) -> Result<UserIdentity, StoreError> {
        Ok(self.user.clone())
    }
}

/// Location source pinned to one point, or to none when geolocation is denied
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedLocation(pub Option<GeoPoint>);

impl FixedLocation {
    pub fn at(lat: f64, lng: f64) -> Self {
        Self(Some(GeoPoint::new(lat, lng)))
    }

    pub fn unknown() -> Self {
        Self(None)
    }
}

impl LocationSource for FixedLocation {
    fn location(&self) -> Option<GeoPoint> {
        self.0
    }
}

/// Manually selected city; the patient is placed at its center
#[derive(Debug, Clone, Copy)]
pub struct CityLocation(pub City);

impl LocationSource for CityLocation {
    fn location(&self) -> Option<GeoPoint> {
        Some(self.0.center())
    }
}

/// NoOp LLM provider for testing; answers every request with `null`
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpLlm;

#[async_trait]
impl LlmProvider for NoOpLlm {
    async fn invoke(&self, _request: &LlmRequest) -> Result<Value, StoreError> {
        Ok(Value::Null)
    }
}

/// LLM provider replaying queued responses and recording the requests it saw
#[derive(Clone, Default)]
pub struct ScriptedLlm {
    responses: Arc<RwLock<VecDeque<Value>>>,
    requests: Arc<RwLock<Vec<LlmRequest>>>,
}

impl ScriptedLlm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond_with(self, response: Value) -> Self {
        self.responses.write().push_back(response);
        self
    }

    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.read().clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedLlm {
    async fn invoke(&self, request: &LlmRequest) -> Result<Value, StoreError> {
        self.requests.write().push(request.clone());
        self.responses
            .write()
            .pop_front()
            .ok_or_else(|| StoreError::Llm("no scripted response left".into()))
    }
}
