use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;
use uuid::Uuid;

use passgate_core::{AttributeKey, RequestMetadata};

use crate::capability::{PendingRequest, ProofCapability, RequestHandle};
use crate::error::DisclosureError;
use crate::events::CapabilityEvent;

/// Minimum buffer for a request's event channel.
const EVENT_CHANNEL_CAPACITY: usize = 64;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Scripted, in-process proof capability.
///
/// Accepts a fixed set of key names, records every key it is offered, and
/// replays a scripted event sequence into each finalized request. Useful for
/// tests and for demonstrating a full session without a holder device.
pub struct InMemoryCapability {
    accepted: Arc<HashSet<String>>,
    available: bool,
    create_failure: Option<String>,
    script: Vec<CapabilityEvent>,
    base_url: String,
    probes: Arc<Mutex<Vec<AttributeKey>>>,
    sender: Arc<Mutex<Option<mpsc::Sender<CapabilityEvent>>>>,
    last_metadata: Mutex<Option<RequestMetadata>>,
}

impl InMemoryCapability {
    /// Capability accepting the current-schema keys `age` and `firstname`.
    pub fn new() -> Self {
        Self::accepting(["age", "firstname"])
    }

    /// Capability accepting exactly the given key names.
    pub fn accepting<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            accepted: Arc::new(keys.into_iter().map(Into::into).collect()),
            available: true,
            create_failure: None,
            script: Vec::new(),
            base_url: "https://passgate.local".into(),
            probes: Arc::new(Mutex::new(Vec::new())),
            sender: Arc::new(Mutex::new(None)),
            last_metadata: Mutex::new(None),
        }
    }

    /// Make `initialize` fail.
    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    /// Make `create_request` fail with the given reason.
    pub fn failing_requests(mut self, reason: impl Into<String>) -> Self {
        self.create_failure = Some(reason.into());
        self
    }

    /// Events buffered into every request's stream when it is finalized.
    pub fn with_script(mut self, events: Vec<CapabilityEvent>) -> Self {
        self.script = events;
        self
    }

    /// Base of the generated request URLs.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Every key offered to any request so far, in order.
    pub fn probe_log(&self) -> Vec<AttributeKey> {
        lock(&self.probes).clone()
    }

    /// Metadata of the most recently created request.
    pub fn last_metadata(&self) -> Option<RequestMetadata> {
        lock(&self.last_metadata).clone()
    }

    /// Push handle for the most recently finalized request.
    pub fn emitter(&self) -> Option<EventEmitter> {
        lock(&self.sender).clone().map(|tx| EventEmitter { tx })
    }

    /// Drop the capability's own sender so the stream ends once every
    /// [`EventEmitter`] is dropped too.
    pub fn close_events(&self) {
        lock(&self.sender).take();
    }
}

impl Default for InMemoryCapability {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProofCapability for InMemoryCapability {
    async fn initialize(&self) -> Result<(), DisclosureError> {
        if !self.available {
            return Err(DisclosureError::CapabilityUnavailable(
                "in-memory capability switched off".into(),
            ));
        }
        Ok(())
    }

    async fn create_request(
        &self,
        metadata: &RequestMetadata,
    ) -> Result<Box<dyn RequestHandle>, DisclosureError> {
        if let Some(reason) = &self.create_failure {
            return Err(DisclosureError::RequestCreationFailed(reason.clone()));
        }
        *lock(&self.last_metadata) = Some(metadata.clone());

        let id = Uuid::now_v7();
        tracing::debug!(request_id = %id, scope = %metadata.scope, "in-memory request created");

        Ok(Box::new(InMemoryRequest {
            id,
            accepted: Arc::clone(&self.accepted),
            disclosed: Vec::new(),
            script: self.script.clone(),
            url: format!("{}/request/{}", self.base_url.trim_end_matches('/'), id),
            probes: Arc::clone(&self.probes),
            sender: Arc::clone(&self.sender),
        }))
    }

    fn capability_id(&self) -> &str {
        "in-memory"
    }
}

struct InMemoryRequest {
    id: Uuid,
    accepted: Arc<HashSet<String>>,
    disclosed: Vec<AttributeKey>,
    script: Vec<CapabilityEvent>,
    url: String,
    probes: Arc<Mutex<Vec<AttributeKey>>>,
    sender: Arc<Mutex<Option<mpsc::Sender<CapabilityEvent>>>>,
}

impl RequestHandle for InMemoryRequest {
    fn disclose(&mut self, key: &AttributeKey) -> Result<(), DisclosureError> {
        lock(&self.probes).push(key.clone());
        if !self.accepted.contains(key.as_str()) {
            return Err(DisclosureError::UnsupportedAttribute(key.clone()));
        }
        if !self.disclosed.contains(key) {
            self.disclosed.push(key.clone());
        }
        Ok(())
    }

    fn disclosed(&self) -> Vec<AttributeKey> {
        self.disclosed.clone()
    }

    fn finalize(self: Box<Self>) -> Result<PendingRequest, DisclosureError> {
        if self.disclosed.is_empty() {
            return Err(DisclosureError::RequestCreationFailed(
                "request discloses no attributes".into(),
            ));
        }

        let (tx, rx) = mpsc::channel(self.script.len().max(EVENT_CHANNEL_CAPACITY));
        for event in &self.script {
            if tx.try_send(event.clone()).is_err() {
                tracing::warn!(request_id = %self.id, "scripted event dropped");
            }
        }
        *lock(&self.sender) = Some(tx);

        tracing::debug!(
            request_id = %self.id,
            keys = self.disclosed.len(),
            scripted = self.script.len(),
            "in-memory request finalized"
        );

        Ok(PendingRequest {
            url: self.url,
            events: rx,
        })
    }
}

/// Pushes events into a finalized in-memory request.
#[derive(Debug, Clone)]
pub struct EventEmitter {
    tx: mpsc::Sender<CapabilityEvent>,
}

impl EventEmitter {
    /// Send an event. Returns false once the receiving session is gone.
    pub async fn emit(&self, event: CapabilityEvent) -> bool {
        self.tx.send(event).await.is_ok()
    }
}
