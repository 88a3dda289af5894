//! # Pub/Sub Transport
//!
//! The messaging seam between scanner devices and the ingestion pipeline.
//!
//! ## Topic Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Topic Layout                                    │
//! │                                                                         │
//! │  INBOUND (scanner → pipeline)                                          │
//! │  ────────────────────────────                                          │
//! │  rfid/store          raw tag uid, store-mode scan                      │
//! │  rfid/sell           raw tag uid, sell-mode scan                       │
//! │                                                                         │
//! │  OUTBOUND (pipeline → scanner / UI)                                    │
//! │  ──────────────────────────────────                                    │
//! │  rfid/store/result   JSON ScanResult for a store scan                  │
//! │  rfid/sell/result    JSON ScanResult for a sell scan                   │
//! │  mode                "store" | "sell" | "off" on session change        │
//! │                                                                         │
//! │  Payloads are plain UTF-8 strings; results are serialized JSON.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Production deployments back [`Transport`] with an MQTT broker; tests
//! and demos use [`InMemoryTransport`].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};
use tracing::trace;

use crate::error::{ScanError, ScanResult};

// =============================================================================
// Topics
// =============================================================================

/// Inbound store-mode scans (raw uids).
pub const TOPIC_STORE: &str = "rfid/store";

/// Inbound sell-mode scans (raw uids).
pub const TOPIC_SELL: &str = "rfid/sell";

/// Outbound store-mode scan results (JSON).
pub const TOPIC_STORE_RESULT: &str = "rfid/store/result";

/// Outbound sell-mode scan results (JSON).
pub const TOPIC_SELL_RESULT: &str = "rfid/sell/result";

/// Outbound session mode notifications ("store" | "sell" | "off").
pub const TOPIC_MODE: &str = "mode";

// =============================================================================
// Transport Trait
// =============================================================================

/// A pub/sub message transport.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Publishes a payload on a topic. Fire-and-forget: delivery to zero
    /// subscribers is not an error.
    async fn publish(&self, topic: &str, payload: String) -> ScanResult<()>;

    /// Subscribes to a topic, returning a stream of payloads.
    async fn subscribe(&self, topic: &str) -> ScanResult<Subscription>;
}

/// A stream of payloads for one topic subscription.
pub struct Subscription {
    rx: mpsc::Receiver<String>,
}

impl Subscription {
    /// Wraps a raw channel receiver. Transport implementations feed the
    /// sending half.
    pub fn new(rx: mpsc::Receiver<String>) -> Self {
        Subscription { rx }
    }

    /// Receives the next payload, or `None` once the transport drops the
    /// subscription.
    pub async fn recv(&mut self) -> Option<String> {
        self.rx.recv().await
    }
}

// =============================================================================
// In-Memory Transport
// =============================================================================

/// In-process broker: topic → list of subscriber channels.
///
/// Dead subscribers (dropped [`Subscription`]s) are pruned on the next
/// publish to their topic.
#[derive(Default)]
pub struct InMemoryTransport {
    subscribers: Mutex<HashMap<String, Vec<mpsc::Sender<String>>>>,
}

impl InMemoryTransport {
    /// Creates an empty broker.
    pub fn new() -> Self {
        InMemoryTransport::default()
    }

    /// Creates an empty broker behind an `Arc`, ready to share between
    /// the pipeline and test scanners.
    pub fn shared() -> Arc<Self> {
        Arc::new(InMemoryTransport::new())
    }
}

#[async_trait]
impl Transport for InMemoryTransport {
    async fn publish(&self, topic: &str, payload: String) -> ScanResult<()> {
        trace!(topic = %topic, "Publishing message");

        let mut subscribers = self.subscribers.lock().await;
        if let Some(senders) = subscribers.get_mut(topic) {
            senders.retain(|tx| tx.try_send(payload.clone()).is_ok());
        }

        Ok(())
    }

    async fn subscribe(&self, topic: &str) -> ScanResult<Subscription> {
        let (tx, rx) = mpsc::channel(64);

        let mut subscribers = self.subscribers.lock().await;
        subscribers.entry(topic.to_string()).or_default().push(tx);

        Ok(Subscription::new(rx))
    }
}

/// Publishes a serializable value as JSON.
pub async fn publish_json<T: serde::Serialize>(
    transport: &dyn Transport,
    topic: &str,
    value: &T,
) -> ScanResult<()> {
    let payload =
        serde_json::to_string(value).map_err(|e| ScanError::Transport(e.to_string()))?;
    transport.publish(topic, payload).await
}

// =============================================================================
// Unit Tests
// =============================================================================
