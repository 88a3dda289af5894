//! # Scan Worker
//!
//! The subscription loop tying the transport to the pipeline: one task
//! listening on both scan topics, feeding each raw uid to the pipeline.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Scan Worker Loop                                 │
//! │                                                                         │
//! │   rfid/store ──┐                                                        │
//! │                ├──► select! ──► TagPipeline::handle_*_scan             │
//! │   rfid/sell ───┘       │                                                │
//! │                        │                                                │
//! │   shutdown ────────────┘  (graceful: current scan finishes first)      │
//! │                                                                         │
//! │  Pipeline errors are logged and the loop continues; one bad scan       │
//! │  never takes the worker down.                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::error::{ScanError, ScanResult};
use crate::pipeline::TagPipeline;
use crate::transport::{Subscription, Transport, TOPIC_SELL, TOPIC_STORE};

/// Consumes raw scans from the transport and runs them through the
/// pipeline.
pub struct ScanWorker {
    pipeline: Arc<TagPipeline>,
    store_sub: Subscription,
    sell_sub: Subscription,
    shutdown_rx: mpsc::Receiver<()>,
}

/// Handle for controlling a running [`ScanWorker`].
#[derive(Clone)]
pub struct ScanWorkerHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl ScanWorkerHandle {
    /// Triggers graceful shutdown.
    pub async fn shutdown(&self) -> ScanResult<()> {
        self.shutdown_tx
            .send(())
            .await
            .map_err(|_| ScanError::Channel("Shutdown channel closed".into()))
    }
}

impl ScanWorker {
    /// Subscribes to both scan topics and returns the worker plus its
    /// control handle. Call [`ScanWorker::run`] (usually via
    /// `tokio::spawn`) to start consuming.
    pub async fn new(
        pipeline: Arc<TagPipeline>,
        transport: Arc<dyn Transport>,
    ) -> ScanResult<(Self, ScanWorkerHandle)> {
        let store_sub = transport.subscribe(TOPIC_STORE).await?;
        let sell_sub = transport.subscribe(TOPIC_SELL).await?;
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let worker = ScanWorker {
            pipeline,
            store_sub,
            sell_sub,
            shutdown_rx,
        };

        let handle = ScanWorkerHandle { shutdown_tx };

        Ok((worker, handle))
    }

    /// Runs the worker loop until shutdown or the transport closes.
    pub async fn run(mut self) {
        info!("Scan worker starting");

        loop {
            tokio::select! {
                uid = self.store_sub.recv() => match uid {
                    Some(uid) => {
                        if let Err(e) = self.pipeline.handle_store_scan(&uid).await {
                            error!(uid = %uid, error = %e, "Store scan processing failed");
                        }
                    }
                    None => {
                        warn!("Store scan topic closed");
                        break;
                    }
                },

                uid = self.sell_sub.recv() => match uid {
                    Some(uid) => {
                        if let Err(e) = self.pipeline.handle_sell_scan(&uid).await {
                            error!(uid = %uid, error = %e, "Sell scan processing failed");
                        }
                    }
                    None => {
                        warn!("Sell scan topic closed");
                        break;
                    }
                },

                _ = self.shutdown_rx.recv() => {
                    info!("Scan worker shutting down");
                    break;
                }
            }
        }

        info!("Scan worker stopped");
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionController;
    use crate::transport::{InMemoryTransport, TOPIC_STORE_RESULT};
    use chrono::Utc;
    use std::time::Duration;
    use stocktag_core::{Product, PurchaseOrderLine};
    use stocktag_db::MemoryStore;
    use tokio::time::timeout;

    async fn seeded_store() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        let now = Utc::now();
        store
            .insert_product(Product {
                id: "p1".to_string(),
                sku: "TEE-BLK-M".to_string(),
                name: "Black Tee Medium".to_string(),
                sell_price_cents: 5000,
                stock: 0,
                created_at: now,
                updated_at: now,
            })
            .await;
        store
            .insert_po_line(PurchaseOrderLine {
                id: "pol-1".to_string(),
                po_id: "po-1".to_string(),
                product_id: "p1".to_string(),
                sku: "TEE-BLK-M".to_string(),
                name: "Black Tee Medium".to_string(),
                quantity: 10,
                created_at: now,
            })
            .await;
        store
    }

    #[tokio::test]
    async fn test_worker_routes_scans_end_to_end() {
        let store = seeded_store().await;
        let transport = InMemoryTransport::shared();
        let session = Arc::new(SessionController::new(store.clone(), transport.clone()));
        let pipeline = Arc::new(TagPipeline::new(
            session.clone(),
            store.clone(),
            transport.clone(),
        ));

        let (worker, handle) = ScanWorker::new(pipeline, transport.clone()).await.unwrap();
        let task = tokio::spawn(worker.run());

        let mut results = transport.subscribe(TOPIC_STORE_RESULT).await.unwrap();

        session.start_store("po-1", "pol-1").await.unwrap();
        transport
            .publish(TOPIC_STORE, "E200-1".to_string())
            .await
            .unwrap();

        let payload = timeout(Duration::from_secs(1), results.recv())
            .await
            .expect("timed out waiting for result")
            .expect("subscription closed");
        assert!(payload.contains("\"success\":true"));
        assert!(store.tag("E200-1").await.is_some());

        handle.shutdown().await.unwrap();
        timeout(Duration::from_secs(1), task)
            .await
            .expect("worker did not stop")
            .unwrap();
    }
}
