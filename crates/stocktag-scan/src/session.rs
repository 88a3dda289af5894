//! # Session Mode Controller
//!
//! The exclusive scan-session state machine.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Session State Machine                             │
//! │                                                                         │
//! │                    start_store(po, line)                                │
//! │          ┌───────────────────────────────────┐                          │
//! │          ▼                                   │                          │
//! │   ┌─────────────┐   stop() / quota met   ┌───┴────┐                     │
//! │   │   Store     │ ─────────────────────► │        │                     │
//! │   │ (po, line)  │                        │  Idle  │                     │
//! │   └─────────────┘                        │        │                     │
//! │   ┌─────────────┐ ◄───────────────────── └───┬────┘                     │
//! │   │    Sell     │        stop()              │                          │
//! │   │   (sale)    │ ◄──────────────────────────┘                          │
//! │   └─────────────┘      start_sell(sale)                                 │
//! │                                                                         │
//! │  • At most ONE mode is active; starting a mode replaces whatever       │
//! │    was active before, without warning the previous operator.           │
//! │  • Every transition publishes its mode word on the `mode` topic:       │
//! │    "store", "sell", or "off". stop() is idempotent and publishes       │
//! │    "off" even when already Idle, so scanner displays can re-sync.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use stocktag_core::SaleStatus;
use stocktag_db::ScanStore;

use crate::error::{ScanError, ScanResult};
use crate::transport::{Transport, TOPIC_MODE};

/// The active scan mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// No session active; scans are dropped.
    Idle,

    /// Intake: scans register new tags against one purchase-order line.
    Store { po_id: String, line_id: String },

    /// Checkout: scans sell tags onto one draft sale.
    Sell { sale_id: String },
}

impl Mode {
    /// The mode word published on the `mode` topic.
    pub fn as_wire(&self) -> &'static str {
        match self {
            Mode::Idle => "off",
            Mode::Store { .. } => "store",
            Mode::Sell { .. } => "sell",
        }
    }
}

/// Controls the single scan session.
///
/// Targets are validated against storage at start time; scans re-resolve
/// them per event, so a target deleted mid-session degrades into per-scan
/// failures rather than a wedged controller.
pub struct SessionController {
    mode: Mutex<Mode>,
    store: Arc<dyn ScanStore>,
    transport: Arc<dyn Transport>,
}

impl SessionController {
    /// Creates an Idle controller.
    pub fn new(store: Arc<dyn ScanStore>, transport: Arc<dyn Transport>) -> Self {
        SessionController {
            mode: Mutex::new(Mode::Idle),
            store,
            transport,
        }
    }

    /// Snapshot of the current mode.
    pub async fn current(&self) -> Mode {
        self.mode.lock().await.clone()
    }

    /// Starts a store session targeting one purchase-order line.
    ///
    /// Replaces any active session. Fails with `InvalidTarget` when the
    /// line does not exist or belongs to a different purchase order.
    pub async fn start_store(&self, po_id: &str, line_id: &str) -> ScanResult<()> {
        let line = self
            .store
            .find_po_line(line_id)
            .await?
            .ok_or_else(|| ScanError::InvalidTarget {
                entity: "PurchaseOrderLine",
                id: line_id.to_string(),
            })?;

        if line.po_id != po_id {
            return Err(ScanError::InvalidTarget {
                entity: "PurchaseOrderLine",
                id: line_id.to_string(),
            });
        }

        let mode = Mode::Store {
            po_id: po_id.to_string(),
            line_id: line_id.to_string(),
        };

        {
            let mut current = self.mode.lock().await;
            if *current != Mode::Idle {
                debug!(previous = current.as_wire(), "Replacing active session");
            }
            *current = mode;
        }

        info!(po_id = %po_id, line_id = %line_id, "Store session started");
        self.transport
            .publish(TOPIC_MODE, "store".to_string())
            .await
    }

    /// Starts a sell session targeting one draft sale.
    ///
    /// Replaces any active session. Fails with `InvalidTarget` when the
    /// sale does not exist or is no longer a draft.
    pub async fn start_sell(&self, sale_id: &str) -> ScanResult<()> {
        let sale = self
            .store
            .find_sale(sale_id)
            .await?
            .ok_or_else(|| ScanError::InvalidTarget {
                entity: "Sale",
                id: sale_id.to_string(),
            })?;

        if sale.status != SaleStatus::Draft {
            return Err(ScanError::InvalidTarget {
                entity: "Sale",
                id: sale_id.to_string(),
            });
        }

        {
            let mut current = self.mode.lock().await;
            if *current != Mode::Idle {
                debug!(previous = current.as_wire(), "Replacing active session");
            }
            *current = Mode::Sell {
                sale_id: sale_id.to_string(),
            };
        }

        info!(sale_id = %sale_id, "Sell session started");
        self.transport.publish(TOPIC_MODE, "sell".to_string()).await
    }

    /// Stops any active session.
    ///
    /// Idempotent: publishes "off" even when already Idle so scanner
    /// displays can re-sync their state.
    pub async fn stop(&self) -> ScanResult<()> {
        {
            let mut current = self.mode.lock().await;
            *current = Mode::Idle;
        }

        info!("Session stopped");
        self.transport.publish(TOPIC_MODE, "off".to_string()).await
    }

    /// Auto-stops a store session whose line quota was just met.
    ///
    /// Checks the mode and clears it under one lock acquisition, so two
    /// racing quota completions publish a single "off". Returns whether
    /// this call performed the stop.
    pub async fn complete_store(&self, line_id: &str) -> ScanResult<bool> {
        let stopped = {
            let mut current = self.mode.lock().await;
            match &*current {
                Mode::Store { line_id: active, .. } if active == line_id => {
                    *current = Mode::Idle;
                    true
                }
                _ => false,
            }
        };

        if stopped {
            info!(line_id = %line_id, "Store session auto-stopped (quota met)");
            self.transport.publish(TOPIC_MODE, "off".to_string()).await?;
        }

        Ok(stopped)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::InMemoryTransport;
    use chrono::Utc;
    use stocktag_core::{PurchaseOrderLine, Sale};
    use stocktag_db::MemoryStore;

    async fn fixture() -> (Arc<MemoryStore>, Arc<InMemoryTransport>, SessionController) {
        let store = Arc::new(MemoryStore::new());
        let transport = InMemoryTransport::shared();
        let controller = SessionController::new(store.clone(), transport.clone());

        store
            .insert_po_line(PurchaseOrderLine {
                id: "pol-1".to_string(),
                po_id: "po-1".to_string(),
                product_id: "p1".to_string(),
                sku: "TEE-BLK-M".to_string(),
                name: "Black Tee Medium".to_string(),
                quantity: 2,
                created_at: Utc::now(),
            })
            .await;

        store
            .insert_sale(Sale {
                id: "sale-1".to_string(),
                status: SaleStatus::Draft,
                total_qty: 0,
                subtotal_cents: 0,
                discount_cents: 0,
                total_cents: 0,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
            .await;

        (store, transport, controller)
    }

    #[tokio::test]
    async fn test_start_store_publishes_mode() {
        let (_store, transport, controller) = fixture().await;
        let mut modes = transport.subscribe(TOPIC_MODE).await.unwrap();

        controller.start_store("po-1", "pol-1").await.unwrap();

        assert_eq!(modes.recv().await.as_deref(), Some("store"));
        assert_eq!(
            controller.current().await,
            Mode::Store {
                po_id: "po-1".to_string(),
                line_id: "pol-1".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_start_store_rejects_unknown_line() {
        let (_store, _transport, controller) = fixture().await;

        let err = controller.start_store("po-1", "missing").await.unwrap_err();
        assert!(matches!(err, ScanError::InvalidTarget { .. }));
        assert_eq!(controller.current().await, Mode::Idle);
    }

    #[tokio::test]
    async fn test_start_store_rejects_line_from_other_order() {
        let (_store, _transport, controller) = fixture().await;

        let err = controller.start_store("po-9", "pol-1").await.unwrap_err();
        assert!(matches!(err, ScanError::InvalidTarget { .. }));
    }

    #[tokio::test]
    async fn test_start_sell_rejects_missing_sale() {
        let (_store, _transport, controller) = fixture().await;

        let err = controller.start_sell("missing").await.unwrap_err();
        assert!(matches!(err, ScanError::InvalidTarget { .. }));
    }

    #[tokio::test]
    async fn test_modes_are_exclusive() {
        let (_store, transport, controller) = fixture().await;
        let mut modes = transport.subscribe(TOPIC_MODE).await.unwrap();

        controller.start_store("po-1", "pol-1").await.unwrap();
        controller.start_sell("sale-1").await.unwrap();

        assert_eq!(modes.recv().await.as_deref(), Some("store"));
        assert_eq!(modes.recv().await.as_deref(), Some("sell"));
        assert_eq!(
            controller.current().await,
            Mode::Sell {
                sale_id: "sale-1".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let (_store, transport, controller) = fixture().await;
        let mut modes = transport.subscribe(TOPIC_MODE).await.unwrap();

        controller.stop().await.unwrap();
        controller.stop().await.unwrap();

        // "off" published both times, even from Idle
        assert_eq!(modes.recv().await.as_deref(), Some("off"));
        assert_eq!(modes.recv().await.as_deref(), Some("off"));
    }

    #[tokio::test]
    async fn test_complete_store_only_stops_matching_line() {
        let (_store, _transport, controller) = fixture().await;

        controller.start_store("po-1", "pol-1").await.unwrap();

        assert!(!controller.complete_store("pol-other").await.unwrap());
        assert_ne!(controller.current().await, Mode::Idle);

        assert!(controller.complete_store("pol-1").await.unwrap());
        assert_eq!(controller.current().await, Mode::Idle);

        // Already Idle: a second completion is a no-op
        assert!(!controller.complete_store("pol-1").await.unwrap());
    }
}
