//! # Tag Ingestion Pipeline
//!
//! Per-scan processing for raw uids arriving on the scan topics.
//!
//! ## Store-Mode Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Store Scan Flow                                   │
//! │                                                                         │
//! │  raw uid ──► mode check ──► validate ──► resolve PO line               │
//! │                 │                             │                         │
//! │              not Store?                       ▼                         │
//! │              DROP (no result)        INSERT tag (uid is PK)            │
//! │                                              │                         │
//! │                              unique violation = duplicate, no probe    │
//! │                                              │                         │
//! │                                              ▼                         │
//! │                                    ledger event StorePO:<id>           │
//! │                                              │                         │
//! │                                              ▼                         │
//! │                            fresh COUNT(*) vs line quantity             │
//! │                            quota met → auto-stop, finished: true       │
//! │                                              │                         │
//! │                                              ▼                         │
//! │                            publish result on rfid/store/result        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Sell-Mode Flow
//! Lookup with product → eligibility checks (exists, assigned, not sold)
//! → find-or-bump the sale line (unit price frozen at first scan) → mark
//! the tag sold → ledger event → full totals recompute → publish result
//! on `rfid/sell/result`.
//!
//! Exactly one result is published per scan processed in an active
//! session; scans arriving while Idle (or on the wrong topic for the
//! active mode) are dropped without a result.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace};
use uuid::Uuid;

use stocktag_core::{totals, validation, SaleLine, Tag, TagEvent, TagStatus};
use stocktag_db::ScanStore;

use crate::error::{ScanError, ScanResult};
use crate::session::{Mode, SessionController};
use crate::transport::{publish_json, Transport, TOPIC_SELL_RESULT, TOPIC_STORE_RESULT};

// =============================================================================
// Result Payload
// =============================================================================

/// The JSON payload published on a result topic after each processed scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanOutcome {
    pub success: bool,

    /// Operator-facing rejection reason. Absent on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// The scanned uid, echoed back (as received, pre-validation).
    pub uid: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub po_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sale_id: Option<String>,

    /// Store mode only: true when this scan met the line quota and
    /// auto-stopped the session.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished: Option<bool>,
}

impl ScanOutcome {
    fn success(uid: &str) -> Self {
        ScanOutcome {
            success: true,
            reason: None,
            uid: uid.to_string(),
            po_id: None,
            line_id: None,
            sale_id: None,
            finished: None,
        }
    }

    fn failure(uid: &str, reason: &str) -> Self {
        ScanOutcome {
            success: false,
            reason: Some(reason.to_string()),
            uid: uid.to_string(),
            po_id: None,
            line_id: None,
            sale_id: None,
            finished: None,
        }
    }
}

// =============================================================================
// Pipeline
// =============================================================================

/// Processes raw scans for the active session and publishes results.
pub struct TagPipeline {
    session: Arc<SessionController>,
    store: Arc<dyn ScanStore>,
    transport: Arc<dyn Transport>,
}

impl TagPipeline {
    /// Creates a pipeline over the given session, storage, and transport.
    pub fn new(
        session: Arc<SessionController>,
        store: Arc<dyn ScanStore>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        TagPipeline {
            session,
            store,
            transport,
        }
    }

    /// Handles one raw uid from the store scan topic.
    ///
    /// Drops the scan silently unless a store session is active; otherwise
    /// publishes exactly one result on `rfid/store/result`.
    pub async fn handle_store_scan(&self, raw_uid: &str) -> ScanResult<()> {
        let (po_id, line_id) = match self.session.current().await {
            Mode::Store { po_id, line_id } => (po_id, line_id),
            other => {
                trace!(uid = %raw_uid, mode = other.as_wire(), "Dropping store scan");
                return Ok(());
            }
        };

        let outcome = match self.register_tag(raw_uid, &po_id, &line_id).await {
            Ok(finished) => {
                let mut outcome = ScanOutcome::success(raw_uid);
                outcome.po_id = Some(po_id.clone());
                outcome.line_id = Some(line_id.clone());
                outcome.finished = Some(finished);
                outcome
            }
            Err(e) => {
                if e.is_rejection() {
                    debug!(uid = %raw_uid, reason = e.reason(), "Store scan rejected");
                } else {
                    error!(uid = %raw_uid, error = %e, "Store scan failed");
                }
                let mut outcome = ScanOutcome::failure(raw_uid, e.reason());
                outcome.po_id = Some(po_id.clone());
                outcome.line_id = Some(line_id.clone());
                outcome
            }
        };

        publish_json(self.transport.as_ref(), TOPIC_STORE_RESULT, &outcome).await
    }

    /// Handles one raw uid from the sell scan topic.
    ///
    /// Drops the scan silently unless a sell session is active; otherwise
    /// publishes exactly one result on `rfid/sell/result`.
    pub async fn handle_sell_scan(&self, raw_uid: &str) -> ScanResult<()> {
        let sale_id = match self.session.current().await {
            Mode::Sell { sale_id } => sale_id,
            other => {
                trace!(uid = %raw_uid, mode = other.as_wire(), "Dropping sell scan");
                return Ok(());
            }
        };

        let outcome = match self.sell_tag(raw_uid, &sale_id).await {
            Ok(()) => {
                let mut outcome = ScanOutcome::success(raw_uid);
                outcome.sale_id = Some(sale_id.clone());
                outcome
            }
            Err(e) => {
                if e.is_rejection() {
                    debug!(uid = %raw_uid, reason = e.reason(), "Sell scan rejected");
                } else {
                    error!(uid = %raw_uid, error = %e, "Sell scan failed");
                }
                let mut outcome = ScanOutcome::failure(raw_uid, e.reason());
                outcome.sale_id = Some(sale_id.clone());
                outcome
            }
        };

        publish_json(self.transport.as_ref(), TOPIC_SELL_RESULT, &outcome).await
    }

    /// Registers a new tag against the session's purchase-order line.
    ///
    /// Returns whether this scan met the line's quota.
    async fn register_tag(&self, raw_uid: &str, po_id: &str, line_id: &str) -> ScanResult<bool> {
        let uid = validation::validate_uid(raw_uid)?;

        let line =
            self.store
                .find_po_line(line_id)
                .await?
                .ok_or_else(|| ScanError::TargetMissing {
                    entity: "PurchaseOrderLine",
                    id: line_id.to_string(),
                })?;

        let now = Utc::now();
        let tag = Tag {
            uid: uid.clone(),
            product_id: Some(line.product_id.clone()),
            po_line_id: Some(line_id.to_string()),
            sale_line_id: None,
            status: TagStatus::InStock,
            last_seen_at: Some(now),
            created_at: now,
        };

        // The uid primary key IS the duplicate check; no lookup first, so
        // two readers scanning the same tag cannot both get through.
        self.store.create_tag(&tag).await.map_err(|e| {
            if e.is_unique_violation() {
                ScanError::DuplicateUid { uid: uid.clone() }
            } else {
                ScanError::Db(e)
            }
        })?;

        self.store
            .append_event(&TagEvent {
                id: Uuid::new_v4().to_string(),
                tag_uid: uid.clone(),
                action: TagEvent::store_action(po_id),
                recorded_at: now,
            })
            .await?;

        // Always a fresh count, so concurrent scans converge on the quota
        let scanned = self.store.count_tags_for_line(line_id).await?;
        let finished = scanned >= line.quantity;

        if finished {
            self.session.complete_store(line_id).await?;
        }

        debug!(uid = %uid, line_id = %line_id, scanned, quota = line.quantity, "Tag registered");
        Ok(finished)
    }

    /// Sells one tag onto the session's draft sale.
    async fn sell_tag(&self, raw_uid: &str, sale_id: &str) -> ScanResult<()> {
        let uid = validation::validate_uid(raw_uid)?;

        let (tag, product) = self
            .store
            .find_tag_with_product(&uid)
            .await?
            .ok_or_else(|| ScanError::TagNotFound { uid: uid.clone() })?;

        let product = product.ok_or_else(|| ScanError::TagUnassigned { uid: uid.clone() })?;

        if !tag.is_sellable() {
            return Err(ScanError::AlreadySold { uid: uid.clone() });
        }

        let sale =
            self.store
                .find_sale(sale_id)
                .await?
                .ok_or_else(|| ScanError::TargetMissing {
                    entity: "Sale",
                    id: sale_id.to_string(),
                })?;

        let now = Utc::now();

        // Find-or-bump the aggregated line for this product. The unit
        // price is frozen at first scan; later scans multiply against it
        // even if the catalog price changes mid-sale.
        let line_id = match self.store.find_sale_line(sale_id, &product.id).await? {
            Some(line) => {
                let quantity = line.quantity + 1;
                let line_total = totals::line_total(line.unit_price_cents, quantity);
                self.store
                    .update_sale_line(&line.id, quantity, line_total)
                    .await?;
                line.id
            }
            None => {
                let line = SaleLine {
                    id: Uuid::new_v4().to_string(),
                    sale_id: sale_id.to_string(),
                    product_id: product.id.clone(),
                    quantity: 1,
                    unit_price_cents: product.sell_price_cents,
                    line_total_cents: product.sell_price_cents,
                    created_at: now,
                };
                self.store.create_sale_line(&line).await?;
                line.id
            }
        };

        self.store.mark_tag_sold(&uid, &line_id, now).await?;

        self.store
            .append_event(&TagEvent {
                id: Uuid::new_v4().to_string(),
                tag_uid: uid.clone(),
                action: TagEvent::sell_action(sale_id),
                recorded_at: now,
            })
            .await?;

        // Full recompute from the current line set, never an increment
        let lines = self.store.sale_lines(sale_id).await?;
        let computed = totals::recompute(&lines, sale.discount_cents);
        self.store.update_sale_totals(sale_id, &computed).await?;

        debug!(uid = %uid, sale_id = %sale_id, total_cents = computed.total_cents, "Tag sold");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
