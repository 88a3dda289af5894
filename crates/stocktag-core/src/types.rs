//! # Domain Types
//!
//! Core domain types used throughout StockTag.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Tag        │   │      Sale       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  uid (RFID)     │   │  id (UUID)      │       │
//! │  │  sku (business) │   │  status         │   │  status         │       │
//! │  │  name           │   │  product_id?    │   │  subtotal_cents │       │
//! │  │  sell_price     │   │  po_line_id?    │   │  discount_cents │       │
//! │  └─────────────────┘   │  sale_line_id?  │   │  total_cents    │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │PurchaseOrderLine│   │    SaleLine     │   │    TagEvent     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  quantity=quota │   │  qty, unit price│   │  append-only    │       │
//! │  │  scan target of │   │  line_total     │   │  audit ledger   │       │
//! │  │  a store session│   │  one per product│   │  per tag action │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Entities carry UUID v4 string ids, except `Tag` whose natural key is the
//! physical RFID uid itself - globally unique and immutable once assigned.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A product that tags can be attached to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Stock Keeping Unit - business identifier, unique.
    pub sku: String,

    /// Display name shown to operators and on receipts.
    pub name: String,

    /// Selling price in cents (smallest currency unit).
    pub sell_price_cents: i64,

    /// Untagged stock count (tagged stock is derived from tags).
    pub stock: i64,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the sell price as a Money type.
    #[inline]
    pub fn sell_price(&self) -> Money {
        Money::from_cents(self.sell_price_cents)
    }
}

// =============================================================================
// Tag
// =============================================================================

/// Lifecycle status of an RFID tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum TagStatus {
    /// Tag was registered against a purchase-order line and sits in stock.
    InStock,
    /// Tag is bound to exactly one sale line and left the store.
    Sold,
}

impl Default for TagStatus {
    fn default() -> Self {
        TagStatus::InStock
    }
}

/// A physical RFID tag attached to one inventory unit.
///
/// ## Invariant
/// At most one of `po_line_id` / `sale_line_id` drives the current status:
/// `InStock` is owned by the purchase-order line that registered the tag,
/// `Sold` by the sale line it was scanned onto. Once `Sold`, the tag must
/// not be reassigned (no status reset exists in the current scope).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    /// The RFID uid - globally unique, immutable once assigned.
    pub uid: String,

    /// Product this tag is attached to.
    pub product_id: Option<String>,

    /// Purchase-order line that registered this tag.
    pub po_line_id: Option<String>,

    /// Sale line this tag was sold on (set together with status Sold).
    pub sale_line_id: Option<String>,

    /// Lifecycle status.
    pub status: TagStatus,

    /// Last time a scanner observed this tag.
    pub last_seen_at: Option<DateTime<Utc>>,

    /// When the tag was first registered.
    pub created_at: DateTime<Utc>,
}

impl Tag {
    /// Whether a sell-mode scan may still consume this tag.
    ///
    /// A tag is sellable until it is marked Sold or bound to a sale line,
    /// whichever is observed first.
    pub fn is_sellable(&self) -> bool {
        self.status != TagStatus::Sold && self.sale_line_id.is_none()
    }
}

// =============================================================================
// Purchase Orders
// =============================================================================

/// A purchase order header.
///
/// CRUD for orders lives outside this system; the scan pipeline only needs
/// the header for the line → order ownership check on session start.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrder {
    pub id: String,
    /// Free-form status ("received" orders are eligible scan targets).
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// One line of a purchase order - the scan target of a store session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrderLine {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Owning purchase order.
    pub po_id: String,

    /// Product received on this line.
    pub product_id: String,

    /// SKU at order time (frozen).
    pub sku: String,

    /// Product name at order time (frozen).
    pub name: String,

    /// Target quantity - the quota a store session scans towards.
    pub quantity: i64,

    pub created_at: DateTime<Utc>,
}

/// Read model for purchase-order progress views: one line plus how many
/// tags have been scanned against it so far.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineProgress {
    pub line: PurchaseOrderLine,
    /// Fresh count of tags referencing this line.
    pub scanned: i64,
}

impl LineProgress {
    /// Whether the line's quota has been met.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.scanned >= self.line.quantity
    }
}

// =============================================================================
// Sale
// =============================================================================

/// The status of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    /// Sale is in progress (sell-mode scans add to it).
    Draft,
    /// Sale has been paid and finalized; lines are frozen.
    Paid,
}

impl Default for SaleStatus {
    fn default() -> Self {
        SaleStatus::Draft
    }
}

/// A draft or finalized sale.
///
/// ## Invariants
/// - `total_cents = subtotal_cents - discount_cents`
/// - `subtotal_cents = Σ line.line_total_cents`
/// - `total_qty = Σ line.quantity`
///
/// These are recomputed from the full set of lines after every line
/// mutation (see `stocktag_core::totals`), never updated incrementally.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: String,
    pub status: SaleStatus,
    pub total_qty: i64,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A line item in a sale, aggregating one product's quantity and amount.
///
/// ## Price Freezing
/// `unit_price_cents` is captured from the product on the first scan and
/// never re-read, so pricing stays stable within one sale even if the
/// product's price changes mid-session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct SaleLine {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    /// Units of this product in the sale.
    pub quantity: i64,
    /// Unit price in cents at first scan (frozen).
    pub unit_price_cents: i64,
    /// quantity × unit_price_cents.
    pub line_total_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl SaleLine {
    /// Returns the frozen unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

// =============================================================================
// Event Ledger
// =============================================================================

/// An append-only audit record of one tag lifecycle action.
///
/// Entries are never mutated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct TagEvent {
    pub id: String,
    /// The tag this action concerns.
    pub tag_uid: String,
    /// Action code, e.g. `StorePO:<poId>` or `SellReceipt:<saleId>`.
    pub action: String,
    pub recorded_at: DateTime<Utc>,
}

impl TagEvent {
    /// Action code for a store-mode registration against a purchase order.
    pub fn store_action(po_id: &str) -> String {
        format!("StorePO:{po_id}")
    }

    /// Action code for a sell-mode scan onto a sale.
    pub fn sell_action(sale_id: &str) -> String {
        format!("SellReceipt:{sale_id}")
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_sellable() {
        let mut tag = Tag {
            uid: "AA11".to_string(),
            product_id: Some("p1".to_string()),
            po_line_id: Some("l1".to_string()),
            sale_line_id: None,
            status: TagStatus::InStock,
            last_seen_at: None,
            created_at: Utc::now(),
        };
        assert!(tag.is_sellable());

        tag.status = TagStatus::Sold;
        assert!(!tag.is_sellable());

        tag.status = TagStatus::InStock;
        tag.sale_line_id = Some("sl1".to_string());
        assert!(!tag.is_sellable());
    }

    #[test]
    fn test_event_action_codes() {
        assert_eq!(TagEvent::store_action("po-7"), "StorePO:po-7");
        assert_eq!(TagEvent::sell_action("sale-9"), "SellReceipt:sale-9");
    }

    #[test]
    fn test_line_progress_complete() {
        let progress = LineProgress {
            line: PurchaseOrderLine {
                id: "l1".to_string(),
                po_id: "po1".to_string(),
                product_id: "p1".to_string(),
                sku: "SKU-1".to_string(),
                name: "Widget".to_string(),
                quantity: 2,
                created_at: Utc::now(),
            },
            scanned: 2,
        };
        assert!(progress.is_complete());
    }
}
