//! # Scan Store
//!
//! The storage seam the ingestion pipeline runs against.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        ScanStore Trait                                  │
//! │                                                                         │
//! │   TagPipeline ──► Arc<dyn ScanStore> ──┬──► Database   (SQLite)        │
//! │                                        └──► MemoryStore (tests)        │
//! │                                                                         │
//! │   The trait carries exactly the operations the pipeline needs; the     │
//! │   wider repository surface (history, seeding, detail views) stays on   │
//! │   the concrete types.                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::DbResult;
use crate::pool::Database;
use stocktag_core::{
    Product, PurchaseOrderLine, Sale, SaleLine, SaleTotals, Tag, TagEvent,
};

/// Storage operations required by the tag ingestion pipeline.
#[async_trait]
pub trait ScanStore: Send + Sync {
    /// Looks up a tag by UID.
    async fn find_tag(&self, uid: &str) -> DbResult<Option<Tag>>;

    /// Looks up a tag together with its product, if assigned.
    async fn find_tag_with_product(&self, uid: &str) -> DbResult<Option<(Tag, Option<Product>)>>;

    /// Registers a new tag. Fails with a unique violation when the UID
    /// already exists; that violation IS the duplicate check.
    async fn create_tag(&self, tag: &Tag) -> DbResult<()>;

    /// Binds a tag to a sale line and marks it Sold.
    async fn mark_tag_sold(
        &self,
        uid: &str,
        sale_line_id: &str,
        seen_at: DateTime<Utc>,
    ) -> DbResult<()>;

    /// Fresh count of tags registered against a purchase-order line.
    async fn count_tags_for_line(&self, line_id: &str) -> DbResult<i64>;

    /// Looks up a purchase-order line.
    async fn find_po_line(&self, line_id: &str) -> DbResult<Option<PurchaseOrderLine>>;

    /// Looks up a product.
    async fn find_product(&self, product_id: &str) -> DbResult<Option<Product>>;

    /// Looks up a sale.
    async fn find_sale(&self, sale_id: &str) -> DbResult<Option<Sale>>;

    /// All lines for a sale.
    async fn sale_lines(&self, sale_id: &str) -> DbResult<Vec<SaleLine>>;

    /// The aggregated line for (sale, product), if any.
    async fn find_sale_line(&self, sale_id: &str, product_id: &str)
        -> DbResult<Option<SaleLine>>;

    /// Inserts a sale line.
    async fn create_sale_line(&self, line: &SaleLine) -> DbResult<()>;

    /// Updates a sale line's quantity and line total.
    async fn update_sale_line(
        &self,
        line_id: &str,
        quantity: i64,
        line_total_cents: i64,
    ) -> DbResult<()>;

    /// Writes recomputed totals onto a draft sale.
    async fn update_sale_totals(&self, sale_id: &str, totals: &SaleTotals) -> DbResult<()>;

    /// Appends one event to the movement ledger.
    async fn append_event(&self, event: &TagEvent) -> DbResult<()>;
}

#[async_trait]
impl ScanStore for Database {
    async fn find_tag(&self, uid: &str) -> DbResult<Option<Tag>> {
        self.tags().find_by_uid(uid).await
    }

    async fn find_tag_with_product(&self, uid: &str) -> DbResult<Option<(Tag, Option<Product>)>> {
        self.tags().find_with_product(uid).await
    }

    async fn create_tag(&self, tag: &Tag) -> DbResult<()> {
        self.tags().insert(tag).await
    }

    async fn mark_tag_sold(
        &self,
        uid: &str,
        sale_line_id: &str,
        seen_at: DateTime<Utc>,
    ) -> DbResult<()> {
        self.tags().mark_sold(uid, sale_line_id, seen_at).await
    }

    async fn count_tags_for_line(&self, line_id: &str) -> DbResult<i64> {
        self.tags().count_for_line(line_id).await
    }

    async fn find_po_line(&self, line_id: &str) -> DbResult<Option<PurchaseOrderLine>> {
        self.orders().find_line(line_id).await
    }

    async fn find_product(&self, product_id: &str) -> DbResult<Option<Product>> {
        self.products().get_by_id(product_id).await
    }

    async fn find_sale(&self, sale_id: &str) -> DbResult<Option<Sale>> {
        self.sales().get_by_id(sale_id).await
    }

    async fn sale_lines(&self, sale_id: &str) -> DbResult<Vec<SaleLine>> {
        self.sales().get_lines(sale_id).await
    }

    async fn find_sale_line(
        &self,
        sale_id: &str,
        product_id: &str,
    ) -> DbResult<Option<SaleLine>> {
        self.sales().find_line(sale_id, product_id).await
    }

    async fn create_sale_line(&self, line: &SaleLine) -> DbResult<()> {
        self.sales().insert_line(line).await
    }

    async fn update_sale_line(
        &self,
        line_id: &str,
        quantity: i64,
        line_total_cents: i64,
    ) -> DbResult<()> {
        self.sales().update_line(line_id, quantity, line_total_cents).await
    }

    async fn update_sale_totals(&self, sale_id: &str, totals: &SaleTotals) -> DbResult<()> {
        self.sales().update_totals(sale_id, totals).await
    }

    async fn append_event(&self, event: &TagEvent) -> DbResult<()> {
        self.ledger().append(event).await
    }
}
