//! # In-Memory Scan Store
//!
//! A [`ScanStore`] backed by hash maps, for pipeline tests and demos.
//! Enforces the same uniqueness rules as the SQLite store (tag UIDs, one
//! sale line per product) so pipeline behavior is identical against both.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::error::{DbError, DbResult};
use crate::store::ScanStore;
use stocktag_core::{
    Product, PurchaseOrderLine, Sale, SaleLine, SaleStatus, SaleTotals, Tag, TagEvent,
};

#[derive(Debug, Default)]
struct Inner {
    products: HashMap<String, Product>,
    po_lines: HashMap<String, PurchaseOrderLine>,
    tags: HashMap<String, Tag>,
    sales: HashMap<String, Sale>,
    sale_lines: HashMap<String, SaleLine>,
    events: Vec<TagEvent>,
}

/// In-memory implementation of [`ScanStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Seeds a product.
    pub async fn insert_product(&self, product: Product) {
        let mut inner = self.inner.lock().await;
        inner.products.insert(product.id.clone(), product);
    }

    /// Seeds a purchase-order line.
    pub async fn insert_po_line(&self, line: PurchaseOrderLine) {
        let mut inner = self.inner.lock().await;
        inner.po_lines.insert(line.id.clone(), line);
    }

    /// Seeds a draft sale.
    pub async fn insert_sale(&self, sale: Sale) {
        let mut inner = self.inner.lock().await;
        inner.sales.insert(sale.id.clone(), sale);
    }

    /// Snapshot of a stored tag, for assertions.
    pub async fn tag(&self, uid: &str) -> Option<Tag> {
        self.inner.lock().await.tags.get(uid).cloned()
    }

    /// Snapshot of a stored sale, for assertions.
    pub async fn sale(&self, sale_id: &str) -> Option<Sale> {
        self.inner.lock().await.sales.get(sale_id).cloned()
    }

    /// All recorded ledger events, in append order.
    pub async fn events(&self) -> Vec<TagEvent> {
        self.inner.lock().await.events.clone()
    }
}

#[async_trait]
impl ScanStore for MemoryStore {
    async fn find_tag(&self, uid: &str) -> DbResult<Option<Tag>> {
        Ok(self.inner.lock().await.tags.get(uid).cloned())
    }

    async fn find_tag_with_product(&self, uid: &str) -> DbResult<Option<(Tag, Option<Product>)>> {
        let inner = self.inner.lock().await;
        let Some(tag) = inner.tags.get(uid).cloned() else {
            return Ok(None);
        };
        let product = tag
            .product_id
            .as_deref()
            .and_then(|id| inner.products.get(id).cloned());
        Ok(Some((tag, product)))
    }

    async fn create_tag(&self, tag: &Tag) -> DbResult<()> {
        let mut inner = self.inner.lock().await;
        if inner.tags.contains_key(&tag.uid) {
            return Err(DbError::duplicate("tags.uid", &tag.uid));
        }
        inner.tags.insert(tag.uid.clone(), tag.clone());
        Ok(())
    }

    async fn mark_tag_sold(
        &self,
        uid: &str,
        sale_line_id: &str,
        seen_at: DateTime<Utc>,
    ) -> DbResult<()> {
        let mut inner = self.inner.lock().await;
        let tag = inner
            .tags
            .get_mut(uid)
            .ok_or_else(|| DbError::not_found("Tag", uid))?;
        tag.sale_line_id = Some(sale_line_id.to_string());
        tag.status = stocktag_core::TagStatus::Sold;
        tag.last_seen_at = Some(seen_at);
        Ok(())
    }

    async fn count_tags_for_line(&self, line_id: &str) -> DbResult<i64> {
        let inner = self.inner.lock().await;
        let count = inner
            .tags
            .values()
            .filter(|t| t.po_line_id.as_deref() == Some(line_id))
            .count();
        Ok(count as i64)
    }

    async fn find_po_line(&self, line_id: &str) -> DbResult<Option<PurchaseOrderLine>> {
        Ok(self.inner.lock().await.po_lines.get(line_id).cloned())
    }

    async fn find_product(&self, product_id: &str) -> DbResult<Option<Product>> {
        Ok(self.inner.lock().await.products.get(product_id).cloned())
    }

    async fn find_sale(&self, sale_id: &str) -> DbResult<Option<Sale>> {
        Ok(self.inner.lock().await.sales.get(sale_id).cloned())
    }

    async fn sale_lines(&self, sale_id: &str) -> DbResult<Vec<SaleLine>> {
        let inner = self.inner.lock().await;
        let mut lines: Vec<SaleLine> = inner
            .sale_lines
            .values()
            .filter(|l| l.sale_id == sale_id)
            .cloned()
            .collect();
        lines.sort_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id)));
        Ok(lines)
    }

    async fn find_sale_line(
        &self,
        sale_id: &str,
        product_id: &str,
    ) -> DbResult<Option<SaleLine>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .sale_lines
            .values()
            .find(|l| l.sale_id == sale_id && l.product_id == product_id)
            .cloned())
    }

    async fn create_sale_line(&self, line: &SaleLine) -> DbResult<()> {
        let mut inner = self.inner.lock().await;
        let exists = inner
            .sale_lines
            .values()
            .any(|l| l.sale_id == line.sale_id && l.product_id == line.product_id);
        if exists {
            return Err(DbError::duplicate("sale_lines", &line.product_id));
        }
        inner.sale_lines.insert(line.id.clone(), line.clone());
        Ok(())
    }

    async fn update_sale_line(
        &self,
        line_id: &str,
        quantity: i64,
        line_total_cents: i64,
    ) -> DbResult<()> {
        let mut inner = self.inner.lock().await;
        let line = inner
            .sale_lines
            .get_mut(line_id)
            .ok_or_else(|| DbError::not_found("SaleLine", line_id))?;
        line.quantity = quantity;
        line.line_total_cents = line_total_cents;
        Ok(())
    }

    async fn update_sale_totals(&self, sale_id: &str, totals: &SaleTotals) -> DbResult<()> {
        let mut inner = self.inner.lock().await;
        let sale = inner.sales.get_mut(sale_id).ok_or(DbError::SaleNotDraft {
            sale_id: sale_id.to_string(),
        })?;
        if sale.status != SaleStatus::Draft {
            return Err(DbError::SaleNotDraft {
                sale_id: sale_id.to_string(),
            });
        }
        sale.total_qty = totals.total_qty;
        sale.subtotal_cents = totals.subtotal_cents;
        sale.discount_cents = totals.discount_cents;
        sale.total_cents = totals.total_cents;
        sale.updated_at = Utc::now();
        Ok(())
    }

    async fn append_event(&self, event: &TagEvent) -> DbResult<()> {
        self.inner.lock().await.events.push(event.clone());
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(uid: &str, line_id: &str) -> Tag {
        Tag {
            uid: uid.to_string(),
            product_id: Some("p1".to_string()),
            po_line_id: Some(line_id.to_string()),
            sale_line_id: None,
            status: stocktag_core::TagStatus::InStock,
            last_seen_at: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_tag_enforces_uid_uniqueness() {
        let store = MemoryStore::new();
        store.create_tag(&tag("E200-1", "pol-1")).await.unwrap();

        let err = store.create_tag(&tag("E200-1", "pol-2")).await.unwrap_err();
        assert!(err.is_unique_violation());

        // First registration survived untouched
        let stored = store.tag("E200-1").await.unwrap();
        assert_eq!(stored.po_line_id.as_deref(), Some("pol-1"));
    }

    #[tokio::test]
    async fn test_count_tags_for_line() {
        let store = MemoryStore::new();
        store.create_tag(&tag("E200-1", "pol-1")).await.unwrap();
        store.create_tag(&tag("E200-2", "pol-1")).await.unwrap();
        store.create_tag(&tag("E200-3", "pol-2")).await.unwrap();

        assert_eq!(store.count_tags_for_line("pol-1").await.unwrap(), 2);
        assert_eq!(store.count_tags_for_line("pol-2").await.unwrap(), 1);
    }
}
