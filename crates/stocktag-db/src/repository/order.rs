//! # Purchase-Order Repository
//!
//! Database operations for purchase orders and their lines. Order CRUD
//! proper lives in an external management surface; this repository covers
//! what session start, the store branch, and progress views need.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use stocktag_core::validation::validate_quantity;
use stocktag_core::{LineProgress, PurchaseOrder, PurchaseOrderLine};

/// Repository for purchase-order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Inserts a purchase-order header.
    pub async fn insert_order(&self, order: &PurchaseOrder) -> DbResult<()> {
        debug!(id = %order.id, status = %order.status, "Inserting purchase order");

        sqlx::query(
            r#"
            INSERT INTO purchase_orders (id, status, created_at)
            VALUES (?1, ?2, ?3)
            "#,
        )
        .bind(&order.id)
        .bind(&order.status)
        .bind(order.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Inserts a purchase-order line.
    pub async fn insert_line(&self, line: &PurchaseOrderLine) -> DbResult<()> {
        validate_quantity(line.quantity).map_err(|e| DbError::Domain(e.into()))?;

        debug!(id = %line.id, po_id = %line.po_id, quantity = line.quantity, "Inserting PO line");

        sqlx::query(
            r#"
            INSERT INTO purchase_order_lines (id, po_id, product_id, sku, name, quantity, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&line.id)
        .bind(&line.po_id)
        .bind(&line.product_id)
        .bind(&line.sku)
        .bind(&line.name)
        .bind(line.quantity)
        .bind(line.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a purchase-order line by ID.
    pub async fn find_line(&self, line_id: &str) -> DbResult<Option<PurchaseOrderLine>> {
        let line = sqlx::query_as::<_, PurchaseOrderLine>(
            r#"
            SELECT id, po_id, product_id, sku, name, quantity, created_at
            FROM purchase_order_lines
            WHERE id = ?1
            "#,
        )
        .bind(line_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(line)
    }

    /// Lines of one order with their fresh scanned counts.
    ///
    /// Backs the receiving progress view: each line shows
    /// `scanned / quantity` so operators can pick the next scan target.
    pub async fn lines_for_order(&self, po_id: &str) -> DbResult<Vec<LineProgress>> {
        let lines = sqlx::query_as::<_, PurchaseOrderLine>(
            r#"
            SELECT id, po_id, product_id, sku, name, quantity, created_at
            FROM purchase_order_lines
            WHERE po_id = ?1
            ORDER BY created_at, id
            "#,
        )
        .bind(po_id)
        .fetch_all(&self.pool)
        .await?;

        let mut progress = Vec::with_capacity(lines.len());
        for line in lines {
            let scanned: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM tags WHERE po_line_id = ?1")
                    .bind(&line.id)
                    .fetch_one(&self.pool)
                    .await?;
            progress.push(LineProgress { line, scanned });
        }

        Ok(progress)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;
    use stocktag_core::{Product, Tag, TagStatus};

    async fn seeded_db() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let now = Utc::now();

        db.products()
            .insert(&Product {
                id: "p1".to_string(),
                sku: "SHIRT-1".to_string(),
                name: "Shirt".to_string(),
                sell_price_cents: 5000,
                stock: 0,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();

        db.orders()
            .insert_order(&PurchaseOrder {
                id: "po1".to_string(),
                status: "received".to_string(),
                created_at: now,
            })
            .await
            .unwrap();

        db.orders()
            .insert_line(&PurchaseOrderLine {
                id: "l1".to_string(),
                po_id: "po1".to_string(),
                product_id: "p1".to_string(),
                sku: "SHIRT-1".to_string(),
                name: "Shirt".to_string(),
                quantity: 2,
                created_at: now,
            })
            .await
            .unwrap();

        db
    }

    #[tokio::test]
    async fn test_find_line() {
        let db = seeded_db().await;

        let line = db.orders().find_line("l1").await.unwrap().unwrap();
        assert_eq!(line.po_id, "po1");
        assert_eq!(line.quantity, 2);

        assert!(db.orders().find_line("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_lines_for_order_counts_scans() {
        let db = seeded_db().await;

        db.tags()
            .insert(&Tag {
                uid: "04A2".to_string(),
                product_id: Some("p1".to_string()),
                po_line_id: Some("l1".to_string()),
                sale_line_id: None,
                status: TagStatus::InStock,
                last_seen_at: None,
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        let progress = db.orders().lines_for_order("po1").await.unwrap();
        assert_eq!(progress.len(), 1);
        assert_eq!(progress[0].scanned, 1);
        assert!(!progress[0].is_complete());
    }

    #[tokio::test]
    async fn test_insert_line_rejects_zero_quantity() {
        let db = seeded_db().await;

        let err = db
            .orders()
            .insert_line(&PurchaseOrderLine {
                id: "l2".to_string(),
                po_id: "po1".to_string(),
                product_id: "p1".to_string(),
                sku: "SHIRT-1".to_string(),
                name: "Shirt".to_string(),
                quantity: 0,
                created_at: Utc::now(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Domain(_)));
    }
}
