//! # Sale Repository
//!
//! Database operations for sales and sale lines.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. CREATE DRAFT                                                       │
//! │     └── create_sale() → Sale { status: Draft, totals: 0 }              │
//! │                                                                         │
//! │  2. SELL-MODE SCANS (via the ingestion pipeline)                       │
//! │     └── insert_line() / update_line() per scanned product              │
//! │     └── update_totals() → full recompute from the current lines        │
//! │                                                                         │
//! │  3. DISCOUNT (optional)                                                │
//! │     └── set_discount() → re-derives subtotal and total                 │
//! │                                                                         │
//! │  4. CHECKOUT                                                           │
//! │     └── checkout() → Sale { status: Paid }                             │
//! │         (guarded by WHERE status = 'draft'; a Paid sale's totals       │
//! │          can never be rewritten by a late recompute)                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use stocktag_core::totals::{self, SaleTotals};
use stocktag_core::{Sale, SaleLine, SaleStatus};

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Creates a new empty draft sale.
    pub async fn create_sale(&self) -> DbResult<Sale> {
        let now = Utc::now();
        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            status: SaleStatus::Draft,
            total_qty: 0,
            subtotal_cents: 0,
            discount_cents: 0,
            total_cents: 0,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %sale.id, "Creating draft sale");

        sqlx::query(
            r#"
            INSERT INTO sales (id, status, total_qty, subtotal_cents, discount_cents, total_cents, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&sale.id)
        .bind(sale.status)
        .bind(sale.total_qty)
        .bind(sale.subtotal_cents)
        .bind(sale.discount_cents)
        .bind(sale.total_cents)
        .bind(sale.created_at)
        .bind(sale.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, status, total_qty, subtotal_cents, discount_cents, total_cents,
                   created_at, updated_at
            FROM sales
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Gets all lines for a sale, in insertion order.
    pub async fn get_lines(&self, sale_id: &str) -> DbResult<Vec<SaleLine>> {
        let lines = sqlx::query_as::<_, SaleLine>(
            r#"
            SELECT id, sale_id, product_id, quantity, unit_price_cents, line_total_cents, created_at
            FROM sale_lines
            WHERE sale_id = ?1
            ORDER BY created_at, id
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Finds the aggregated line for (sale, product), if any.
    pub async fn find_line(&self, sale_id: &str, product_id: &str) -> DbResult<Option<SaleLine>> {
        let line = sqlx::query_as::<_, SaleLine>(
            r#"
            SELECT id, sale_id, product_id, quantity, unit_price_cents, line_total_cents, created_at
            FROM sale_lines
            WHERE sale_id = ?1 AND product_id = ?2
            "#,
        )
        .bind(sale_id)
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(line)
    }

    /// Inserts a sale line.
    ///
    /// ## Price Freezing
    /// `unit_price_cents` is the product's price at first scan; later
    /// quantity bumps keep multiplying against this frozen value.
    pub async fn insert_line(&self, line: &SaleLine) -> DbResult<()> {
        debug!(sale_id = %line.sale_id, product_id = %line.product_id, "Adding sale line");

        sqlx::query(
            r#"
            INSERT INTO sale_lines (id, sale_id, product_id, quantity, unit_price_cents, line_total_cents, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&line.id)
        .bind(&line.sale_id)
        .bind(&line.product_id)
        .bind(line.quantity)
        .bind(line.unit_price_cents)
        .bind(line.line_total_cents)
        .bind(line.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates a sale line's quantity and line total.
    pub async fn update_line(
        &self,
        line_id: &str,
        quantity: i64,
        line_total_cents: i64,
    ) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE sale_lines SET quantity = ?2, line_total_cents = ?3
            WHERE id = ?1
            "#,
        )
        .bind(line_id)
        .bind(quantity)
        .bind(line_total_cents)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("SaleLine", line_id));
        }

        Ok(())
    }

    /// Writes recomputed totals onto a draft sale.
    ///
    /// ## Draft Guard
    /// The `status = 'draft'` predicate keeps a late recompute (a scan
    /// that raced checkout) from rewriting a Paid sale's totals.
    pub async fn update_totals(&self, sale_id: &str, totals: &SaleTotals) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE sales SET
                total_qty = ?2,
                subtotal_cents = ?3,
                discount_cents = ?4,
                total_cents = ?5,
                updated_at = ?6
            WHERE id = ?1 AND status = 'draft'
            "#,
        )
        .bind(sale_id)
        .bind(totals.total_qty)
        .bind(totals.subtotal_cents)
        .bind(totals.discount_cents)
        .bind(totals.total_cents)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::SaleNotDraft {
                sale_id: sale_id.to_string(),
            });
        }

        Ok(())
    }

    /// Sets the discount on a draft sale and re-derives its totals from
    /// the full current line set.
    ///
    /// Negative discounts are rejected before any write.
    pub async fn set_discount(&self, sale_id: &str, discount_cents: i64) -> DbResult<Sale> {
        totals::validate_discount(discount_cents)?;

        let lines = self.get_lines(sale_id).await?;
        let totals = totals::recompute(&lines, discount_cents);

        self.update_totals(sale_id, &totals).await?;

        self.get_by_id(sale_id)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", sale_id))
    }

    /// Finalizes a sale (Draft → Paid).
    ///
    /// Stopping any sell session that still targets this sale is the
    /// caller's responsibility.
    pub async fn checkout(&self, sale_id: &str) -> DbResult<()> {
        let now = Utc::now();

        debug!(sale_id = %sale_id, "Checkout");

        let result = sqlx::query(
            r#"
            UPDATE sales SET status = 'paid', updated_at = ?2
            WHERE id = ?1 AND status = 'draft'
            "#,
        )
        .bind(sale_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::SaleNotDraft {
                sale_id: sale_id.to_string(),
            });
        }

        Ok(())
    }

    /// Recent sales, newest first. Backs the sales history view.
    pub async fn history(&self, limit: i64) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, status, total_qty, subtotal_cents, discount_cents, total_cents,
                   created_at, updated_at
            FROM sales
            ORDER BY created_at DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// One sale with its full line set. Backs the sale detail view.
    pub async fn sale_with_lines(&self, sale_id: &str) -> DbResult<Option<(Sale, Vec<SaleLine>)>> {
        let Some(sale) = self.get_by_id(sale_id).await? else {
            return Ok(None);
        };
        let lines = self.get_lines(sale_id).await?;
        Ok(Some((sale, lines)))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use stocktag_core::Product;

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

        db
    }

    fn line(id: &str, sale_id: &str, qty: i64, unit_cents: i64) -> SaleLine {
        SaleLine {
            id: id.to_string(),
            sale_id: sale_id.to_string(),
            product_id: "p1".to_string(),
            quantity: qty,
            unit_price_cents: unit_cents,
            line_total_cents: unit_cents * qty,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_sale() {
        let db = seeded_db().await;
        let repo = db.sales();

        let sale = repo.create_sale().await.unwrap();
        assert_eq!(sale.status, SaleStatus::Draft);
        assert_eq!(sale.total_cents, 0);

        let found = repo.get_by_id(&sale.id).await.unwrap().unwrap();
        assert_eq!(found.id, sale.id);
    }

    #[tokio::test]
    async fn test_lines_and_totals_roundtrip() {
        let db = seeded_db().await;
        let repo = db.sales();

        let sale = repo.create_sale().await.unwrap();
        repo.insert_line(&line("sl1", &sale.id, 2, 5000)).await.unwrap();

        let lines = repo.get_lines(&sale.id).await.unwrap();
        let computed = totals::recompute(&lines, 0);
        repo.update_totals(&sale.id, &computed).await.unwrap();

        let sale = repo.get_by_id(&sale.id).await.unwrap().unwrap();
        assert_eq!(sale.total_qty, 2);
        assert_eq!(sale.subtotal_cents, 10000);
        assert_eq!(sale.total_cents, 10000);
    }

    #[tokio::test]
    async fn test_set_discount() {
        let db = seeded_db().await;
        let repo = db.sales();

        let sale = repo.create_sale().await.unwrap();
        repo.insert_line(&line("sl1", &sale.id, 2, 5000)).await.unwrap();

        let sale = repo.set_discount(&sale.id, 1500).await.unwrap();
        assert_eq!(sale.subtotal_cents, 10000);
        assert_eq!(sale.discount_cents, 1500);
        assert_eq!(sale.total_cents, 8500);

        let err = repo.set_discount(&sale.id, -1).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(_)));
    }

    #[tokio::test]
    async fn test_checkout_guards_draft() {
        let db = seeded_db().await;
        let repo = db.sales();

        let sale = repo.create_sale().await.unwrap();
        repo.checkout(&sale.id).await.unwrap();

        let paid = repo.get_by_id(&sale.id).await.unwrap().unwrap();
        assert_eq!(paid.status, SaleStatus::Paid);

        // Second checkout fails, as does a late totals write
        assert!(matches!(
            repo.checkout(&sale.id).await.unwrap_err(),
            DbError::SaleNotDraft { .. }
        ));
        assert!(matches!(
            repo.update_totals(&sale.id, &SaleTotals::default())
                .await
                .unwrap_err(),
            DbError::SaleNotDraft { .. }
        ));
    }

    #[tokio::test]
    async fn test_one_line_per_product() {
        let db = seeded_db().await;
        let repo = db.sales();

        let sale = repo.create_sale().await.unwrap();
        repo.insert_line(&line("sl1", &sale.id, 1, 5000)).await.unwrap();

        // Second line for the same product violates UNIQUE(sale_id, product_id)
        let err = repo.insert_line(&line("sl2", &sale.id, 1, 5000)).await.unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[tokio::test]
    async fn test_history_newest_first() {
        let db = seeded_db().await;
        let repo = db.sales();

        let first = repo.create_sale().await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = repo.create_sale().await.unwrap();

        let history = repo.history(10).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].id, second.id);
        assert_eq!(history[1].id, first.id);
    }
}
