//! # Tag Repository
//!
//! Database operations for RFID tags.
//!
//! ## Uniqueness Without Probing
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                Duplicate uid under concurrent scans                     │
//! │                                                                         │
//! │  Two scanners read the same physical tag within milliseconds:         │
//! │                                                                         │
//! │   probe-then-insert (RACY)          insert-and-map (THIS REPO)         │
//! │   ────────────────────────          ──────────────────────────         │
//! │   A: SELECT → absent                A: INSERT uid ..... ok             │
//! │   B: SELECT → absent                B: INSERT uid ..... UNIQUE fail    │
//! │   A: INSERT → ok                         │                             │
//! │   B: INSERT → ☠ surprise error           ▼                             │
//! │                                     DbError::UniqueViolation           │
//! │                                     → "uid already used" result        │
//! │                                                                         │
//! │  The PRIMARY KEY on tags.uid is the only duplicate check.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use stocktag_core::{Product, Tag};

/// Repository for tag database operations.
#[derive(Debug, Clone)]
pub struct TagRepository {
    pool: SqlitePool,
}

impl TagRepository {
    /// Creates a new TagRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TagRepository { pool }
    }

    /// Gets a tag by its uid.
    pub async fn find_by_uid(&self, uid: &str) -> DbResult<Option<Tag>> {
        let tag = sqlx::query_as::<_, Tag>(
            r#"
            SELECT uid, product_id, po_line_id, sale_line_id, status, last_seen_at, created_at
            FROM tags
            WHERE uid = ?1
            "#,
        )
        .bind(uid)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tag)
    }

    /// Gets a tag together with its product, if one is attached.
    ///
    /// Used by the sell branch (price lookup) and by the manual
    /// tag-lookup surface.
    pub async fn find_with_product(&self, uid: &str) -> DbResult<Option<(Tag, Option<Product>)>> {
        let Some(tag) = self.find_by_uid(uid).await? else {
            return Ok(None);
        };

        let product = match &tag.product_id {
            Some(product_id) => {
                sqlx::query_as::<_, Product>(
                    r#"
                    SELECT id, sku, name, sell_price_cents, stock, created_at, updated_at
                    FROM products
                    WHERE id = ?1
                    "#,
                )
                .bind(product_id)
                .fetch_optional(&self.pool)
                .await?
            }
            None => None,
        };

        Ok(Some((tag, product)))
    }

    /// Inserts a new tag.
    ///
    /// ## Contract
    /// Callers must NOT probe for existence first. A duplicate uid is
    /// rejected atomically by the primary key and surfaces as
    /// [`crate::DbError::UniqueViolation`].
    pub async fn insert(&self, tag: &Tag) -> DbResult<()> {
        debug!(uid = %tag.uid, po_line = ?tag.po_line_id, "Registering tag");

        sqlx::query(
            r#"
            INSERT INTO tags (uid, product_id, po_line_id, sale_line_id, status, last_seen_at, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&tag.uid)
        .bind(&tag.product_id)
        .bind(&tag.po_line_id)
        .bind(&tag.sale_line_id)
        .bind(tag.status)
        .bind(tag.last_seen_at)
        .bind(tag.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Binds a tag to a sale line and marks it Sold.
    pub async fn mark_sold(
        &self,
        uid: &str,
        sale_line_id: &str,
        seen_at: DateTime<Utc>,
    ) -> DbResult<()> {
        debug!(uid = %uid, sale_line_id = %sale_line_id, "Marking tag sold");

        let result = sqlx::query(
            r#"
            UPDATE tags SET
                sale_line_id = ?2,
                status = 'sold',
                last_seen_at = ?3
            WHERE uid = ?1
            "#,
        )
        .bind(uid)
        .bind(sale_line_id)
        .bind(seen_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(crate::DbError::not_found("Tag", uid));
        }

        Ok(())
    }

    /// Fresh count of tags registered against a purchase-order line.
    ///
    /// Always a COUNT(*) against the table, never a cached counter, so it
    /// stays correct when scans land concurrently.
    pub async fn count_for_line(&self, line_id: &str) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM tags WHERE po_line_id = ?1")
                .bind(line_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use stocktag_core::TagStatus;

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

    fn tag(uid: &str) -> Tag {
        Tag {
            uid: uid.to_string(),
            product_id: Some("p1".to_string()),
            po_line_id: None,
            sale_line_id: None,
            status: TagStatus::InStock,
            last_seen_at: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let db = seeded_db().await;
        let repo = db.tags();

        repo.insert(&tag("04A2")).await.unwrap();

        let found = repo.find_by_uid("04A2").await.unwrap().unwrap();
        assert_eq!(found.status, TagStatus::InStock);
        assert_eq!(found.product_id.as_deref(), Some("p1"));

        assert!(repo.find_by_uid("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_uid_is_unique_violation() {
        let db = seeded_db().await;
        let repo = db.tags();

        repo.insert(&tag("04A2")).await.unwrap();
        let err = repo.insert(&tag("04A2")).await.unwrap_err();

        assert!(err.is_unique_violation());

        // The stored tag is untouched by the failed insert
        let found = repo.find_by_uid("04A2").await.unwrap().unwrap();
        assert_eq!(found.status, TagStatus::InStock);
    }

    #[tokio::test]
    async fn test_find_with_product() {
        let db = seeded_db().await;
        let repo = db.tags();

        repo.insert(&tag("04A2")).await.unwrap();

        let (tag, product) = repo.find_with_product("04A2").await.unwrap().unwrap();
        assert_eq!(tag.uid, "04A2");
        assert_eq!(product.unwrap().sell_price_cents, 5000);
    }
}
