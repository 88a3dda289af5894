//! # Product Repository
//!
//! Database operations for products. Product CRUD proper lives in an
//! external management surface; the pipeline and seeds only need lookup
//! and insertion.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use stocktag_core::validation::validate_sku;
use stocktag_core::Product;

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, sku, name, sell_price_cents, stock, created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Finds a product by its SKU.
    pub async fn find_by_sku(&self, sku: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, sku, name, sell_price_cents, stock, created_at, updated_at
            FROM products
            WHERE sku = ?1
            "#,
        )
        .bind(sku)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Inserts a product.
    ///
    /// A duplicate SKU surfaces as [`DbError::UniqueViolation`].
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        validate_sku(&product.sku).map_err(|e| DbError::Domain(e.into()))?;

        debug!(id = %product.id, sku = %product.sku, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (id, sku, name, sell_price_cents, stock, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&product.id)
        .bind(&product.sku)
        .bind(&product.name)
        .bind(product.sell_price_cents)
        .bind(product.stock)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
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

    fn product(id: &str, sku: &str) -> Product {
        let now = Utc::now();
        Product {
            id: id.to_string(),
            sku: sku.to_string(),
            name: format!("Product {sku}"),
            sell_price_cents: 5000,
            stock: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        repo.insert(&product("p1", "SHIRT-1")).await.unwrap();

        let found = repo.get_by_id("p1").await.unwrap().unwrap();
        assert_eq!(found.sku, "SHIRT-1");
        assert_eq!(found.sell_price_cents, 5000);

        let by_sku = repo.find_by_sku("SHIRT-1").await.unwrap().unwrap();
        assert_eq!(by_sku.id, "p1");
    }

    #[tokio::test]
    async fn test_duplicate_sku_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        repo.insert(&product("p1", "SHIRT-1")).await.unwrap();
        let err = repo.insert(&product("p2", "SHIRT-1")).await.unwrap_err();

        assert!(err.is_unique_violation());
    }
}
