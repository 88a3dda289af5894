//! # Ledger Repository
//!
//! Append-only movement ledger. Every accepted scan records one event
//! describing what happened to a tag (`StorePO:<id>` or
//! `SellReceipt:<id>`). Events are never updated or deleted.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use stocktag_core::TagEvent;

/// Repository for tag-event ledger operations.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: SqlitePool,
}

impl LedgerRepository {
    /// Creates a new LedgerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LedgerRepository { pool }
    }

    /// Appends one event to the ledger.
    pub async fn append(&self, event: &TagEvent) -> DbResult<()> {
        debug!(uid = %event.tag_uid, action = %event.action, "Recording tag event");

        sqlx::query(
            r#"
            INSERT INTO tag_events (id, tag_uid, action, recorded_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&event.id)
        .bind(&event.tag_uid)
        .bind(&event.action)
        .bind(event.recorded_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Most recent events, newest first. Backs the movement audit view.
    pub async fn recent(&self, limit: i64) -> DbResult<Vec<TagEvent>> {
        let events = sqlx::query_as::<_, TagEvent>(
            r#"
            SELECT id, tag_uid, action, recorded_at
            FROM tag_events
            ORDER BY recorded_at DESC, id DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// Full event history for one tag, oldest first.
    pub async fn for_tag(&self, uid: &str) -> DbResult<Vec<TagEvent>> {
        let events = sqlx::query_as::<_, TagEvent>(
            r#"
            SELECT id, tag_uid, action, recorded_at
            FROM tag_events
            WHERE tag_uid = ?1
            ORDER BY recorded_at, id
            "#,
        )
        .bind(uid)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
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
    use uuid::Uuid;

    fn event(uid: &str, action: String) -> TagEvent {
        TagEvent {
            id: Uuid::new_v4().to_string(),
            tag_uid: uid.to_string(),
            action,
            recorded_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_append_and_recent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.ledger();

        repo.append(&event("E200-1", TagEvent::store_action("po-1")))
            .await
            .unwrap();
        repo.append(&event("E200-1", TagEvent::sell_action("sale-1")))
            .await
            .unwrap();

        let recent = repo.recent(10).await.unwrap();
        assert_eq!(recent.len(), 2);

        let history = repo.for_tag("E200-1").await.unwrap();
        assert_eq!(history[0].action, "StorePO:po-1");
        assert_eq!(history[1].action, "SellReceipt:sale-1");
    }

    #[tokio::test]
    async fn test_recent_respects_limit() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.ledger();

        for i in 0..5 {
            repo.append(&event(&format!("E200-{i}"), TagEvent::store_action("po-1")))
                .await
                .unwrap();
        }

        assert_eq!(repo.recent(3).await.unwrap().len(), 3);
    }
}
