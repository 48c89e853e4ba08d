use super::rows::MutationRow;
use crate::domain::entities::{MutationDraft, MutationRecord};
use crate::domain::value_objects::{EntityTable, MutationAction};
use crate::shared::error::{Result, SyncError};
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tokio::sync::watch;
use uuid::Uuid;

/// Durable, ordered log of writes not yet confirmed by the remote backend.
///
/// Shares the database file with the entity tables, so losing one loses the
/// other. Items are removed only after a confirmed remote application; the
/// pending count is published on a watch channel for UI feedback.
pub struct MutationQueue {
    pool: SqlitePool,
    count_tx: watch::Sender<u64>,
}

impl MutationQueue {
    pub async fn new(pool: SqlitePool) -> Result<Self> {
        let initial = count_rows(&pool).await?;
        let (count_tx, _) = watch::channel(initial);
        Ok(Self { pool, count_tx })
    }

    /// Appends a new item with a fresh id and timestamp. Durable before
    /// returning.
    pub async fn enqueue(&self, draft: MutationDraft) -> Result<MutationRecord> {
        let record = MutationRecord {
            id: Uuid::new_v4().to_string(),
            table: draft.table,
            action: draft.action,
            payload: draft.payload,
            created_at: Utc::now().timestamp_millis(),
            retry_count: 0,
            last_error: None,
        };

        sqlx::query(
            r#"
            INSERT INTO mutation_queue (id, entity_table, action, payload, created_at, retry_count)
            VALUES (?1, ?2, ?3, ?4, ?5, 0)
            "#,
        )
        .bind(&record.id)
        .bind(record.table.as_str())
        .bind(record.action.as_str())
        .bind(serde_json::to_string(&record.payload)?)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;

        self.refresh_count().await?;
        Ok(record)
    }

    /// All queued items in insertion (FIFO) order. Ordered by rowid, since
    /// millisecond timestamps can tie within a burst of writes.
    pub async fn pending(&self) -> Result<Vec<MutationRecord>> {
        let rows = sqlx::query_as::<_, MutationRow>(
            "SELECT * FROM mutation_queue ORDER BY rowid ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(record_from_row).collect()
    }

    /// Removes a confirmed item.
    pub async fn remove(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM mutation_queue WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        self.refresh_count().await?;
        Ok(())
    }

    /// Retains the item and records the failed attempt. Retries are
    /// unbounded; the counter exists for observability only.
    pub async fn record_failure(&self, id: &str, message: &str) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE mutation_queue
            SET retry_count = retry_count + 1, last_error = ?1
            WHERE id = ?2
            "#,
        )
        .bind(message)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub fn count(&self) -> u64 {
        *self.count_tx.borrow()
    }

    pub fn subscribe_count(&self) -> watch::Receiver<u64> {
        self.count_tx.subscribe()
    }

    async fn refresh_count(&self) -> Result<()> {
        let count = count_rows(&self.pool).await?;
        self.count_tx.send_replace(count);
        Ok(())
    }
}

async fn count_rows(pool: &SqlitePool) -> Result<u64> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM mutation_queue")
        .fetch_one(pool)
        .await?;
    let count: i64 = row.try_get("count").unwrap_or(0);
    Ok(count.max(0) as u64)
}

fn record_from_row(row: MutationRow) -> Result<MutationRecord> {
    let table = EntityTable::parse(&row.entity_table)
        .ok_or_else(|| SyncError::Validation(format!("unknown table: {}", row.entity_table)))?;

    Ok(MutationRecord {
        id: row.id,
        table,
        action: MutationAction::from(row.action.as_str()),
        payload: serde_json::from_str(&row.payload)?,
        created_at: row.created_at,
        retry_count: row.retry_count,
        last_error: row.last_error,
    })
}
