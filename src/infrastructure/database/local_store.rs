use super::rows::{EntityRow, UploadBlobRow, UploadMetadataRow};
use crate::domain::entities::{EntityRecord, UploadBlob, UploadMetadata};
use crate::domain::value_objects::{EntityTable, SyncStatus};
use crate::shared::error::{Result, SyncError};
use sqlx::{Row, SqlitePool};

/// The per-entity-type durable table set. Source of truth for all reads;
/// no operation here touches the network.
#[derive(Clone)]
pub struct LocalStore {
    pool: SqlitePool,
}

impl LocalStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Upsert keyed by `id`. A single statement, so it never partially
    /// applies a record.
    pub async fn put(&self, record: &EntityRecord) -> Result<()> {
        let table = record.table().as_str();
        let meta = record.meta();
        let data = serde_json::to_string(&record.to_payload()?)?;

        sqlx::query(&format!(
            r#"
            INSERT INTO {table} (id, owner_id, created_at, sync_status, last_synced, is_local, data)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO UPDATE SET
                owner_id = excluded.owner_id,
                created_at = excluded.created_at,
                sync_status = excluded.sync_status,
                last_synced = excluded.last_synced,
                is_local = excluded.is_local,
                data = excluded.data
            "#
        ))
        .bind(record.id())
        .bind(record.owner_id())
        .bind(record.created_at())
        .bind(meta.sync_status.as_str())
        .bind(meta.last_synced)
        .bind(meta.is_local)
        .bind(&data)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get(&self, table: EntityTable, id: &str) -> Result<Option<EntityRecord>> {
        let row = sqlx::query_as::<_, EntityRow>(&format!(
            "SELECT * FROM {} WHERE id = ?1",
            table.as_str()
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| record_from_row(table, row)).transpose()
    }

    /// Returns true if a row was actually removed.
    pub async fn delete(&self, table: EntityTable, id: &str) -> Result<bool> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = ?1", table.as_str()))
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Newest-first listing, optionally narrowed to one owning record.
    pub async fn list(&self, table: EntityTable, owner_id: Option<&str>) -> Result<Vec<EntityRecord>> {
        let rows = match owner_id {
            Some(owner) => {
                sqlx::query_as::<_, EntityRow>(&format!(
                    "SELECT * FROM {} WHERE owner_id = ?1 ORDER BY created_at DESC",
                    table.as_str()
                ))
                .bind(owner)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, EntityRow>(&format!(
                    "SELECT * FROM {} ORDER BY created_at DESC",
                    table.as_str()
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.into_iter()
            .map(|row| record_from_row(table, row))
            .collect()
    }

    /// Records awaiting a push: `pending` or `error`, oldest first.
    pub async fn pending(&self, table: EntityTable) -> Result<Vec<EntityRecord>> {
        let rows = sqlx::query_as::<_, EntityRow>(&format!(
            "SELECT * FROM {} WHERE sync_status IN ('pending', 'error') ORDER BY created_at ASC",
            table.as_str()
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| record_from_row(table, row))
            .collect()
    }

    pub async fn count_pending(&self, table: EntityTable) -> Result<i64> {
        let row = sqlx::query(&format!(
            "SELECT COUNT(*) as count FROM {} WHERE sync_status IN ('pending', 'error')",
            table.as_str()
        ))
        .fetch_one(&self.pool)
        .await?;

        Ok(row.try_get("count").unwrap_or(0))
    }

    /// Flips a record to `synced` with a fresh reconciliation timestamp.
    /// Also rewrites the JSON copy so the stored document stays consistent
    /// with the columns.
    pub async fn mark_synced(&self, table: EntityTable, id: &str, last_synced: i64) -> Result<()> {
        let Some(mut record) = self.get(table, id).await? else {
            return Err(SyncError::NotFound(format!("{table}/{id}")));
        };
        record.meta_mut().mark_synced(last_synced);
        self.put(&record).await
    }

    pub async fn mark_status(&self, table: EntityTable, id: &str, status: SyncStatus) -> Result<()> {
        let Some(mut record) = self.get(table, id).await? else {
            return Err(SyncError::NotFound(format!("{table}/{id}")));
        };
        record.meta_mut().sync_status = status;
        self.put(&record).await
    }

    // -- settings -----------------------------------------------------------

    pub async fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM settings WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| row.try_get("value").unwrap_or_default()))
    }

    pub async fn put_setting(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO settings (key, value) VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // -- uploads ------------------------------------------------------------

    pub async fn put_blob(&self, blob: &UploadBlob) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO upload_blobs (id, owner_table, owner_id, content_base64, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(id) DO UPDATE SET
                owner_table = excluded.owner_table,
                owner_id = excluded.owner_id,
                content_base64 = excluded.content_base64
            "#,
        )
        .bind(&blob.id)
        .bind(&blob.owner_table)
        .bind(&blob.owner_id)
        .bind(&blob.content_base64)
        .bind(blob.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_blob(&self, id: &str) -> Result<Option<UploadBlob>> {
        let row = sqlx::query_as::<_, UploadBlobRow>("SELECT * FROM upload_blobs WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(blob_from_row))
    }

    pub async fn list_blobs(&self, owner_id: &str) -> Result<Vec<UploadBlob>> {
        let rows = sqlx::query_as::<_, UploadBlobRow>(
            "SELECT * FROM upload_blobs WHERE owner_id = ?1 ORDER BY created_at DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(blob_from_row).collect())
    }

    pub async fn delete_blob(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM upload_blobs WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn put_upload_metadata(&self, meta: &UploadMetadata) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO upload_metadata (id, owner_id, file_name, content_type, size_bytes, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(id) DO UPDATE SET
                owner_id = excluded.owner_id,
                file_name = excluded.file_name,
                content_type = excluded.content_type,
                size_bytes = excluded.size_bytes
            "#,
        )
        .bind(&meta.id)
        .bind(&meta.owner_id)
        .bind(&meta.file_name)
        .bind(&meta.content_type)
        .bind(meta.size_bytes)
        .bind(meta.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn list_upload_metadata(&self, owner_id: &str) -> Result<Vec<UploadMetadata>> {
        let rows = sqlx::query_as::<_, UploadMetadataRow>(
            "SELECT * FROM upload_metadata WHERE owner_id = ?1 ORDER BY created_at DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(upload_metadata_from_row).collect())
    }

    pub async fn delete_upload_metadata(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM upload_metadata WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn record_from_row(table: EntityTable, row: EntityRow) -> Result<EntityRecord> {
    let payload: serde_json::Value = serde_json::from_str(&row.data)?;
    let mut record = EntityRecord::from_payload(table, payload)?;

    // Columns win over whatever the JSON copy says.
    let meta = record.meta_mut();
    meta.sync_status = SyncStatus::from(row.sync_status.as_str());
    meta.last_synced = row.last_synced;
    meta.is_local = row.is_local;

    Ok(record)
}

fn blob_from_row(row: UploadBlobRow) -> UploadBlob {
    UploadBlob {
        id: row.id,
        owner_table: row.owner_table,
        owner_id: row.owner_id,
        content_base64: row.content_base64,
        created_at: row.created_at,
    }
}

fn upload_metadata_from_row(row: UploadMetadataRow) -> UploadMetadata {
    UploadMetadata {
        id: row.id,
        owner_id: row.owner_id,
        file_name: row.file_name,
        content_type: row.content_type,
        size_bytes: row.size_bytes,
        created_at: row.created_at,
    }
}
