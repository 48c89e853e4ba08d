use async_trait::async_trait;
use chrono::Utc;
use eventdesk_sync::{EntityRecord, EntityTable, RemoteBackend, RemoteError, RemoteFilter};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::time::{Duration, sleep};

/// Scriptable in-memory stand-in for the hosted relational store.
///
/// Counts every call, can fail with transport or application errors on
/// demand, and can stall to simulate a hung backend.
#[derive(Default)]
pub struct MockRemoteBackend {
    records: Mutex<HashMap<(EntityTable, String), EntityRecord>>,
    transport_down: AtomicBool,
    reject_application: AtomicBool,
    stalled: AtomicBool,
    pub select_calls: AtomicUsize,
    pub insert_calls: AtomicUsize,
    pub update_calls: AtomicUsize,
    pub upsert_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
    pub probe_calls: AtomicUsize,
}

impl MockRemoteBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remote calls fail with a transport error while set.
    pub fn set_transport_down(&self, down: bool) {
        self.transport_down.store(down, Ordering::SeqCst);
    }

    /// Remote calls fail with an application error while set.
    pub fn set_reject_application(&self, reject: bool) {
        self.reject_application.store(reject, Ordering::SeqCst);
    }

    /// Remote calls hang (far beyond any test timeout) while set.
    pub fn set_stalled(&self, stalled: bool) {
        self.stalled.store(stalled, Ordering::SeqCst);
    }

    /// Stores a record exactly as given, bypassing failure scripting.
    pub fn seed(&self, record: EntityRecord) {
        let key = (record.table(), record.id().to_string());
        self.records.lock().unwrap().insert(key, record);
    }

    pub fn get(&self, table: EntityTable, id: &str) -> Option<EntityRecord> {
        self.records
            .lock()
            .unwrap()
            .get(&(table, id.to_string()))
            .cloned()
    }

    pub fn len(&self, table: EntityTable) -> usize {
        self.records
            .lock()
            .unwrap()
            .keys()
            .filter(|(t, _)| *t == table)
            .count()
    }

    pub fn write_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
            + self.update_calls.load(Ordering::SeqCst)
            + self.upsert_calls.load(Ordering::SeqCst)
            + self.delete_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.write_calls()
            + self.select_calls.load(Ordering::SeqCst)
            + self.probe_calls.load(Ordering::SeqCst)
    }

    async fn gate(&self) -> Result<(), RemoteError> {
        if self.stalled.load(Ordering::SeqCst) {
            sleep(Duration::from_secs(3600)).await;
        }
        if self.transport_down.load(Ordering::SeqCst) {
            return Err(RemoteError::Transport("connection refused".to_string()));
        }
        if self.reject_application.load(Ordering::SeqCst) {
            return Err(RemoteError::Application("constraint violation".to_string()));
        }
        Ok(())
    }

    fn stamp(mut record: EntityRecord) -> EntityRecord {
        record.meta_mut().mark_synced(Utc::now().timestamp_millis());
        record
    }
}

#[async_trait]
impl RemoteBackend for MockRemoteBackend {
    async fn select(
        &self,
        table: EntityTable,
        filter: Option<RemoteFilter>,
    ) -> Result<Vec<EntityRecord>, RemoteError> {
        self.select_calls.fetch_add(1, Ordering::SeqCst);
        self.gate().await?;

        let owner = filter.and_then(|f| f.owner_id);
        let mut records: Vec<EntityRecord> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|((t, _), _)| *t == table)
            .map(|(_, record)| record.clone())
            .filter(|record| match &owner {
                Some(owner) => record.owner_id() == Some(owner.as_str()),
                None => true,
            })
            .collect();

        records.sort_by_key(|record| std::cmp::Reverse(record.created_at()));
        Ok(records)
    }

    async fn insert(&self, table: EntityTable, record: EntityRecord) -> Result<(), RemoteError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        self.gate().await?;

        let key = (table, record.id().to_string());
        let mut records = self.records.lock().unwrap();
        if records.contains_key(&key) {
            return Err(RemoteError::Application(format!(
                "duplicate key: {}/{}",
                table,
                record.id()
            )));
        }
        records.insert(key, Self::stamp(record));
        Ok(())
    }

    async fn update(
        &self,
        table: EntityTable,
        id: &str,
        record: EntityRecord,
    ) -> Result<(), RemoteError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        self.gate().await?;

        let key = (table, id.to_string());
        let mut records = self.records.lock().unwrap();
        if !records.contains_key(&key) {
            return Err(RemoteError::Application(format!("no rows: {table}/{id}")));
        }
        records.insert(key, Self::stamp(record));
        Ok(())
    }

    async fn upsert(&self, table: EntityTable, record: EntityRecord) -> Result<(), RemoteError> {
        self.upsert_calls.fetch_add(1, Ordering::SeqCst);
        self.gate().await?;

        let key = (table, record.id().to_string());
        self.records.lock().unwrap().insert(key, Self::stamp(record));
        Ok(())
    }

    async fn delete(&self, table: EntityTable, id: &str) -> Result<(), RemoteError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.gate().await?;

        self.records.lock().unwrap().remove(&(table, id.to_string()));
        Ok(())
    }

    async fn probe(&self) -> Result<(), RemoteError> {
        self.probe_calls.fetch_add(1, Ordering::SeqCst);
        self.gate().await
    }
}
