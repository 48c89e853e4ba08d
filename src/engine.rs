use crate::application::ports::{RemoteBackend, RemoteError, RemoteFilter};
use crate::application::services::{
    ConnectivityMonitor, ModeController, ReconcileSummary, SyncReconciler,
};
use crate::domain::entities::{EntityRecord, MutationDraft, UploadBlob, UploadMetadata};
use crate::domain::value_objects::{
    EntityTable, Mode, MutationAction, SyncPhase, SyncStatus,
};
use crate::infrastructure::database::{ConnectionPool, LocalStore, MutationQueue};
use crate::shared::config::SyncConfig;
use crate::shared::error::{Result, SyncError};
use chrono::Utc;
use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{Duration, interval, timeout};
use tracing::{debug, warn};

/// The single entry point UI and business-logic collaborators use.
///
/// Every write lands in the local store first and returns without waiting
/// for remote confirmation; the remote side is attempted immediately when
/// mode and connectivity permit, and queued otherwise. Reads never block on
/// network I/O and `list` never surfaces a network error.
pub struct SyncEngine {
    config: SyncConfig,
    pool: ConnectionPool,
    store: LocalStore,
    queue: Arc<MutationQueue>,
    remote: Arc<dyn RemoteBackend>,
    connectivity: Arc<ConnectivityMonitor>,
    mode: Arc<ModeController>,
    reconciler: Arc<SyncReconciler>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl SyncEngine {
    pub async fn new(config: SyncConfig, remote: Arc<dyn RemoteBackend>) -> Result<Arc<Self>> {
        let pool = ConnectionPool::new(&config.database).await?;
        Self::build(config, remote, pool).await
    }

    /// In-memory database, for tests.
    pub async fn in_memory(config: SyncConfig, remote: Arc<dyn RemoteBackend>) -> Result<Arc<Self>> {
        let pool = ConnectionPool::from_memory().await?;
        Self::build(config, remote, pool).await
    }

    async fn build(
        config: SyncConfig,
        remote: Arc<dyn RemoteBackend>,
        pool: ConnectionPool,
    ) -> Result<Arc<Self>> {
        pool.migrate().await?;
        let store = LocalStore::new(pool.get_pool().clone());
        let queue = Arc::new(MutationQueue::new(pool.get_pool().clone()).await?);
        let connectivity = Arc::new(ConnectivityMonitor::new(
            remote.clone(),
            config.connectivity.clone(),
        ));
        let mode = Arc::new(ModeController::load(store.clone()).await?);
        let reconciler = Arc::new(SyncReconciler::new(
            store.clone(),
            queue.clone(),
            remote.clone(),
            connectivity.clone(),
            mode.clone(),
        ));

        Ok(Arc::new(Self {
            config,
            pool,
            store,
            queue,
            remote,
            connectivity,
            mode,
            reconciler,
            tasks: Mutex::new(Vec::new()),
        }))
    }

    /// Spawns the background machinery: the connectivity probe loop, the
    /// periodic reconciliation timer, and the trigger task that reconciles
    /// on connectivity restoration and on mode changes away from `offline`.
    pub fn start(self: &Arc<Self>) {
        let mut tasks = self.tasks.lock().expect("task list lock poisoned");

        tasks.push(self.connectivity.clone().spawn_probe_loop());

        if self.config.reconcile.auto_sync {
            let engine = Arc::clone(self);
            tasks.push(tokio::spawn(async move {
                let mut ticker = interval(Duration::from_secs(engine.config.reconcile.interval));
                // First tick fires immediately and doubles as the startup pass.
                loop {
                    ticker.tick().await;
                    if let Err(err) = engine.reconciler.reconcile_all().await {
                        warn!("periodic reconciliation failed: {err}");
                    }
                }
            }));
        }

        let engine = Arc::clone(self);
        tasks.push(tokio::spawn(async move {
            let mut conn_rx = engine.connectivity.subscribe();
            let mut mode_rx = engine.mode.subscribe();
            loop {
                tokio::select! {
                    changed = conn_rx.recv() => match changed {
                        Ok(true) => {
                            if let Err(err) = engine.reconciler.reconcile_all().await {
                                warn!("reconciliation on connectivity restore failed: {err}");
                            }
                        }
                        Ok(false) => {}
                        Err(broadcast::error::RecvError::Lagged(_)) => {}
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                    changed = mode_rx.changed() => match changed {
                        Ok(()) => {
                            let mode = *mode_rx.borrow_and_update();
                            if mode.allows_remote() {
                                if let Err(err) = engine.reconciler.reconcile_all().await {
                                    warn!("reconciliation on mode change failed: {err}");
                                }
                            }
                        }
                        Err(_) => break,
                    },
                }
            }
        }));
    }

    pub async fn shutdown(&self) {
        let tasks = {
            let mut guard = self.tasks.lock().expect("task list lock poisoned");
            std::mem::take(&mut *guard)
        };
        for task in tasks {
            task.abort();
        }
        self.pool.close().await;
    }

    // -- CRUD ---------------------------------------------------------------

    /// Writes the record locally (always succeeds short of a local store
    /// failure), then attempts or queues the remote insert. Returns the
    /// local record immediately. An application-level rejection on the
    /// immediate attempt is surfaced so the caller can show a validation
    /// message; the mutation stays queued for background retries.
    pub async fn create(&self, mut record: EntityRecord) -> Result<EntityRecord> {
        if record.id().is_empty() {
            return Err(SyncError::Validation("record id must not be empty".into()));
        }

        let table = record.table();
        let permitted = self.remote_permitted();
        {
            let meta = record.meta_mut();
            meta.sync_status = SyncStatus::Pending;
            meta.is_local = !permitted;
        }
        self.store.put(&record).await?;

        if !permitted {
            self.enqueue_record(table, MutationAction::Create, &record).await?;
            return Ok(record);
        }

        match self.remote.insert(table, record.clone()).await {
            Ok(()) => {
                record.meta_mut().mark_synced(Utc::now().timestamp_millis());
                self.store.put(&record).await?;
                Ok(record)
            }
            Err(err) if err.is_transport() => {
                debug!("create on {table} queued after transport failure: {err}");
                self.connectivity.report_transport_failure();
                // The remote backend never saw this record after all.
                record.meta_mut().is_local = true;
                self.store.put(&record).await?;
                self.enqueue_record(table, MutationAction::Create, &record).await?;
                Ok(record)
            }
            Err(err) => {
                self.store
                    .mark_status(table, record.id(), SyncStatus::Error)
                    .await?;
                self.enqueue_record(table, MutationAction::Create, &record).await?;
                Err(err.into())
            }
        }
    }

    /// Shallow-merges `patch` onto the stored record. Fails with `NotFound`
    /// if the id is absent locally; the id itself cannot be patched.
    pub async fn update(
        &self,
        table: EntityTable,
        id: &str,
        patch: serde_json::Value,
    ) -> Result<EntityRecord> {
        let serde_json::Value::Object(patch) = patch else {
            return Err(SyncError::Validation("patch must be a JSON object".into()));
        };

        let existing = self
            .store
            .get(table, id)
            .await?
            .ok_or_else(|| SyncError::NotFound(format!("{table}/{id}")))?;

        let mut payload = existing.to_payload()?;
        let Some(object) = payload.as_object_mut() else {
            return Err(SyncError::Serialization(format!(
                "stored {table} record is not a JSON object"
            )));
        };
        for (key, value) in patch {
            if key == "id" {
                continue;
            }
            object.insert(key, value);
        }

        let mut record = EntityRecord::from_payload(table, payload)?;
        record.meta_mut().mark_pending();
        self.store.put(&record).await?;

        if !self.remote_permitted() {
            self.enqueue_record(table, MutationAction::Update, &record).await?;
            return Ok(record);
        }

        match self.remote.update(table, id, record.clone()).await {
            Ok(()) => {
                record.meta_mut().mark_synced(Utc::now().timestamp_millis());
                self.store.put(&record).await?;
                Ok(record)
            }
            Err(err) if err.is_transport() => {
                debug!("update on {table}/{id} queued after transport failure: {err}");
                self.connectivity.report_transport_failure();
                self.enqueue_record(table, MutationAction::Update, &record).await?;
                Ok(record)
            }
            Err(err) => {
                self.store.mark_status(table, id, SyncStatus::Error).await?;
                self.enqueue_record(table, MutationAction::Update, &record).await?;
                Err(err.into())
            }
        }
    }

    /// Removes the record locally and attempts or queues the remote delete.
    /// Remote unavailability never fails this call.
    pub async fn delete(&self, table: EntityTable, id: &str) -> Result<()> {
        let existed = self.store.delete(table, id).await?;
        if !existed {
            debug!("delete of absent record {table}/{id}");
        }

        let payload = serde_json::json!({ "id": id });
        if !self.remote_permitted() {
            self.enqueue_payload(table, MutationAction::Delete, payload).await?;
            return Ok(());
        }

        match self.remote.delete(table, id).await {
            Ok(()) => Ok(()),
            Err(err) if err.is_transport() => {
                debug!("delete of {table}/{id} queued after transport failure: {err}");
                self.connectivity.report_transport_failure();
                self.enqueue_payload(table, MutationAction::Delete, payload).await?;
                Ok(())
            }
            Err(err) => {
                self.enqueue_payload(table, MutationAction::Delete, payload).await?;
                Err(err.into())
            }
        }
    }

    /// When mode and connectivity permit, fetches from the remote backend
    /// and opportunistically refreshes the local store; any remote failure
    /// falls back to a local-only read. Always returns a result.
    pub async fn list(
        &self,
        table: EntityTable,
        owner_id: Option<&str>,
    ) -> Result<Vec<EntityRecord>> {
        let mode = self.mode.mode();
        if mode.allows_remote() && self.connectivity.is_online() {
            let filter = owner_id.map(RemoteFilter::by_owner);
            // Bounded like the probe: a hung backend must not block a read.
            let deadline = Duration::from_secs(self.config.connectivity.probe_timeout);
            let outcome = match timeout(deadline, self.remote.select(table, filter)).await {
                Ok(result) => result,
                Err(_) => Err(RemoteError::Transport(format!(
                    "select on {table} timed out after {deadline:?}"
                ))),
            };
            match outcome {
                Ok(remote_records) => {
                    let mut refreshed = Vec::with_capacity(remote_records.len());
                    for mut record in remote_records {
                        let meta = record.meta_mut();
                        meta.sync_status = SyncStatus::Synced;
                        meta.is_local = false;
                        self.store.put(&record).await?;
                        refreshed.push(record);
                    }
                    // Hybrid reads consult both sides: the local listing now
                    // contains the refreshed remote rows plus local pending
                    // records the remote has never seen.
                    if mode == Mode::Hybrid {
                        return self.store.list(table, owner_id).await;
                    }
                    return Ok(refreshed);
                }
                Err(err) => {
                    if err.is_transport() {
                        self.connectivity.report_transport_failure();
                    }
                    debug!("list of {table} falling back to local store: {err}");
                }
            }
        }

        self.store.list(table, owner_id).await
    }

    /// Point lookup against the local store. Reads never block on network
    /// I/O; `list` is the refresh path.
    pub async fn get(&self, table: EntityTable, id: &str) -> Result<Option<EntityRecord>> {
        self.store.get(table, id).await
    }

    /// Explicit reconciliation trigger for the UI's "sync now" affordance.
    pub async fn sync_now(&self) -> Result<ReconcileSummary> {
        self.reconciler.reconcile_all().await
    }

    /// Push-then-pull for a single entity table.
    pub async fn sync_table(&self, table: EntityTable) -> Result<ReconcileSummary> {
        self.reconciler.reconcile(table).await
    }

    // -- uploads (local-only, not reconciled) -------------------------------

    pub async fn put_upload_blob(&self, blob: &UploadBlob) -> Result<()> {
        self.store.put_blob(blob).await
    }

    pub async fn get_upload_blob(&self, id: &str) -> Result<Option<UploadBlob>> {
        self.store.get_blob(id).await
    }

    pub async fn list_upload_blobs(&self, owner_id: &str) -> Result<Vec<UploadBlob>> {
        self.store.list_blobs(owner_id).await
    }

    pub async fn delete_upload_blob(&self, id: &str) -> Result<bool> {
        self.store.delete_blob(id).await
    }

    pub async fn put_upload_metadata(&self, meta: &UploadMetadata) -> Result<()> {
        self.store.put_upload_metadata(meta).await
    }

    pub async fn list_upload_metadata(&self, owner_id: &str) -> Result<Vec<UploadMetadata>> {
        self.store.list_upload_metadata(owner_id).await
    }

    pub async fn delete_upload_metadata(&self, id: &str) -> Result<bool> {
        self.store.delete_upload_metadata(id).await
    }

    // -- read-only seams for the presentation layer -------------------------

    pub fn is_online(&self) -> bool {
        self.connectivity.is_online()
    }

    pub fn connectivity_state(&self) -> Option<bool> {
        self.connectivity.state()
    }

    pub fn subscribe_connectivity(&self) -> broadcast::Receiver<bool> {
        self.connectivity.subscribe()
    }

    /// Platform network transition events are forwarded here by the host.
    pub fn set_network_hint(&self, online: bool) {
        self.connectivity.set_network_hint(online);
    }

    pub fn mode(&self) -> Mode {
        self.mode.mode()
    }

    pub async fn set_mode(&self, mode: Mode) -> Result<()> {
        self.mode.set_mode(mode).await
    }

    pub fn subscribe_mode(&self) -> watch::Receiver<Mode> {
        self.mode.subscribe()
    }

    pub fn pending_mutations(&self) -> u64 {
        self.queue.count()
    }

    pub fn subscribe_pending_mutations(&self) -> watch::Receiver<u64> {
        self.queue.subscribe_count()
    }

    pub fn sync_phase(&self) -> SyncPhase {
        self.reconciler.phase()
    }

    pub fn subscribe_sync_phase(&self) -> watch::Receiver<SyncPhase> {
        self.reconciler.subscribe_phase()
    }

    /// Test seam: the monitor itself, for forcing connectivity state.
    pub fn connectivity(&self) -> &ConnectivityMonitor {
        &self.connectivity
    }

    // -----------------------------------------------------------------------

    fn remote_permitted(&self) -> bool {
        self.mode.mode().allows_remote() && self.connectivity.is_online()
    }

    async fn enqueue_record(
        &self,
        table: EntityTable,
        action: MutationAction,
        record: &EntityRecord,
    ) -> Result<()> {
        self.enqueue_payload(table, action, record.to_payload()?).await
    }

    async fn enqueue_payload(
        &self,
        table: EntityTable,
        action: MutationAction,
        payload: serde_json::Value,
    ) -> Result<()> {
        self.queue
            .enqueue(MutationDraft::new(table, action, payload))
            .await?;
        Ok(())
    }
}
