use super::connectivity::ConnectivityMonitor;
use super::mode::ModeController;
use crate::application::ports::RemoteBackend;
use crate::domain::entities::{EntityRecord, MutationRecord};
use crate::domain::value_objects::{EntityTable, MutationAction, SyncPhase, SyncStatus};
use crate::infrastructure::database::{LocalStore, MutationQueue};
use crate::shared::error::{Result, SyncError};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    /// Queue items confirmed and removed.
    pub drained: u32,
    /// Local pending/error records accepted by the remote backend.
    pub pushed: u32,
    /// Remote records adopted locally.
    pub pulled: u32,
    /// Individual item or table failures left for the next pass.
    pub failed: u32,
}

impl ReconcileSummary {
    fn absorb(&mut self, other: ReconcileSummary) {
        self.drained += other.drained;
        self.pushed += other.pushed;
        self.pulled += other.pulled;
        self.failed += other.failed;
    }
}

/// Brings local and remote copies of the entity tables into agreement:
/// drain the mutation queue, then push local pending records, then pull
/// remote changes, resolving conflicts whole-record by newest `last_synced`
/// (last-write-wins).
///
/// Passes are idempotent and serialized by an internal mutex, so overlapping
/// triggers (timer, connectivity restored, explicit `sync_now`) cannot
/// interleave their drains.
pub struct SyncReconciler {
    store: LocalStore,
    queue: Arc<MutationQueue>,
    remote: Arc<dyn RemoteBackend>,
    connectivity: Arc<ConnectivityMonitor>,
    mode: Arc<ModeController>,
    pass_lock: Mutex<()>,
    phase_tx: watch::Sender<SyncPhase>,
}

impl SyncReconciler {
    pub fn new(
        store: LocalStore,
        queue: Arc<MutationQueue>,
        remote: Arc<dyn RemoteBackend>,
        connectivity: Arc<ConnectivityMonitor>,
        mode: Arc<ModeController>,
    ) -> Self {
        let (phase_tx, _) = watch::channel(SyncPhase::Idle);
        Self {
            store,
            queue,
            remote,
            connectivity,
            mode,
            pass_lock: Mutex::new(()),
            phase_tx,
        }
    }

    pub fn phase(&self) -> SyncPhase {
        *self.phase_tx.borrow()
    }

    pub fn subscribe_phase(&self) -> watch::Receiver<SyncPhase> {
        self.phase_tx.subscribe()
    }

    /// Full pass over every entity table. No cross-table atomicity: a
    /// failure in one table is counted and the pass moves on, since a rerun
    /// converges to the same state.
    pub async fn reconcile_all(&self) -> Result<ReconcileSummary> {
        if !self.mode.mode().allows_remote() || !self.connectivity.is_online() {
            self.phase_tx.send_replace(SyncPhase::Offline);
            return Ok(ReconcileSummary::default());
        }

        let _pass = self.pass_lock.lock().await;
        self.phase_tx.send_replace(SyncPhase::Syncing);

        let drained = self.drain_queue().await?;
        let mut summary = ReconcileSummary {
            drained,
            ..ReconcileSummary::default()
        };

        for table in EntityTable::ALL {
            match self.reconcile_table(table).await {
                Ok(table_summary) => summary.absorb(table_summary),
                Err(err) => {
                    warn!("reconciliation of {table} failed: {err}");
                    summary.failed += 1;
                }
            }
        }

        let phase = if summary.failed == 0 {
            SyncPhase::Success
        } else {
            SyncPhase::Error
        };
        self.phase_tx.send_replace(phase);

        info!(
            "reconciliation pass: drained={} pushed={} pulled={} failed={}",
            summary.drained, summary.pushed, summary.pulled, summary.failed
        );
        Ok(summary)
    }

    /// Push-then-pull for a single table, behind the same pass lock.
    pub async fn reconcile(&self, table: EntityTable) -> Result<ReconcileSummary> {
        if !self.mode.mode().allows_remote() || !self.connectivity.is_online() {
            return Ok(ReconcileSummary::default());
        }

        let _pass = self.pass_lock.lock().await;
        self.reconcile_table(table).await
    }

    /// Drains the mutation queue in FIFO order. Items are independent: a
    /// failure on one neither rolls back earlier items nor stops later ones.
    async fn drain_queue(&self) -> Result<u32> {
        let items = self.queue.pending().await?;
        let mut drained = 0;

        for item in items {
            match self.apply_mutation(&item).await {
                Ok(()) => {
                    self.confirm_mutation(&item).await?;
                    drained += 1;
                }
                Err(err) => {
                    warn!(
                        "queued {} on {} (attempt {}) failed: {err}",
                        item.action,
                        item.table,
                        item.retry_count + 1
                    );
                    if err.is_transport() {
                        self.connectivity.report_transport_failure();
                    }
                    self.queue.record_failure(&item.id, &err.to_string()).await?;
                }
            }
        }

        Ok(drained)
    }

    async fn apply_mutation(&self, item: &MutationRecord) -> Result<()> {
        match item.action {
            MutationAction::Create => {
                let record = EntityRecord::from_payload(item.table, item.payload.clone())?;
                self.remote.insert(item.table, record).await?;
            }
            MutationAction::Update => {
                let record = EntityRecord::from_payload(item.table, item.payload.clone())?;
                let id = record.id().to_string();
                self.remote.update(item.table, &id, record).await?;
            }
            MutationAction::Delete => {
                let id = payload_id(item)?;
                self.remote.delete(item.table, &id).await?;
            }
        }
        Ok(())
    }

    /// Removes the confirmed item and, for create/update, marks the local
    /// record synced. The record may have been deleted locally in the
    /// meantime; that is not an error.
    async fn confirm_mutation(&self, item: &MutationRecord) -> Result<()> {
        self.queue.remove(&item.id).await?;

        if matches!(item.action, MutationAction::Create | MutationAction::Update) {
            let id = payload_id(item)?;
            let now = Utc::now().timestamp_millis();
            match self.store.mark_synced(item.table, &id, now).await {
                Ok(()) => {}
                Err(SyncError::NotFound(_)) => {
                    debug!("record {}/{id} gone before confirmation", item.table);
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    async fn reconcile_table(&self, table: EntityTable) -> Result<ReconcileSummary> {
        let mut summary = ReconcileSummary::default();

        // Step 1 — push local pending/error records.
        for record in self.store.pending(table).await? {
            let id = record.id().to_string();
            match self.remote.upsert(table, record).await {
                Ok(()) => {
                    let now = Utc::now().timestamp_millis();
                    match self.store.mark_synced(table, &id, now).await {
                        Ok(()) | Err(SyncError::NotFound(_)) => {}
                        Err(err) => return Err(err),
                    }
                    summary.pushed += 1;
                }
                Err(err) => {
                    // Status stays pending/error; the next pass retries.
                    warn!("push of {table}/{id} failed: {err}");
                    if err.is_transport() {
                        self.connectivity.report_transport_failure();
                    }
                    summary.failed += 1;
                }
            }
        }

        // Step 2 — pull remote records, last-write-wins on `last_synced`.
        match self.remote.select(table, None).await {
            Ok(remote_records) => {
                for mut remote_record in remote_records {
                    let id = remote_record.id().to_string();
                    let adopt = match self.store.get(table, &id).await? {
                        None => true,
                        Some(local) => {
                            let remote_ts = remote_record.meta().last_synced.unwrap_or(0);
                            let local_ts = local.meta().last_synced.unwrap_or(0);
                            remote_ts > local_ts
                        }
                    };

                    if adopt {
                        let meta = remote_record.meta_mut();
                        meta.sync_status = SyncStatus::Synced;
                        meta.is_local = false;
                        self.store.put(&remote_record).await?;
                        summary.pulled += 1;
                    }
                }
            }
            Err(err) => {
                warn!("pull of {table} failed: {err}");
                if err.is_transport() {
                    self.connectivity.report_transport_failure();
                }
                summary.failed += 1;
            }
        }

        Ok(summary)
    }
}

fn payload_id(item: &MutationRecord) -> Result<String> {
    item.payload
        .get("id")
        .and_then(|value| value.as_str())
        .map(str::to_string)
        .ok_or_else(|| {
            SyncError::Validation(format!(
                "queued {} on {} carries no id",
                item.action, item.table
            ))
        })
}
