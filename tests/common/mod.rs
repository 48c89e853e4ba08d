#![allow(dead_code)]

pub mod mocks;

use eventdesk_sync::{SyncConfig, SyncEngine};
use mocks::MockRemoteBackend;
use std::sync::{Arc, Once};

pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "eventdesk_sync=debug".into()),
            )
            .with_test_writer()
            .try_init();
    });
}

/// Engine on an in-memory database with a scriptable remote. Background
/// tasks are not started; tests drive connectivity and reconciliation
/// explicitly for determinism.
pub async fn setup_engine() -> (Arc<SyncEngine>, Arc<MockRemoteBackend>) {
    init_tracing();
    let remote = Arc::new(MockRemoteBackend::new());
    let engine = SyncEngine::in_memory(SyncConfig::default(), remote.clone())
        .await
        .expect("engine setup");
    (engine, remote)
}
