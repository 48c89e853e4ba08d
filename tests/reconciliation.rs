mod common;

use common::mocks::MockRemoteBackend;
use common::setup_engine;
use eventdesk_sync::{
    Company, EntityRecord, EntityTable, Event, SyncConfig, SyncEngine, SyncStatus,
};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tokio::time::{Duration, timeout};

fn event_named(record: &EntityRecord) -> &str {
    match record {
        EntityRecord::Event(event) => &event.name,
        other => panic!("expected an event, got {other:?}"),
    }
}

#[tokio::test]
async fn reconcile_twice_is_idempotent() {
    let (engine, remote) = setup_engine().await;
    engine.connectivity().force_state(false);

    for name in ["One", "Two"] {
        engine
            .create(EntityRecord::Event(Event::new(name.to_string())))
            .await
            .unwrap();
    }

    engine.connectivity().force_state(true);
    engine.sync_now().await.unwrap();
    let after_first = engine.list(EntityTable::Events, None).await.unwrap();

    let summary = engine.sync_now().await.unwrap();
    let after_second = engine.list(EntityTable::Events, None).await.unwrap();

    assert_eq!(after_first, after_second);
    assert_eq!(summary.drained, 0);
    assert_eq!(summary.pushed, 0);
    assert_eq!(summary.failed, 0);
    assert_eq!(remote.len(EntityTable::Events), 2);
}

#[tokio::test]
async fn newer_remote_record_wins_whole_record() {
    let (engine, remote) = setup_engine().await;
    engine.connectivity().force_state(true);

    let created = engine
        .create(EntityRecord::Event(Event::new("Local title".to_string())))
        .await
        .unwrap();
    let id = created.id().to_string();
    let local_ts = created.meta().last_synced.unwrap();

    // Same id, edited elsewhere and synced later.
    let mut newer = Event::new("Remote title".to_string());
    newer.id = id.clone();
    newer.created_at = created.created_at();
    newer.meta.sync_status = SyncStatus::Synced;
    newer.meta.last_synced = Some(local_ts + 60_000);
    remote.seed(EntityRecord::Event(newer));

    engine.sync_now().await.unwrap();

    let local = engine.get(EntityTable::Events, &id).await.unwrap().unwrap();
    assert_eq!(event_named(&local), "Remote title");
    assert_eq!(local.meta().sync_status, SyncStatus::Synced);
    assert_eq!(local.meta().last_synced, Some(local_ts + 60_000));
}

#[tokio::test]
async fn older_remote_record_is_ignored() {
    let (engine, remote) = setup_engine().await;
    engine.connectivity().force_state(true);

    let created = engine
        .create(EntityRecord::Event(Event::new("Fresh".to_string())))
        .await
        .unwrap();
    let id = created.id().to_string();

    let mut stale = Event::new("Stale".to_string());
    stale.id = id.clone();
    stale.meta.sync_status = SyncStatus::Synced;
    stale.meta.last_synced = Some(1);
    remote.seed(EntityRecord::Event(stale));

    engine.sync_now().await.unwrap();

    let local = engine.get(EntityTable::Events, &id).await.unwrap().unwrap();
    assert_eq!(event_named(&local), "Fresh");
}

#[tokio::test]
async fn reads_stay_bounded_while_the_transport_hangs() {
    let (engine, remote) = setup_engine().await;
    engine.connectivity().force_state(false);

    let created = engine
        .create(EntityRecord::Event(Event::new("Readable".to_string())))
        .await
        .unwrap();

    remote.set_stalled(true);
    let listed = timeout(
        Duration::from_secs(2),
        engine.list(EntityTable::Events, None),
    )
    .await
    .expect("list must not block on a hung remote")
    .unwrap();

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id(), created.id());
    assert_eq!(remote.select_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn list_stays_bounded_while_believed_online() {
    let remote = Arc::new(MockRemoteBackend::new());
    let mut config = SyncConfig::default();
    config.connectivity.probe_timeout = 1;
    let engine = SyncEngine::in_memory(config, remote.clone()).await.unwrap();

    engine.connectivity().force_state(false);
    let created = engine
        .create(EntityRecord::Event(Event::new("Cached".to_string())))
        .await
        .unwrap();

    // The monitor still believes the backend is reachable, but the select
    // hangs; list must give up after its bound and fall back locally.
    engine.connectivity().force_state(true);
    remote.set_stalled(true);
    let listed = timeout(
        Duration::from_secs(3),
        engine.list(EntityTable::Events, None),
    )
    .await
    .expect("list must not block on a hung remote")
    .unwrap();

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id(), created.id());
    assert_eq!(remote.select_calls.load(Ordering::SeqCst), 1);
    // The elapsed deadline doubles as evidence of unreachability.
    assert!(!engine.is_online());
}

#[tokio::test]
async fn concurrent_passes_do_not_duplicate_work() {
    let (engine, remote) = setup_engine().await;
    engine.connectivity().force_state(false);

    let mut ids = Vec::new();
    for name in ["A", "B", "C"] {
        let record = engine
            .create(EntityRecord::Event(Event::new(name.to_string())))
            .await
            .unwrap();
        ids.push(record.id().to_string());
    }

    engine.connectivity().force_state(true);
    let (first, second) = tokio::join!(engine.sync_now(), engine.sync_now());
    first.unwrap();
    second.unwrap();

    // The pass lock serializes the drains: each queued create is applied
    // exactly once, and no id ends up duplicated remotely.
    assert_eq!(remote.insert_calls.load(Ordering::SeqCst), 3);
    assert_eq!(remote.len(EntityTable::Events), 3);
    assert_eq!(engine.pending_mutations(), 0);
    for id in &ids {
        let local = engine.get(EntityTable::Events, id).await.unwrap().unwrap();
        assert_eq!(local.meta().sync_status, SyncStatus::Synced);
    }
}

#[tokio::test]
async fn reconcile_single_table_leaves_others_untouched() {
    let (engine, remote) = setup_engine().await;
    engine.connectivity().force_state(true);

    let mut event = Event::new("Only events".to_string());
    let event_id = event.id.clone();
    event.meta.sync_status = SyncStatus::Synced;
    event.meta.last_synced = Some(1_700_000_000_000);
    remote.seed(EntityRecord::Event(event));

    let mut company = Company::new("Acme".to_string());
    let company_id = company.id.clone();
    company.meta.sync_status = SyncStatus::Synced;
    company.meta.last_synced = Some(1_700_000_000_000);
    remote.seed(EntityRecord::Company(company));

    let summary = engine.sync_table(EntityTable::Events).await.unwrap();
    assert_eq!(summary.pulled, 1);

    assert!(engine
        .get(EntityTable::Events, &event_id)
        .await
        .unwrap()
        .is_some());
    assert!(engine
        .get(EntityTable::Companies, &company_id)
        .await
        .unwrap()
        .is_none());

    engine.sync_now().await.unwrap();
    assert!(engine
        .get(EntityTable::Companies, &company_id)
        .await
        .unwrap()
        .is_some());
}
