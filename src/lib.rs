//! Offline-first hybrid data synchronization engine for the EventDesk
//! event-management suite.
//!
//! The application keeps working while disconnected: every write lands in a
//! durable local SQLite store immediately, writes that cannot reach the
//! remote backend are queued, a connectivity monitor probes for
//! reachability, and a reconciler brings both sides back into agreement
//! (push local pending, pull remote changes, last-write-wins on the
//! synchronization timestamp) once connectivity returns.
//!
//! Construct a [`SyncEngine`] from a [`SyncConfig`] and an implementation of
//! [`RemoteBackend`], then call [`SyncEngine::start`] to spawn the probe
//! loop and background reconciliation.

pub mod application;
pub mod domain;
mod engine;
pub mod infrastructure;
pub mod shared;

pub use application::ports::{RemoteBackend, RemoteError, RemoteFilter};
pub use application::services::{
    ConnectivityMonitor, ModeController, ReconcileSummary, SyncReconciler,
};
pub use domain::entities::{
    Attendee, Company, EntityRecord, Event, MutationDraft, MutationRecord, SyncMeta, Syncable,
    UploadBlob, UploadMetadata, Winner,
};
pub use domain::value_objects::{EntityTable, Mode, MutationAction, SyncPhase, SyncStatus};
pub use engine::SyncEngine;
pub use shared::config::SyncConfig;
pub use shared::error::{Result, SyncError};
