use crate::domain::entities::EntityRecord;
use crate::domain::value_objects::EntityTable;
use crate::shared::error::SyncError;
use async_trait::async_trait;
use thiserror::Error;

/// Error returned by remote backend calls.
///
/// The transport/application split drives the connectivity monitor: a
/// transport failure means the backend may be unreachable, while an
/// application-level rejection ("no rows", constraint violation) proves it
/// was reachable.
#[derive(Debug, Clone, Error)]
pub enum RemoteError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("application error: {0}")]
    Application(String),
}

impl RemoteError {
    pub fn is_transport(&self) -> bool {
        matches!(self, RemoteError::Transport(_))
    }
}

impl From<RemoteError> for SyncError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::Transport(msg) => SyncError::Transport(msg),
            RemoteError::Application(msg) => SyncError::Application(msg),
        }
    }
}

/// Optional constraint on a `select`.
#[derive(Debug, Clone, Default)]
pub struct RemoteFilter {
    /// Match on the owning record (company for events, event for
    /// attendees/winners).
    pub owner_id: Option<String>,
}

impl RemoteFilter {
    pub fn by_owner(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: Some(owner_id.into()),
        }
    }
}

/// The opaque request/response store the engine reconciles against.
///
/// Implementations live outside this crate (the production one wraps the
/// hosted relational API); tests use a scriptable mock.
#[async_trait]
pub trait RemoteBackend: Send + Sync {
    /// Fetch records for a table, newest first by creation time.
    async fn select(
        &self,
        table: EntityTable,
        filter: Option<RemoteFilter>,
    ) -> Result<Vec<EntityRecord>, RemoteError>;

    async fn insert(&self, table: EntityTable, record: EntityRecord) -> Result<(), RemoteError>;

    async fn update(
        &self,
        table: EntityTable,
        id: &str,
        record: EntityRecord,
    ) -> Result<(), RemoteError>;

    /// Insert-or-replace by id; the reconciler's push step uses this.
    async fn upsert(&self, table: EntityTable, record: EntityRecord) -> Result<(), RemoteError>;

    async fn delete(&self, table: EntityTable, id: &str) -> Result<(), RemoteError>;

    /// Lightweight reachability check. Implementations should issue the
    /// cheapest possible read; an `Application` error still counts as
    /// reachable to the caller.
    async fn probe(&self) -> Result<(), RemoteError>;
}
