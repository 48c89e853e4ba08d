use serde::{Deserialize, Serialize};
use std::fmt;

/// Synchronization state of a single entity record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// Created or modified locally, not yet confirmed by the remote backend.
    #[default]
    Pending,
    /// The remote backend holds an identical or newer copy.
    Synced,
    /// The last remote attempt failed; eligible for retry.
    Error,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Pending => "pending",
            SyncStatus::Synced => "synced",
            SyncStatus::Error => "error",
        }
    }

    /// Records in these states are picked up by the reconciler's push step.
    pub fn needs_push(&self) -> bool {
        matches!(self, SyncStatus::Pending | SyncStatus::Error)
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for SyncStatus {
    fn from(value: &str) -> Self {
        match value {
            "synced" => SyncStatus::Synced,
            "error" => SyncStatus::Error,
            _ => SyncStatus::Pending,
        }
    }
}
