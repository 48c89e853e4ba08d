use crate::domain::value_objects::{EntityTable, MutationAction};
use serde::{Deserialize, Serialize};

/// A pending write that has not yet been confirmed by the remote backend.
///
/// Items are append-only and removed only after a confirmed remote
/// application. `retry_count`/`last_error` record failed attempts for
/// observability; nothing caps the retries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationRecord {
    pub id: String,
    pub table: EntityTable,
    pub action: MutationAction,
    pub payload: serde_json::Value,
    pub created_at: i64,
    pub retry_count: i32,
    pub last_error: Option<String>,
}

/// What a caller hands to the queue; id and timestamp are assigned on enqueue.
#[derive(Debug, Clone)]
pub struct MutationDraft {
    pub table: EntityTable,
    pub action: MutationAction,
    pub payload: serde_json::Value,
}

impl MutationDraft {
    pub fn new(table: EntityTable, action: MutationAction, payload: serde_json::Value) -> Self {
        Self {
            table,
            action,
            payload,
        }
    }
}
