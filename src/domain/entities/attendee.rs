use super::record::{SyncMeta, Syncable};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attendee {
    pub id: String,
    pub event_id: String,
    pub name: String,
    pub email: Option<String>,
    /// Set by QR check-in.
    pub checked_in: bool,
    pub checked_in_at: Option<i64>,
    pub created_at: i64,
    #[serde(flatten)]
    pub meta: SyncMeta,
}

impl Attendee {
    pub fn new(event_id: String, name: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            event_id,
            name,
            email: None,
            checked_in: false,
            checked_in_at: None,
            created_at: Utc::now().timestamp_millis(),
            meta: SyncMeta::default(),
        }
    }

    pub fn check_in(&mut self) {
        self.checked_in = true;
        self.checked_in_at = Some(Utc::now().timestamp_millis());
        self.meta.mark_pending();
    }
}

impl Syncable for Attendee {
    fn id(&self) -> &str {
        &self.id
    }

    fn meta(&self) -> &SyncMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut SyncMeta {
        &mut self.meta
    }
}
