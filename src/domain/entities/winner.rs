use super::record::{SyncMeta, Syncable};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lucky-draw result tying an attendee to a prize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Winner {
    pub id: String,
    pub event_id: String,
    pub attendee_id: String,
    pub prize: String,
    pub drawn_at: i64,
    pub created_at: i64,
    #[serde(flatten)]
    pub meta: SyncMeta,
}

impl Winner {
    pub fn new(event_id: String, attendee_id: String, prize: String) -> Self {
        let now = Utc::now().timestamp_millis();
        Self {
            id: Uuid::new_v4().to_string(),
            event_id,
            attendee_id,
            prize,
            drawn_at: now,
            created_at: now,
            meta: SyncMeta::default(),
        }
    }
}

impl Syncable for Winner {
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
