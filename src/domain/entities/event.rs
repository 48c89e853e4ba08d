use super::record::{SyncMeta, Syncable};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub company_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub venue: Option<String>,
    /// Unix millis.
    pub starts_at: Option<i64>,
    pub ends_at: Option<i64>,
    pub created_at: i64,
    #[serde(flatten)]
    pub meta: SyncMeta,
}

impl Event {
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            company_id: None,
            name,
            description: None,
            venue: None,
            starts_at: None,
            ends_at: None,
            created_at: Utc::now().timestamp_millis(),
            meta: SyncMeta::default(),
        }
    }
}

impl Syncable for Event {
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
