use super::record::{SyncMeta, Syncable};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: String,
    pub name: String,
    pub contact_email: Option<String>,
    pub created_at: i64,
    #[serde(flatten)]
    pub meta: SyncMeta,
}

impl Company {
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            contact_email: None,
            created_at: Utc::now().timestamp_millis(),
            meta: SyncMeta::default(),
        }
    }
}

impl Syncable for Company {
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
