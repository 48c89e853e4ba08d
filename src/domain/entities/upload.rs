use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Base64 gallery/QR payload owned by an event or company record.
/// Local-only; uploads do not participate in reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadBlob {
    pub id: String,
    pub owner_table: String,
    pub owner_id: String,
    pub content_base64: String,
    pub created_at: i64,
}

impl UploadBlob {
    pub fn new(owner_table: String, owner_id: String, content_base64: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            owner_table,
            owner_id,
            content_base64,
            created_at: Utc::now().timestamp_millis(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadMetadata {
    pub id: String,
    pub owner_id: String,
    pub file_name: String,
    pub content_type: Option<String>,
    pub size_bytes: i64,
    pub created_at: i64,
}

impl UploadMetadata {
    pub fn new(owner_id: String, file_name: String, size_bytes: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            owner_id,
            file_name,
            content_type: None,
            size_bytes,
            created_at: Utc::now().timestamp_millis(),
        }
    }
}
