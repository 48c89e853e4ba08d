use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of write a queued mutation carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationAction {
    Create,
    Update,
    Delete,
}

impl MutationAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationAction::Create => "create",
            MutationAction::Update => "update",
            MutationAction::Delete => "delete",
        }
    }
}

impl fmt::Display for MutationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for MutationAction {
    fn from(value: &str) -> Self {
        match value {
            "update" => MutationAction::Update,
            "delete" => MutationAction::Delete,
            _ => MutationAction::Create,
        }
    }
}
