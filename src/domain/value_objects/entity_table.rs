use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of entity tables the engine synchronizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityTable {
    Events,
    Attendees,
    Winners,
    Companies,
}

impl EntityTable {
    /// The order a full reconciliation pass walks the tables in. No
    /// cross-table ordering is guaranteed beyond that.
    pub const ALL: [EntityTable; 4] = [
        EntityTable::Events,
        EntityTable::Attendees,
        EntityTable::Winners,
        EntityTable::Companies,
    ];

    /// SQL table name. The enum is closed, so this is safe to interpolate
    /// into query strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityTable::Events => "events",
            EntityTable::Attendees => "attendees",
            EntityTable::Winners => "winners",
            EntityTable::Companies => "companies",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "events" => Some(EntityTable::Events),
            "attendees" => Some(EntityTable::Attendees),
            "winners" => Some(EntityTable::Winners),
            "companies" => Some(EntityTable::Companies),
            _ => None,
        }
    }
}

impl fmt::Display for EntityTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
