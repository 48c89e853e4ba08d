use super::{Attendee, Company, Event, Winner};
use crate::domain::value_objects::{EntityTable, SyncStatus};
use serde::{Deserialize, Serialize};

/// Synchronization metadata carried by every entity record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SyncMeta {
    pub sync_status: SyncStatus,
    /// Unix millis of the last successful reconciliation, `None` if never synced.
    pub last_synced: Option<i64>,
    /// True if the record was created while disconnected and has never been
    /// seen by the remote backend.
    pub is_local: bool,
}

impl SyncMeta {
    pub fn mark_synced(&mut self, now: i64) {
        self.sync_status = SyncStatus::Synced;
        self.last_synced = Some(now);
        self.is_local = false;
    }

    pub fn mark_pending(&mut self) {
        self.sync_status = SyncStatus::Pending;
    }

    pub fn mark_error(&mut self) {
        self.sync_status = SyncStatus::Error;
    }
}

/// Shared capability of everything the engine can synchronize.
pub trait Syncable {
    fn id(&self) -> &str;
    fn meta(&self) -> &SyncMeta;
    fn meta_mut(&mut self) -> &mut SyncMeta;
}

/// A business object plus its synchronization metadata.
///
/// A closed sum rather than a table-name-keyed dictionary: the compiler
/// enforces that every variant carries the syncable metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "table", rename_all = "snake_case")]
pub enum EntityRecord {
    Event(Event),
    Attendee(Attendee),
    Winner(Winner),
    Company(Company),
}

impl EntityRecord {
    pub fn table(&self) -> EntityTable {
        match self {
            EntityRecord::Event(_) => EntityTable::Events,
            EntityRecord::Attendee(_) => EntityTable::Attendees,
            EntityRecord::Winner(_) => EntityTable::Winners,
            EntityRecord::Company(_) => EntityTable::Companies,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            EntityRecord::Event(e) => e.id(),
            EntityRecord::Attendee(a) => a.id(),
            EntityRecord::Winner(w) => w.id(),
            EntityRecord::Company(c) => c.id(),
        }
    }

    pub fn meta(&self) -> &SyncMeta {
        match self {
            EntityRecord::Event(e) => e.meta(),
            EntityRecord::Attendee(a) => a.meta(),
            EntityRecord::Winner(w) => w.meta(),
            EntityRecord::Company(c) => c.meta(),
        }
    }

    pub fn meta_mut(&mut self) -> &mut SyncMeta {
        match self {
            EntityRecord::Event(e) => e.meta_mut(),
            EntityRecord::Attendee(a) => a.meta_mut(),
            EntityRecord::Winner(w) => w.meta_mut(),
            EntityRecord::Company(c) => c.meta_mut(),
        }
    }

    /// The secondary lookup field for the owning record, where one exists
    /// (company for events, event for attendees and winners).
    pub fn owner_id(&self) -> Option<&str> {
        match self {
            EntityRecord::Event(e) => e.company_id.as_deref(),
            EntityRecord::Attendee(a) => Some(a.event_id.as_str()),
            EntityRecord::Winner(w) => Some(w.event_id.as_str()),
            EntityRecord::Company(_) => None,
        }
    }

    pub fn created_at(&self) -> i64 {
        match self {
            EntityRecord::Event(e) => e.created_at,
            EntityRecord::Attendee(a) => a.created_at,
            EntityRecord::Winner(w) => w.created_at,
            EntityRecord::Company(c) => c.created_at,
        }
    }

    /// Serializes the inner entity (without the table tag) for storage in a
    /// document column or a queue payload.
    pub fn to_payload(&self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            EntityRecord::Event(e) => serde_json::to_value(e),
            EntityRecord::Attendee(a) => serde_json::to_value(a),
            EntityRecord::Winner(w) => serde_json::to_value(w),
            EntityRecord::Company(c) => serde_json::to_value(c),
        }
    }

    /// Inverse of [`to_payload`](Self::to_payload); the table selects the variant.
    pub fn from_payload(
        table: EntityTable,
        value: serde_json::Value,
    ) -> Result<Self, serde_json::Error> {
        Ok(match table {
            EntityTable::Events => EntityRecord::Event(serde_json::from_value(value)?),
            EntityTable::Attendees => EntityRecord::Attendee(serde_json::from_value(value)?),
            EntityTable::Winners => EntityRecord::Winner(serde_json::from_value(value)?),
            EntityTable::Companies => EntityRecord::Company(serde_json::from_value(value)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_round_trips_through_table_tag() {
        let record = EntityRecord::Event(Event::new("Gala".to_string()));
        let payload = record.to_payload().unwrap();
        let restored = EntityRecord::from_payload(EntityTable::Events, payload).unwrap();
        assert_eq!(record, restored);
    }

    #[test]
    fn owner_id_points_at_the_owning_record() {
        let mut event = Event::new("Expo".to_string());
        event.company_id = Some("c1".to_string());
        assert_eq!(EntityRecord::Event(event).owner_id(), Some("c1"));

        let attendee = Attendee::new("e1".to_string(), "Ada".to_string());
        assert_eq!(EntityRecord::Attendee(attendee).owner_id(), Some("e1"));

        let company = Company::new("Acme".to_string());
        assert_eq!(EntityRecord::Company(company).owner_id(), None);
    }

    #[test]
    fn mark_synced_clears_the_local_flag() {
        let mut meta = SyncMeta {
            is_local: true,
            ..SyncMeta::default()
        };
        meta.mark_synced(42);
        assert_eq!(meta.sync_status, SyncStatus::Synced);
        assert_eq!(meta.last_synced, Some(42));
        assert!(!meta.is_local);
    }
}
