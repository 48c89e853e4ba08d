mod entity_table;
mod mode;
mod mutation_action;
mod sync_phase;
mod sync_status;

pub use entity_table::EntityTable;
pub use mode::Mode;
pub use mutation_action::MutationAction;
pub use sync_phase::SyncPhase;
pub use sync_status::SyncStatus;
