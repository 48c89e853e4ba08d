mod attendee;
mod company;
mod event;
mod mutation;
mod record;
mod upload;
mod winner;

pub use attendee::Attendee;
pub use company::Company;
pub use event::Event;
pub use mutation::{MutationDraft, MutationRecord};
pub use record::{EntityRecord, SyncMeta, Syncable};
pub use upload::{UploadBlob, UploadMetadata};
pub use winner::Winner;
