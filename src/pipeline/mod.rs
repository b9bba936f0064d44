pub mod sync;

pub use sync::{FailedRecord, Session, SyncPipeline, SyncReport};
