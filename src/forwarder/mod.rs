pub mod destination;
pub mod record;

pub use destination::Forwarder;
pub use record::DestinationRecord;
