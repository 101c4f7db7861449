pub mod store;

pub use store::{MemoryStore, Record, RecordFilter, RecordKind, RecordStore};
