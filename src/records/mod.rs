//! Saved weather records: persistence, create/update flows and export

pub mod export;
pub mod service;
pub mod store;

pub use export::ExportFormat;
pub use service::{RecordService, validate_record_payload};
pub use store::RecordStore;
