//! tally-store: durable feedback storage (atomic JSON file) and CSV export

pub mod export;
pub mod json_file;

pub use export::{export_history_csv, write_history_csv};
pub use json_file::JsonFileStore;
