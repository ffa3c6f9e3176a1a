pub mod schedule_csv;
pub mod summary;

pub use schedule_csv::{load_schedule, write_schedule};
pub use summary::{write_summary_json, RunSummary};
