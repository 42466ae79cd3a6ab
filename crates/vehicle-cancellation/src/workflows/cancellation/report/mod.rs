mod export;
mod summary;
pub mod views;

pub use export::{export_csv, ExportError, ExportOptions};
pub use summary::{row_view, status_view};
pub use views::CancellationReport;
