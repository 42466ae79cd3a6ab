//! Credential-cancellation tracking: the three administrative steps of each
//! request, the due-date engine deriving overdue and warning states, and the
//! register, reporting, and alerting built on top of it.

pub mod alerts;
pub mod domain;
pub mod import;
pub mod register;
pub mod report;
pub mod repository;
pub mod router;
pub mod service;
pub mod settings;
pub mod status;
pub mod validation;

pub use alerts::{AlertError, AlertPublisher, AlertSeverity, DueDateAlert, DueDateMonitor};
pub use domain::{
    AdministrativeStep, FinalStatus, NotificationConfig, RequestId, StepStatus, VehicleRequest,
    WorkflowStep,
};
pub use import::{ImportError, RequestImporter};
pub use register::{RegisterError, RequestFilter, RequestRegister, StatusFilter};
pub use report::{export_csv, CancellationReport, ExportError, ExportOptions};
pub use repository::{RepositoryError, RequestRepository};
pub use router::cancellation_router;
pub use service::{CancellationService, ServiceError};
pub use settings::{SettingsError, SettingsStore, SystemSettings};
pub use status::{
    aggregate_stats, classify_row, compute_due_date, days_until_due, is_in_warning_window,
    is_overdue, latest_active_step, CancellationStats, RowStatusKind,
};
pub use validation::{RequestDraft, RequestValidationError};
