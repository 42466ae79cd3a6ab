use super::super::domain::{FinalStatus, RequestId, StepStatus};
use super::super::status::{CancellationStats, Milestone, RowStatusKind};
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct RequestRowView {
    pub id: RequestId,
    pub applicant_name: String,
    pub vehicle_number: String,
    pub company: String,
    pub request_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_until_due: Option<i64>,
    pub row_status: RowStatusKind,
    pub row_status_label: &'static str,
    pub latest_step: Milestone,
    pub latest_step_label: &'static str,
    pub latest_step_status: StepStatus,
    pub final_status: FinalStatus,
    pub final_status_label: &'static str,
}

/// Status facts for a single request, as shown on the details page.
#[derive(Debug, Clone, Serialize)]
pub struct RequestStatusView {
    pub id: RequestId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_until_due: Option<i64>,
    pub overdue: bool,
    pub warning: bool,
    pub latest_step: Milestone,
    pub latest_step_label: &'static str,
    pub latest_step_status: StepStatus,
    pub row_status: RowStatusKind,
    pub row_status_label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyLoadEntry {
    pub company: String,
    pub total: usize,
    pub completed: usize,
    pub overdue: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Letterhead {
    pub department_name: String,
    pub section_name: String,
    pub branch_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CancellationReport {
    pub today: NaiveDate,
    pub letterhead: Letterhead,
    pub stats: CancellationStats,
    pub company_breakdown: Vec<CompanyLoadEntry>,
    pub overdue: Vec<RequestRowView>,
    pub warnings: Vec<RequestRowView>,
    pub rows: Vec<RequestRowView>,
}
