//! Status derivation and due-date rules.
//!
//! Every function here is a total, deterministic function of its arguments.
//! Callers pass the evaluation day explicitly; nothing in this module reads a
//! clock, and malformed book dates degrade to "not computable" instead of
//! failing.

use super::domain::{
    AdministrativeStep, NotificationConfig, StepStatus, VehicleRequest, WorkflowStep,
};
use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

/// Bucket used for requests that carry no company name.
pub const UNSPECIFIED_COMPANY: &str = "unspecified";

/// Due date for the financial settlement: correspondence book date plus the
/// request's settlement window, in calendar days.
pub fn compute_due_date(
    correspondence: &AdministrativeStep,
    settlement_days: u32,
) -> Option<NaiveDate> {
    if correspondence.status != StepStatus::Done {
        return None;
    }

    correspondence
        .parsed_book_date()?
        .checked_add_signed(Duration::days(i64::from(settlement_days)))
}

/// Whole days from `today` until the due date; negative once it has passed.
pub fn days_until_due(request: &VehicleRequest, today: NaiveDate) -> Option<i64> {
    compute_due_date(&request.correspondence, request.settlement_days)
        .map(|due_date| (due_date - today).num_days())
}

pub fn is_overdue(request: &VehicleRequest, today: NaiveDate, notify_on_overdue: bool) -> bool {
    if request.cancellation.status.is_terminal() || !notify_on_overdue {
        return false;
    }

    match compute_due_date(&request.correspondence, request.settlement_days) {
        Some(due_date) => {
            due_date < today && request.financial_settlement.status == StepStatus::Pending
        }
        None => false,
    }
}

pub fn is_in_warning_window(
    request: &VehicleRequest,
    today: NaiveDate,
    notify_before_days: u32,
) -> bool {
    if request.cancellation.status.is_terminal() {
        return false;
    }

    match days_until_due(request, today) {
        Some(diff_days) => {
            (0..=i64::from(notify_before_days)).contains(&diff_days)
                && request.financial_settlement.status == StepStatus::Pending
        }
        None => false,
    }
}

/// Where a request stands in the workflow: either a concrete step or the
/// initial "request registered" state before any step has moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Milestone {
    Request,
    Step(WorkflowStep),
}

impl Milestone {
    pub const fn key(self) -> &'static str {
        match self {
            Self::Request => "request",
            Self::Step(step) => step.key(),
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Request => "Request Registered",
            Self::Step(step) => step.label(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LatestStep {
    pub milestone: Milestone,
    pub status: StepStatus,
}

/// Furthest step that has moved off `Pending`, scanning from the end of the workflow.
pub fn latest_active_step(request: &VehicleRequest) -> LatestStep {
    WorkflowStep::ordered()
        .into_iter()
        .rev()
        .map(|step| (step, request.step(step).status))
        .find(|(_, status)| *status != StepStatus::Pending)
        .map(|(step, status)| LatestStep {
            milestone: Milestone::Step(step),
            status,
        })
        .unwrap_or(LatestStep {
            milestone: Milestone::Request,
            status: StepStatus::Pending,
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowStatusKind {
    Stopped,
    Completed,
    Printed,
    Overdue,
    Warning,
    InProgress,
}

impl RowStatusKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Stopped => "Stopped",
            Self::Completed => "Completed",
            Self::Printed => "Awaiting Signature",
            Self::Overdue => "Overdue",
            Self::Warning => "Due Soon",
            Self::InProgress => "In Progress",
        }
    }
}

pub fn classify_row(
    request: &VehicleRequest,
    today: NaiveDate,
    config: &NotificationConfig,
) -> RowStatusKind {
    match request.cancellation.status {
        StepStatus::Stopped => return RowStatusKind::Stopped,
        StepStatus::Done => return RowStatusKind::Completed,
        StepStatus::Pending | StepStatus::Printed => {}
    }

    if latest_active_step(request).status == StepStatus::Printed {
        RowStatusKind::Printed
    } else if is_overdue(request, today, config.notify_on_overdue) {
        RowStatusKind::Overdue
    } else if is_in_warning_window(request, today, config.notify_before_days) {
        RowStatusKind::Warning
    } else {
        RowStatusKind::InProgress
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CancellationStats {
    pub total: usize,
    pub completed: usize,
    pub stopped: usize,
    pub pending: usize,
    pub overdue_count: usize,
    pub warning_count: usize,
    pub financial_collected: usize,
    pub completion_rate_pct: u8,
    pub by_company: BTreeMap<String, usize>,
}

/// Company bucket a request is counted under.
pub fn company_bucket(company: &str) -> &str {
    let trimmed = company.trim();
    if trimmed.is_empty() {
        UNSPECIFIED_COMPANY
    } else {
        trimmed
    }
}

pub fn aggregate_stats<'a, I>(
    requests: I,
    today: NaiveDate,
    config: &NotificationConfig,
) -> CancellationStats
where
    I: IntoIterator<Item = &'a VehicleRequest>,
{
    let mut stats = requests
        .into_iter()
        .fold(CancellationStats::default(), |mut stats, request| {
            stats.total += 1;
            match request.cancellation.status {
                StepStatus::Done => stats.completed += 1,
                StepStatus::Stopped => stats.stopped += 1,
                StepStatus::Pending | StepStatus::Printed => {}
            }
            if request.financial_settlement.status == StepStatus::Done {
                stats.financial_collected += 1;
            }
            if is_overdue(request, today, config.notify_on_overdue) {
                stats.overdue_count += 1;
            }
            if is_in_warning_window(request, today, config.notify_before_days) {
                stats.warning_count += 1;
            }
            *stats
                .by_company
                .entry(company_bucket(&request.company).to_string())
                .or_default() += 1;
            stats
        });

    stats.pending = stats.total - stats.completed - stats.stopped;
    stats.completion_rate_pct = completion_rate(stats.completed, stats.total);
    stats
}

fn completion_rate(completed: usize, total: usize) -> u8 {
    let pct = (completed as f64 / total.max(1) as f64 * 100.0).round();
    pct.clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::cancellation::domain::RequestId;

    fn date(raw: &str) -> NaiveDate {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").expect("valid test date")
    }

    fn request_with(correspondence: AdministrativeStep) -> VehicleRequest {
        VehicleRequest {
            id: RequestId("req-000001".to_string()),
            applicant_name: "Mohammed Ahmed".to_string(),
            vehicle_number: "ABC 1234".to_string(),
            ownership: "Private".to_string(),
            company: "National Transport Co.".to_string(),
            notes: String::new(),
            request_date: date("2024-04-01"),
            settlement_days: 15,
            correspondence,
            financial_settlement: AdministrativeStep::pending(),
            cancellation: AdministrativeStep::pending(),
        }
    }

    #[test]
    fn due_date_requires_done_correspondence_with_valid_date() {
        assert_eq!(compute_due_date(&AdministrativeStep::printed(), 15), None);
        assert_eq!(
            compute_due_date(&AdministrativeStep::done("M/1", "not a date"), 15),
            None
        );
        let missing_date = AdministrativeStep {
            book_date: None,
            ..AdministrativeStep::done("M/1", "")
        };
        assert_eq!(compute_due_date(&missing_date, 15), None);
        assert_eq!(
            compute_due_date(&AdministrativeStep::done("M/1", "2024-04-10"), 15),
            Some(date("2024-04-25"))
        );
    }

    #[test]
    fn due_date_crosses_month_and_leap_day_boundaries() {
        let step = AdministrativeStep::done("M/1", "2024-02-20");
        assert_eq!(compute_due_date(&step, 10), Some(date("2024-03-01")));
        assert_eq!(compute_due_date(&step, 0), Some(date("2024-02-20")));
    }

    #[test]
    fn due_today_is_warning_not_overdue() {
        let request = request_with(AdministrativeStep::done("M/1", "2024-04-10"));
        let today = date("2024-04-25");
        assert!(!is_overdue(&request, today, true));
        assert!(is_in_warning_window(&request, today, 0));
        assert_eq!(days_until_due(&request, today), Some(0));
    }

    #[test]
    fn overdue_suppressed_when_notifications_disabled() {
        let request = request_with(AdministrativeStep::done("M/1", "2024-04-10"));
        let today = date("2024-05-10");
        assert!(is_overdue(&request, today, true));
        assert!(!is_overdue(&request, today, false));

        let config = NotificationConfig {
            notify_on_overdue: false,
            ..NotificationConfig::default()
        };
        assert_eq!(
            classify_row(&request, today, &config),
            RowStatusKind::InProgress
        );
    }

    #[test]
    fn printed_settlement_is_neither_overdue_nor_warning() {
        let mut request = request_with(AdministrativeStep::done("M/1", "2024-04-10"));
        request.financial_settlement = AdministrativeStep::printed();
        assert!(!is_overdue(&request, date("2024-05-10"), true));
        assert!(!is_in_warning_window(&request, date("2024-04-24"), 3));
        assert_eq!(
            classify_row(&request, date("2024-05-10"), &NotificationConfig::default()),
            RowStatusKind::Printed
        );
    }

    #[test]
    fn latest_active_step_scans_from_the_end() {
        let mut request = request_with(AdministrativeStep::pending());
        assert_eq!(latest_active_step(&request).milestone, Milestone::Request);
        assert_eq!(latest_active_step(&request).milestone.key(), "request");

        request.correspondence = AdministrativeStep::done("M/1", "2024-04-10");
        request.cancellation = AdministrativeStep::printed();
        let latest = latest_active_step(&request);
        assert_eq!(
            latest.milestone,
            Milestone::Step(WorkflowStep::Cancellation)
        );
        assert_eq!(latest.status, StepStatus::Printed);
    }

    #[test]
    fn completion_rate_rounds_and_handles_empty() {
        assert_eq!(completion_rate(0, 0), 0);
        assert_eq!(completion_rate(1, 3), 33);
        assert_eq!(completion_rate(2, 3), 67);
        assert_eq!(completion_rate(3, 3), 100);
    }

    #[test]
    fn company_bucket_trims_and_falls_back() {
        assert_eq!(company_bucket("  Gulf Motors "), "Gulf Motors");
        assert_eq!(company_bucket(""), UNSPECIFIED_COMPANY);
        assert_eq!(company_bucket("   "), UNSPECIFIED_COMPANY);
    }
}
