use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Progress marker recorded against each administrative step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    #[default]
    Pending,
    /// Document issued, awaiting signature.
    Printed,
    Done,
    /// Administrative halt. Only legal on the cancellation step.
    Stopped,
}

impl StepStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Printed => "Printed (awaiting signature)",
            Self::Done => "Done",
            Self::Stopped => "Stopped",
        }
    }

    /// Position on the `Pending -> Printed -> Done` track. `Stopped` sits past the end.
    pub(crate) const fn rank(self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Printed => 1,
            Self::Done => 2,
            Self::Stopped => 3,
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Stopped)
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStep {
    Correspondence,
    FinancialSettlement,
    Cancellation,
}

impl WorkflowStep {
    pub const fn ordered() -> [Self; 3] {
        [
            Self::Correspondence,
            Self::FinancialSettlement,
            Self::Cancellation,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Correspondence => "correspondence",
            Self::FinancialSettlement => "financial_settlement",
            Self::Cancellation => "cancellation",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Correspondence => "Correspondence",
            Self::FinancialSettlement => "Financial Settlement",
            Self::Cancellation => "Cancellation Decision",
        }
    }

    pub const fn allows_stop(self) -> bool {
        matches!(self, Self::Cancellation)
    }
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One stage of the workflow as recorded on the request.
///
/// `book_date` is kept as the raw string the editor supplied so historical
/// records with malformed dates can still be loaded; [`AdministrativeStep::parsed_book_date`]
/// is the only way the workflow reads it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdministrativeStep {
    pub status: StepStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<String>,
}

impl AdministrativeStep {
    pub fn pending() -> Self {
        Self::default()
    }

    pub fn printed() -> Self {
        Self {
            status: StepStatus::Printed,
            ..Self::default()
        }
    }

    pub fn done(book_number: impl Into<String>, book_date: impl Into<String>) -> Self {
        Self {
            status: StepStatus::Done,
            book_number: Some(book_number.into()),
            book_date: Some(book_date.into()),
            stop_reason: None,
        }
    }

    pub fn stopped(reason: impl Into<String>) -> Self {
        Self {
            status: StepStatus::Stopped,
            stop_reason: Some(reason.into()),
            ..Self::default()
        }
    }

    pub fn parsed_book_date(&self) -> Option<NaiveDate> {
        self.book_date.as_deref().and_then(parse_calendar_date)
    }

    /// Drops fields that carry no meaning for the current status.
    pub fn normalized(mut self) -> Self {
        if self.status != StepStatus::Done {
            self.book_number = None;
            self.book_date = None;
        }
        if self.status != StepStatus::Stopped {
            self.stop_reason = None;
        }
        self.book_number = self.book_number.filter(|value| !value.trim().is_empty());
        self.book_date = self.book_date.filter(|value| !value.trim().is_empty());
        self
    }
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp; anything else is treated as absent.
pub fn parse_calendar_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }

    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.date_naive())
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub String);

impl RequestId {
    /// Creation sequence of a register-issued id such as `req-000042`.
    pub fn sequence(&self) -> Option<u64> {
        self.0.strip_prefix("req-")?.parse().ok()
    }
}

/// Ids order by creation sequence, so `req-1000000` follows `req-999999`.
/// Ids without a sequence sort before all issued ones.
impl Ord for RequestId {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.sequence()
            .cmp(&other.sequence())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for RequestId {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One tracked cancellation case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleRequest {
    pub id: RequestId,
    pub applicant_name: String,
    pub vehicle_number: String,
    #[serde(default)]
    pub ownership: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub notes: String,
    pub request_date: NaiveDate,
    /// Captured from the settings at creation time; never rewritten afterwards.
    pub settlement_days: u32,
    #[serde(default)]
    pub correspondence: AdministrativeStep,
    #[serde(default)]
    pub financial_settlement: AdministrativeStep,
    #[serde(default)]
    pub cancellation: AdministrativeStep,
}

impl VehicleRequest {
    pub fn step(&self, step: WorkflowStep) -> &AdministrativeStep {
        match step {
            WorkflowStep::Correspondence => &self.correspondence,
            WorkflowStep::FinancialSettlement => &self.financial_settlement,
            WorkflowStep::Cancellation => &self.cancellation,
        }
    }

    pub fn steps(&self) -> [(WorkflowStep, &AdministrativeStep); 3] {
        WorkflowStep::ordered().map(|step| (step, self.step(step)))
    }

    pub fn final_status(&self) -> FinalStatus {
        match self.cancellation.status {
            StepStatus::Done => FinalStatus::Completed,
            StepStatus::Stopped => FinalStatus::Stopped,
            StepStatus::Pending | StepStatus::Printed => FinalStatus::InProgress,
        }
    }
}

/// Outcome of the cancellation step as shown in reports and exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalStatus {
    Completed,
    Stopped,
    InProgress,
}

impl FinalStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Completed => "Completed",
            Self::Stopped => "Stopped",
            Self::InProgress => "In Progress",
        }
    }
}

/// Notification settings threaded into every status computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationConfig {
    pub notify_before_days: u32,
    pub notify_on_overdue: bool,
    #[serde(default = "default_enable_alerts")]
    pub enable_alerts: bool,
}

fn default_enable_alerts() -> bool {
    true
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            notify_before_days: 3,
            notify_on_overdue: true,
            enable_alerts: true,
        }
    }
}
