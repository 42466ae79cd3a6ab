use std::collections::HashSet;
use std::sync::Mutex;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::domain::{NotificationConfig, RequestId, VehicleRequest};
use super::status::{classify_row, compute_due_date, RowStatusKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    /// Due date is inside the warning window.
    Warning,
    /// Due date has passed with the fee still unpaid.
    Critical,
}

impl AlertSeverity {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Warning => "Warning",
            Self::Critical => "Critical",
        }
    }
}

/// Follow-up notice for a request approaching or past its settlement due date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DueDateAlert {
    pub request_id: RequestId,
    pub applicant_name: String,
    pub vehicle_number: String,
    pub due_date: NaiveDate,
    pub severity: AlertSeverity,
    pub message: String,
}

/// Outbound hook for due-date alerts (e-mail, browser push, log sink).
pub trait AlertPublisher: Send + Sync {
    fn publish(&self, alert: DueDateAlert) -> Result<(), AlertError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    #[error("alert transport unavailable: {0}")]
    Transport(String),
}

/// Remembers which requests have already been alerted so each condition is
/// announced once. Keys are dropped once their condition no longer holds.
#[derive(Debug, Default)]
pub struct DueDateMonitor {
    notified: Mutex<HashSet<(RequestId, AlertSeverity)>>,
}

impl DueDateMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish alerts for every request currently overdue or inside the
    /// warning window that has not been announced yet.
    pub fn sweep<'a, I, P>(
        &self,
        requests: I,
        today: NaiveDate,
        config: &NotificationConfig,
        publisher: &P,
    ) -> Result<Vec<DueDateAlert>, AlertError>
    where
        I: IntoIterator<Item = &'a VehicleRequest>,
        P: AlertPublisher + ?Sized,
    {
        if !config.enable_alerts {
            return Ok(Vec::new());
        }

        let mut published = Vec::new();
        let mut active = HashSet::new();
        for request in requests {
            let Some(alert) = alert_for(request, today, config) else {
                continue;
            };

            let key = (alert.request_id.clone(), alert.severity);
            active.insert(key.clone());
            // Claimed before publishing; a concurrent sweep skips it.
            if !self.claim(&key) {
                continue;
            }

            if let Err(err) = publisher.publish(alert.clone()) {
                self.release(&key);
                warn!(request_id = %alert.request_id, error = %err, "failed to publish due-date alert");
                return Err(err);
            }

            info!(
                request_id = %alert.request_id,
                severity = alert.severity.label(),
                due_date = %alert.due_date,
                "due-date alert published"
            );
            published.push(alert);
        }

        self.retain_active(&active);
        Ok(published)
    }

    /// Drop any memory of alerts for a deleted request.
    pub fn forget(&self, id: &RequestId) {
        self.notified
            .lock()
            .expect("monitor mutex poisoned")
            .retain(|(notified_id, _)| notified_id != id);
    }

    fn claim(&self, key: &(RequestId, AlertSeverity)) -> bool {
        self.notified
            .lock()
            .expect("monitor mutex poisoned")
            .insert(key.clone())
    }

    fn release(&self, key: &(RequestId, AlertSeverity)) {
        self.notified
            .lock()
            .expect("monitor mutex poisoned")
            .remove(key);
    }

    fn retain_active(&self, active: &HashSet<(RequestId, AlertSeverity)>) {
        let mut guard = self.notified.lock().expect("monitor mutex poisoned");
        let before = guard.len();
        guard.retain(|key| active.contains(key));
        let pruned = before - guard.len();
        if pruned > 0 {
            debug!(pruned, "cleared alerts for resolved conditions");
        }
    }

    #[cfg(test)]
    fn remembered(&self) -> usize {
        self.notified.lock().expect("monitor mutex poisoned").len()
    }
}

fn alert_for(
    request: &VehicleRequest,
    today: NaiveDate,
    config: &NotificationConfig,
) -> Option<DueDateAlert> {
    let severity = match classify_row(request, today, config) {
        RowStatusKind::Overdue => AlertSeverity::Critical,
        RowStatusKind::Warning => AlertSeverity::Warning,
        _ => return None,
    };
    let due_date = compute_due_date(&request.correspondence, request.settlement_days)?;

    let message = match severity {
        AlertSeverity::Critical => format!(
            "Financial settlement for vehicle {} was due on {} and is still unpaid",
            request.vehicle_number, due_date
        ),
        AlertSeverity::Warning => format!(
            "Financial settlement for vehicle {} is due on {}",
            request.vehicle_number, due_date
        ),
    };

    Some(DueDateAlert {
        request_id: request.id.clone(),
        applicant_name: request.applicant_name.clone(),
        vehicle_number: request.vehicle_number.clone(),
        due_date,
        severity,
        message,
    })
}
