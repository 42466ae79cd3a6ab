use super::domain::{AdministrativeStep, StepStatus, VehicleRequest, WorkflowStep};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Editable fields of a request as submitted by the entry form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDraft {
    pub applicant_name: String,
    pub vehicle_number: String,
    #[serde(default)]
    pub ownership: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub notes: String,
    pub request_date: NaiveDate,
    #[serde(default)]
    pub correspondence: AdministrativeStep,
    #[serde(default)]
    pub financial_settlement: AdministrativeStep,
    #[serde(default)]
    pub cancellation: AdministrativeStep,
}

impl RequestDraft {
    pub fn new(
        applicant_name: impl Into<String>,
        vehicle_number: impl Into<String>,
        request_date: NaiveDate,
    ) -> Self {
        Self {
            applicant_name: applicant_name.into(),
            vehicle_number: vehicle_number.into(),
            ownership: String::new(),
            company: String::new(),
            notes: String::new(),
            request_date,
            correspondence: AdministrativeStep::pending(),
            financial_settlement: AdministrativeStep::pending(),
            cancellation: AdministrativeStep::pending(),
        }
    }

    pub fn step(&self, step: WorkflowStep) -> &AdministrativeStep {
        match step {
            WorkflowStep::Correspondence => &self.correspondence,
            WorkflowStep::FinancialSettlement => &self.financial_settlement,
            WorkflowStep::Cancellation => &self.cancellation,
        }
    }

    /// Trims free text and strips step fields that do not apply to their status.
    pub fn normalized(self) -> Self {
        Self {
            applicant_name: self.applicant_name.trim().to_string(),
            vehicle_number: self.vehicle_number.trim().to_string(),
            ownership: self.ownership.trim().to_string(),
            company: self.company.trim().to_string(),
            notes: self.notes.trim().to_string(),
            request_date: self.request_date,
            correspondence: self.correspondence.normalized(),
            financial_settlement: self.financial_settlement.normalized(),
            cancellation: self.cancellation.normalized(),
        }
    }

    pub fn validate(&self) -> Result<(), RequestValidationError> {
        if self.applicant_name.trim().is_empty() {
            return Err(RequestValidationError::MissingApplicantName);
        }
        if self.vehicle_number.trim().is_empty() {
            return Err(RequestValidationError::MissingVehicleNumber);
        }

        for step in WorkflowStep::ordered() {
            let recorded = self.step(step);
            match recorded.status {
                StepStatus::Stopped if !step.allows_stop() => {
                    return Err(RequestValidationError::StopNotAllowed(step));
                }
                StepStatus::Stopped => {
                    let has_reason = recorded
                        .stop_reason
                        .as_deref()
                        .is_some_and(|reason| !reason.trim().is_empty());
                    if !has_reason {
                        return Err(RequestValidationError::MissingStopReason);
                    }
                }
                StepStatus::Done => {
                    if let Some(raw) = recorded
                        .book_date
                        .as_deref()
                        .filter(|raw| !raw.trim().is_empty())
                    {
                        if recorded.parsed_book_date().is_none() {
                            return Err(RequestValidationError::InvalidBookDate {
                                step,
                                value: raw.to_string(),
                            });
                        }
                    }
                }
                StepStatus::Pending | StepStatus::Printed => {}
            }
        }

        Ok(())
    }
}

/// Checks that every step of `draft` is reachable from the stored request.
pub fn check_transitions(
    current: &VehicleRequest,
    draft: &RequestDraft,
) -> Result<(), RequestValidationError> {
    for step in WorkflowStep::ordered() {
        check_transition(step, current.step(step).status, draft.step(step).status)?;
    }
    Ok(())
}

fn check_transition(
    step: WorkflowStep,
    from: StepStatus,
    to: StepStatus,
) -> Result<(), RequestValidationError> {
    let allowed = match (from, to) {
        _ if from == to => true,
        (StepStatus::Stopped, _) => false,
        (_, StepStatus::Stopped) => step.allows_stop(),
        _ => to.rank() > from.rank(),
    };

    if allowed {
        Ok(())
    } else {
        Err(RequestValidationError::StepRegression { step, from, to })
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RequestValidationError {
    #[error("applicant name is required")]
    MissingApplicantName,
    #[error("vehicle number is required")]
    MissingVehicleNumber,
    #[error("{0} cannot be stopped; only the cancellation decision may halt a request")]
    StopNotAllowed(WorkflowStep),
    #[error("a stop reason is required when the cancellation decision is stopped")]
    MissingStopReason,
    #[error("{step} book date '{value}' is not a valid calendar date")]
    InvalidBookDate { step: WorkflowStep, value: String },
    #[error("{step} cannot move from '{from}' to '{to}'")]
    StepRegression {
        step: WorkflowStep,
        from: StepStatus,
        to: StepStatus,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> RequestDraft {
        RequestDraft::new(
            "Fatima Hassan",
            "DEF 5678",
            NaiveDate::from_ymd_opt(2024, 5, 15).expect("valid date"),
        )
    }

    #[test]
    fn blank_identity_fields_are_rejected() {
        let mut missing_name = draft();
        missing_name.applicant_name = "   ".to_string();
        assert_eq!(
            missing_name.validate(),
            Err(RequestValidationError::MissingApplicantName)
        );

        let mut missing_vehicle = draft();
        missing_vehicle.vehicle_number.clear();
        assert_eq!(
            missing_vehicle.validate(),
            Err(RequestValidationError::MissingVehicleNumber)
        );
    }

    #[test]
    fn only_cancellation_may_be_stopped() {
        let mut stopped_payment = draft();
        stopped_payment.financial_settlement = AdministrativeStep::stopped("fee waived");
        assert_eq!(
            stopped_payment.validate(),
            Err(RequestValidationError::StopNotAllowed(
                WorkflowStep::FinancialSettlement
            ))
        );

        let mut stopped_decision = draft();
        stopped_decision.cancellation = AdministrativeStep::stopped("court order");
        assert_eq!(stopped_decision.validate(), Ok(()));
    }

    #[test]
    fn stopping_requires_a_reason() {
        let mut stopped = draft();
        stopped.cancellation = AdministrativeStep::stopped("  ");
        assert_eq!(
            stopped.validate(),
            Err(RequestValidationError::MissingStopReason)
        );
    }

    #[test]
    fn malformed_book_date_is_rejected_at_entry() {
        let mut bad_date = draft();
        bad_date.correspondence = AdministrativeStep::done("M/1", "2024-13-40");
        assert_eq!(
            bad_date.validate(),
            Err(RequestValidationError::InvalidBookDate {
                step: WorkflowStep::Correspondence,
                value: "2024-13-40".to_string(),
            })
        );
    }

    #[test]
    fn transitions_are_monotonic_and_stop_is_terminal() {
        let c = WorkflowStep::Correspondence;
        let d = WorkflowStep::Cancellation;
        assert!(check_transition(c, StepStatus::Pending, StepStatus::Done).is_ok());
        assert!(check_transition(c, StepStatus::Printed, StepStatus::Printed).is_ok());
        assert!(check_transition(c, StepStatus::Done, StepStatus::Printed).is_err());
        assert!(check_transition(c, StepStatus::Pending, StepStatus::Stopped).is_err());
        assert!(check_transition(d, StepStatus::Done, StepStatus::Stopped).is_ok());
        assert!(check_transition(d, StepStatus::Stopped, StepStatus::Done).is_err());

        let err = check_transition(c, StepStatus::Done, StepStatus::Pending)
            .expect_err("regression rejected");
        assert_eq!(
            err.to_string(),
            "Correspondence cannot move from 'Done' to 'Pending'"
        );
    }
}
