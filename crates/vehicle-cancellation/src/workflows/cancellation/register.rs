use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::domain::{RequestId, StepStatus, VehicleRequest};
use super::repository::{RepositoryError, RequestRepository};
use super::settings::SettingsStore;
use super::validation::{check_transitions, RequestDraft, RequestValidationError};

/// Cancellation-step filter offered by the request list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    All,
    /// Anything not yet completed or stopped.
    Pending,
    Done,
    Stopped,
}

impl StatusFilter {
    fn matches(self, status: StepStatus) -> bool {
        match self {
            Self::All => true,
            Self::Pending => !status.is_terminal(),
            Self::Done => status == StepStatus::Done,
            Self::Stopped => status == StepStatus::Stopped,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestFilter {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub status: StatusFilter,
}

impl RequestFilter {
    pub fn matches(&self, request: &VehicleRequest) -> bool {
        let matches_search = match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let term = term.to_lowercase();
                request.applicant_name.to_lowercase().contains(&term)
                    || request.vehicle_number.to_lowercase().contains(&term)
            }
            _ => true,
        };

        matches_search && self.status.matches(request.cancellation.status)
    }
}

/// Entry point for creating, editing, and removing tracked requests.
pub struct RequestRegister<R> {
    repository: Arc<R>,
    settings: Arc<SettingsStore>,
    sequence: AtomicU64,
}

impl<R> RequestRegister<R>
where
    R: RequestRepository + 'static,
{
    pub fn new(repository: Arc<R>, settings: Arc<SettingsStore>) -> Self {
        Self {
            repository,
            settings,
            sequence: AtomicU64::new(1),
        }
    }

    pub fn settings(&self) -> &Arc<SettingsStore> {
        &self.settings
    }

    /// Register a new request with all defaults applied.
    pub fn create(&self, draft: RequestDraft) -> Result<VehicleRequest, RegisterError> {
        let draft = draft.normalized();
        if let Err(err) = draft.validate() {
            warn!(error = %err, "rejected new request");
            return Err(err.into());
        }

        let id = self.next_request_id()?;
        let settlement_days = self.settings.default_settlement_days();
        let request = into_request(id, settlement_days, draft);

        let stored = self.repository.insert(request)?;
        info!(
            request_id = %stored.id,
            settlement_days = stored.settlement_days,
            "request registered"
        );
        Ok(stored)
    }

    /// Replace the editable fields of an existing request. The id and the
    /// settlement window captured at creation are kept.
    pub fn update(
        &self,
        id: &RequestId,
        draft: RequestDraft,
    ) -> Result<VehicleRequest, RegisterError> {
        let current = self.get(id)?;
        let draft = draft.normalized();

        if let Err(err) = draft
            .validate()
            .and_then(|_| check_transitions(&current, &draft))
        {
            warn!(request_id = %id, error = %err, "rejected request update");
            return Err(err.into());
        }

        let updated = into_request(current.id, current.settlement_days, draft);
        self.repository.update(updated.clone())?;
        info!(
            request_id = %updated.id,
            cancellation = updated.cancellation.status.label(),
            "request updated"
        );
        Ok(updated)
    }

    pub fn delete(&self, id: &RequestId) -> Result<(), RegisterError> {
        self.repository.delete(id)?;
        info!(request_id = %id, "request deleted");
        Ok(())
    }

    pub fn get(&self, id: &RequestId) -> Result<VehicleRequest, RegisterError> {
        let request = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(request)
    }

    /// Matching requests, newest first.
    pub fn list(&self, filter: &RequestFilter) -> Result<Vec<VehicleRequest>, RegisterError> {
        let mut requests: Vec<VehicleRequest> = self
            .repository
            .list()?
            .into_iter()
            .filter(|request| filter.matches(request))
            .collect();
        requests.sort_by(|a, b| b.id.cmp(&a.id));
        debug!(
            matched = requests.len(),
            status = ?filter.status,
            "listed requests"
        );
        Ok(requests)
    }

    pub fn all(&self) -> Result<Vec<VehicleRequest>, RegisterError> {
        self.list(&RequestFilter::default())
    }

    fn next_request_id(&self) -> Result<RequestId, RepositoryError> {
        loop {
            let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
            let candidate = RequestId(format!("req-{seq:06}"));
            if self.repository.fetch(&candidate)?.is_none() {
                return Ok(candidate);
            }
        }
    }
}

fn into_request(id: RequestId, settlement_days: u32, draft: RequestDraft) -> VehicleRequest {
    VehicleRequest {
        id,
        applicant_name: draft.applicant_name,
        vehicle_number: draft.vehicle_number,
        ownership: draft.ownership,
        company: draft.company,
        notes: draft.notes,
        request_date: draft.request_date,
        settlement_days,
        correspondence: draft.correspondence,
        financial_settlement: draft.financial_settlement,
        cancellation: draft.cancellation,
    }
}

/// Error raised by the request register.
#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    #[error(transparent)]
    Validation(#[from] RequestValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
