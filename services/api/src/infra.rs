use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::warn;
use vehicle_cancellation::workflows::cancellation::{
    AlertError, AlertPublisher, DueDateAlert, RepositoryError, RequestId, RequestRepository,
    VehicleRequest,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryRequestRepository {
    records: Arc<Mutex<HashMap<RequestId, VehicleRequest>>>,
}

impl RequestRepository for InMemoryRequestRepository {
    fn insert(&self, request: VehicleRequest) -> Result<VehicleRequest, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&request.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(request.id.clone(), request.clone());
        Ok(request)
    }

    fn update(&self, request: VehicleRequest) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&request.id) {
            guard.insert(request.id.clone(), request);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &RequestId) -> Result<Option<VehicleRequest>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn delete(&self, id: &RequestId) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard
            .remove(id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    fn list(&self) -> Result<Vec<VehicleRequest>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}

/// Keeps published alerts in memory and mirrors them to the log, standing in
/// for the e-mail relay.
#[derive(Default, Clone)]
pub(crate) struct InMemoryAlertPublisher {
    events: Arc<Mutex<Vec<DueDateAlert>>>,
}

impl AlertPublisher for InMemoryAlertPublisher {
    fn publish(&self, alert: DueDateAlert) -> Result<(), AlertError> {
        warn!(
            request_id = %alert.request_id,
            vehicle = %alert.vehicle_number,
            severity = alert.severity.label(),
            "{}",
            alert.message
        );
        let mut guard = self.events.lock().expect("alert mutex poisoned");
        guard.push(alert);
        Ok(())
    }
}

impl InMemoryAlertPublisher {
    pub(crate) fn events(&self) -> Vec<DueDateAlert> {
        self.events.lock().expect("alert mutex poisoned").clone()
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_reports_offending_value() {
        assert_eq!(
            parse_date(" 2024-05-10 "),
            Ok(NaiveDate::from_ymd_opt(2024, 5, 10).expect("valid date"))
        );
        let err = parse_date("10/05/2024").expect_err("wrong format rejected");
        assert!(err.contains("10/05/2024"));
    }

    #[test]
    fn repository_reports_missing_records() {
        let repository = InMemoryRequestRepository::default();
        let id = RequestId("req-000001".to_string());
        assert!(matches!(
            repository.delete(&id),
            Err(RepositoryError::NotFound)
        ));
        assert!(repository.fetch(&id).expect("fetch works").is_none());
    }
}
