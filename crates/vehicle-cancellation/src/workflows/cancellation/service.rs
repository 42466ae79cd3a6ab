use std::io::Write;
use std::sync::Arc;

use chrono::NaiveDate;

use super::alerts::{AlertError, AlertPublisher, DueDateAlert, DueDateMonitor};
use super::domain::RequestId;
use super::register::{RegisterError, RequestRegister};
use super::report::{status_view, views::RequestStatusView, CancellationReport};
use super::report::{export_csv, ExportError, ExportOptions};
use super::repository::RequestRepository;
use super::settings::{SettingsError, SettingsStore};
use crate::directory::{CompanyDirectory, DirectoryError, UserDirectory};

/// Service composing the request register, reference directories, settings,
/// and due-date alerting behind one handle shared by the HTTP routes and CLI.
pub struct CancellationService<R, A> {
    register: RequestRegister<R>,
    settings: Arc<SettingsStore>,
    companies: Arc<CompanyDirectory>,
    users: Arc<UserDirectory>,
    monitor: DueDateMonitor,
    alerts: Arc<A>,
}

impl<R, A> CancellationService<R, A>
where
    R: RequestRepository + 'static,
    A: AlertPublisher + 'static,
{
    pub fn new(repository: Arc<R>, alerts: Arc<A>, settings: Arc<SettingsStore>) -> Self {
        Self::with_directories(
            repository,
            alerts,
            settings,
            Arc::new(CompanyDirectory::new()),
            Arc::new(UserDirectory::new()),
        )
    }

    pub fn with_directories(
        repository: Arc<R>,
        alerts: Arc<A>,
        settings: Arc<SettingsStore>,
        companies: Arc<CompanyDirectory>,
        users: Arc<UserDirectory>,
    ) -> Self {
        Self {
            register: RequestRegister::new(repository, settings.clone()),
            settings,
            companies,
            users,
            monitor: DueDateMonitor::new(),
            alerts,
        }
    }

    pub fn register(&self) -> &RequestRegister<R> {
        &self.register
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn companies(&self) -> &CompanyDirectory {
        &self.companies
    }

    pub fn users(&self) -> &UserDirectory {
        &self.users
    }

    /// Delete a request and forget any alerts already sent for it.
    pub fn delete_request(&self, id: &RequestId) -> Result<(), ServiceError> {
        self.register.delete(id)?;
        self.monitor.forget(id);
        Ok(())
    }

    pub fn request_status(
        &self,
        id: &RequestId,
        today: NaiveDate,
    ) -> Result<RequestStatusView, ServiceError> {
        let request = self.register.get(id)?;
        Ok(status_view(&request, today, &self.settings.snapshot()))
    }

    pub fn report(&self, today: NaiveDate) -> Result<CancellationReport, ServiceError> {
        let requests = self.register.all()?;
        Ok(CancellationReport::build(
            &requests,
            today,
            &self.settings.snapshot(),
        ))
    }

    pub fn export<W: Write>(
        &self,
        writer: W,
        options: ExportOptions,
    ) -> Result<usize, ServiceError> {
        let requests = self.register.all()?;
        Ok(export_csv(&requests, writer, options)?)
    }

    pub fn sweep_alerts(&self, today: NaiveDate) -> Result<Vec<DueDateAlert>, ServiceError> {
        let requests = self.register.all()?;
        let config = self.settings.notifications();
        Ok(self
            .monitor
            .sweep(&requests, today, &config, self.alerts.as_ref())?)
    }
}

/// Error raised by the cancellation service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Register(#[from] RegisterError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Alert(#[from] AlertError),
}
