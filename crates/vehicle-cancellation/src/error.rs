use crate::config::ConfigError;
use crate::directory::DirectoryError;
use crate::telemetry::TelemetryError;
use crate::workflows::cancellation::import::ImportError;
use crate::workflows::cancellation::register::RegisterError;
use crate::workflows::cancellation::report::ExportError;
use crate::workflows::cancellation::repository::RepositoryError;
use crate::workflows::cancellation::service::ServiceError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Import(ImportError),
    Service(ServiceError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Import(err) => write!(f, "import error: {}", err),
            AppError::Service(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Import(err) => Some(err),
            AppError::Service(err) => Some(err),
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Import(_) => StatusCode::BAD_REQUEST,
            AppError::Service(err) => service_status(err),
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn service_status(err: &ServiceError) -> StatusCode {
    match err {
        ServiceError::Register(RegisterError::Validation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
        ServiceError::Register(RegisterError::Repository(RepositoryError::NotFound)) => {
            StatusCode::NOT_FOUND
        }
        ServiceError::Register(RegisterError::Repository(RepositoryError::Conflict)) => {
            StatusCode::CONFLICT
        }
        ServiceError::Register(RegisterError::Repository(RepositoryError::Unavailable(_))) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        ServiceError::Directory(DirectoryError::NotFound(_)) => StatusCode::NOT_FOUND,
        ServiceError::Directory(
            DirectoryError::DuplicateCompany(_)
            | DirectoryError::DuplicateUsername(_)
            | DirectoryError::LastFullPrivilegeUser,
        ) => StatusCode::CONFLICT,
        ServiceError::Directory(DirectoryError::BlankField(_)) | ServiceError::Settings(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ServiceError::Export(ExportError::NoRecords) => StatusCode::NOT_FOUND,
        ServiceError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        ServiceError::Alert(_) => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<ImportError> for AppError {
    fn from(value: ImportError) -> Self {
        Self::Import(value)
    }
}

impl From<ServiceError> for AppError {
    fn from(value: ServiceError) -> Self {
        Self::Service(value)
    }
}

impl From<RegisterError> for AppError {
    fn from(value: RegisterError) -> Self {
        Self::Service(value.into())
    }
}

impl From<DirectoryError> for AppError {
    fn from(value: DirectoryError) -> Self {
        Self::Service(value.into())
    }
}

impl From<ExportError> for AppError {
    fn from(value: ExportError) -> Self {
        Self::Service(value.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::cancellation::alerts::AlertError;

    #[test]
    fn errors_map_to_http_status() {
        let missing: AppError = RegisterError::Repository(RepositoryError::NotFound).into();
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);

        let empty: AppError = ExportError::NoRecords.into();
        assert_eq!(empty.status_code(), StatusCode::NOT_FOUND);

        let clash: AppError = RegisterError::Repository(RepositoryError::Conflict).into();
        assert_eq!(clash.status_code(), StatusCode::CONFLICT);

        let duplicate: AppError = DirectoryError::DuplicateCompany("Gulf Motors".into()).into();
        assert_eq!(duplicate.status_code(), StatusCode::CONFLICT);

        let last_admin: AppError = DirectoryError::LastFullPrivilegeUser.into();
        assert_eq!(last_admin.status_code(), StatusCode::CONFLICT);

        let blank: AppError = DirectoryError::BlankField("company name").into();
        assert_eq!(blank.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

        let offline = AppError::Service(AlertError::Transport("smtp offline".into()).into());
        assert_eq!(offline.status_code(), StatusCode::BAD_GATEWAY);

        let port: AppError = ConfigError::InvalidPort.into();
        assert_eq!(port.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            port.to_string(),
            "configuration error: APP_PORT must be a valid u16"
        );
    }
}
