use crate::absences::departments::DepartmentOrderError;
use crate::absences::notify::NotifyError;
use crate::absences::service::AbsenceServiceError;
use crate::absences::store::StoreError;
use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;
use tracing::error;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Departments(DepartmentOrderError),
    Absence(AbsenceServiceError),
    Unauthorized,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Absence(AbsenceServiceError::Submission(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Absence(AbsenceServiceError::Notify(NotifyError::Address { .. })) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Absence(AbsenceServiceError::Notify(NotifyError::NotConfigured)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Absence(AbsenceServiceError::Notify(_)) => StatusCode::BAD_GATEWAY,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Departments(_)
            | AppError::Absence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Departments(err) => write!(f, "department list error: {}", err),
            AppError::Absence(err) => write!(f, "{}", err),
            AppError::Unauthorized => write!(f, "login required"),
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
            AppError::Departments(err) => Some(err),
            AppError::Absence(err) => Some(err),
            AppError::Unauthorized => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }

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

impl From<DepartmentOrderError> for AppError {
    fn from(value: DepartmentOrderError) -> Self {
        Self::Departments(value)
    }
}

impl From<AbsenceServiceError> for AppError {
    fn from(value: AbsenceServiceError) -> Self {
        Self::Absence(value)
    }
}

impl From<StoreError> for AppError {
    fn from(value: StoreError) -> Self {
        Self::Absence(AbsenceServiceError::Store(value))
    }
}
