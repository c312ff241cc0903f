use absence_log::absences::{
    AbsenceService, CsvRecordStore, DepartmentOrder, DisabledNotifier, ReportNotifier,
    SmtpNotifier,
};
use absence_log::config::AppConfig;
use absence_log::error::AppError;
use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type CsvAbsenceService = AbsenceService<CsvRecordStore, dyn ReportNotifier>;

pub(crate) fn department_order(config: &AppConfig) -> Result<DepartmentOrder, AppError> {
    match &config.storage.departments_file {
        Some(path) => {
            let order = DepartmentOrder::from_path(path)?;
            info!(path = %path.display(), departments = order.len(), "loaded department order");
            Ok(order)
        }
        None => Ok(DepartmentOrder::standard()),
    }
}

pub(crate) fn notifier(config: &AppConfig) -> Arc<dyn ReportNotifier> {
    if !config.mail.is_enabled() {
        info!("smtp credentials missing; e-mail delivery disabled");
        return Arc::new(DisabledNotifier);
    }

    match SmtpNotifier::from_config(&config.mail) {
        Ok(notifier) => Arc::new(notifier),
        Err(err) => {
            warn!(error = %err, "smtp notifier unavailable; e-mail delivery disabled");
            Arc::new(DisabledNotifier)
        }
    }
}

/// Opens the configured absence log (creating it if needed) and wires the service.
pub(crate) fn build_service(config: &AppConfig) -> Result<CsvAbsenceService, AppError> {
    let store = CsvRecordStore::open(&config.storage.absence_log)?;
    let order = department_order(config)?;
    Ok(AbsenceService::new(
        Arc::new(store),
        notifier(config),
        order,
    ))
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
