use crate::cli::ServeArgs;
use crate::infra::{build_service, AppState};
use crate::routes::with_absence_routes;
use crate::ticker::spawn_midnight_ticker;
use absence_log::absences::{AbsencePortal, StaticUserDirectory};
use absence_log::config::AppConfig;
use absence_log::error::AppError;
use absence_log::telemetry;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let service = Arc::new(build_service(&config)?);
    let users = Arc::new(StaticUserDirectory::from_config(&config.admin));
    let portal = AbsencePortal::new(service, users);

    let app = with_absence_routes(portal)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let _ticker = spawn_midnight_ticker();
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        absence_log = %config.storage.absence_log.display(),
        mail_enabled = config.mail.is_enabled(),
        "absence log service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
