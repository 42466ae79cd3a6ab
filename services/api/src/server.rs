use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryAlertPublisher, InMemoryRequestRepository};
use crate::routes::with_cancellation_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;
use vehicle_cancellation::config::AppConfig;
use vehicle_cancellation::error::AppError;
use vehicle_cancellation::telemetry;
use vehicle_cancellation::workflows::cancellation::{CancellationService, SettingsStore};

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

    let settings = config.workflow.clone().into_settings()?;
    let settlement_days = settings.default_settlement_days;
    let repository = Arc::new(InMemoryRequestRepository::default());
    let alerts = Arc::new(InMemoryAlertPublisher::default());
    let service = Arc::new(CancellationService::new(
        repository,
        alerts,
        Arc::new(SettingsStore::new(settings)),
    ));

    let app = with_cancellation_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, settlement_days, "cancellation tracker ready");

    axum::serve(listener, app).await?;
    Ok(())
}
