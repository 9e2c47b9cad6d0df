use crate::cli::ServeArgs;
use crate::infra::{AppState, DemoEmptiesSource, DemoScheduleSource, DEFAULT_DEMO_SEED};
use crate::routes::with_recommendation_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use standby_rank::config::AppConfig;
use standby_rank::error::AppError;
use standby_rank::recommend::{RecommendationAssembler, RecommendationService};
use standby_rank::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
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

    let seed = args.demo_seed.unwrap_or(DEFAULT_DEMO_SEED);
    let assembler = RecommendationAssembler::new(config.seat_policy, config.scoring.clone())?;
    let mut service = RecommendationService::new(
        Arc::new(DemoEmptiesSource::new(seed)),
        Arc::new(DemoScheduleSource::new(seed)),
        assembler,
    );
    if let Some(budget_ms) = config.scoring_budget_ms {
        service = service.with_budget(Duration::from_millis(budget_ms));
    }

    let app = with_recommendation_routes(Arc::new(service))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, seed, "standby trip ranker ready");

    axum::serve(listener, app).await?;
    Ok(())
}
