mod config;
mod delivery;
mod domain;
mod repository;
mod telemetry;
mod usecase;

use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::State,
    middleware,
    routing::{any, get, post, put},
    Router,
};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::delivery::http::v1::auth::{login, register};
use crate::delivery::http::v1::locations::{
    create_location, delete_location, get_location, list_locations_by_distance, update_location,
};
use crate::delivery::http::v1::middleware::auth_middleware;
use crate::delivery::http::v1::reviews::{create_review, delete_review, get_review, update_review};
use crate::repository::postgres::{create_pool, PostgresLocationRepository, PostgresUserRepository};
use crate::usecase::auth::AuthUseCase;
use crate::usecase::error::UsecaseError;
use crate::usecase::jwt::JwtService;
use crate::usecase::locations::LocationsUseCase;
use crate::usecase::reviews::ReviewsUseCase;

pub struct AppState {
    pub locations_usecase: LocationsUseCase<PostgresLocationRepository>,
    pub reviews_usecase: ReviewsUseCase<PostgresLocationRepository>,
    pub auth_usecase: AuthUseCase<PostgresUserRepository>,
    pub jwt_service: JwtService,
    pub metrics_handle: PrometheusHandle,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::AppConfig::from_env()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let telemetry_config = telemetry::TelemetryConfig::from(&config);
    let tracer_provider = telemetry::init_tracing(&telemetry_config, env_filter)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {}", e))?;

    tracing::info!(
        telemetry_enabled = config.telemetry_enabled,
        "starting the loc8r service"
    );

    let metrics_handle = PrometheusBuilder::new().install_recorder()?;
    metrics_process::Collector::default().describe();
    tracing::info!("prometheus metrics initialized");

    let pool = create_pool(&config.database_url, config.database_max_connections).await?;
    tracing::info!("database pool created");

    sqlx::migrate!().run(&pool).await?;
    tracing::info!("database migrations applied");

    let location_repository = PostgresLocationRepository::new(pool.clone());
    let user_repository = PostgresUserRepository::new(pool);
    let jwt_service = JwtService::new(config.jwt_secret.clone(), config.jwt_expiry_days);

    let shared_state = Arc::new(AppState {
        locations_usecase: LocationsUseCase::new(
            location_repository.clone(),
            config.geo_default_max_distance_m,
        ),
        reviews_usecase: ReviewsUseCase::new(location_repository),
        auth_usecase: AuthUseCase::new(user_repository, jwt_service.clone()),
        jwt_service,
        metrics_handle,
    });

    let router = router(shared_state, &config.spa_dir);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "loc8r service running");
    axum::serve(listener, router).await?;

    telemetry::shutdown(tracer_provider);

    Ok(())
}

fn router(shared_state: Arc<AppState>, spa_dir: &str) -> Router {
    // Writing reviews requires a bearer token
    let reviews_api = Router::new()
        .route("/api/locations/{locationid}/reviews", post(create_review))
        .route(
            "/api/locations/{locationid}/reviews/{reviewid}",
            put(update_review).delete(delete_review),
        )
        .layer(middleware::from_fn_with_state(
            shared_state.clone(),
            auth_middleware,
        ));

    let public_api = Router::new()
        .route(
            "/api/locations",
            get(list_locations_by_distance).post(create_location),
        )
        .route(
            "/api/locations/{locationid}",
            get(get_location).put(update_location).delete(delete_location),
        )
        .route(
            "/api/locations/{locationid}/reviews/{reviewid}",
            get(get_review),
        )
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login));

    let spa_dir = Path::new(spa_dir);
    let spa = ServeDir::new(spa_dir).fallback(ServeFile::new(spa_dir.join("index.html")));

    Router::new()
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics))
        .merge(reviews_api)
        .merge(public_api)
        .route("/api/{*rest}", any(api_not_found))
        .fallback_service(spa)
        .layer(TraceLayer::new_for_http())
        .with_state(shared_state)
}

async fn metrics(State(state): State<Arc<AppState>>) -> String {
    metrics_process::Collector::default().collect();
    state.metrics_handle.render()
}

#[tracing::instrument]
async fn healthz() -> &'static str {
    "OK"
}

/// Unknown API paths answer with JSON instead of the SPA shell.
async fn api_not_found() -> UsecaseError {
    UsecaseError::NotFound("Resource".to_string())
}
