use std::sync::Arc;

use anyhow::{Error, Result};
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    clients::{health::HealthChecker, rbmq::AmqpSink},
    config::Config,
    dispatcher::Dispatcher,
    handlers,
    models::{alert::AlertEvent, event::AuthEvent, health::{CheckStatus, HealthReport}},
    publisher::Publisher,
    worker::process_event,
};

pub struct AppState {
    dispatcher: Arc<Dispatcher>,
    publisher: Arc<Publisher<AmqpSink>>,
    health_checker: HealthChecker,
}

pub async fn run_api_server(
    config: Config,
    dispatcher: Arc<Dispatcher>,
    publisher: Arc<Publisher<AmqpSink>>,
) -> Result<(), Error> {
    let state = Arc::new(AppState {
        dispatcher,
        publisher,
        health_checker: HealthChecker::new(config.clone()),
    });

    let app = Router::new()
        .route("/actuator/health", get(health))
        .route("/actuator/health/ready", get(health_ready))
        .route("/actuator/health/live", get(health_live))
        .route("/orchestrator/user-created", post(simulate_user_created))
        .route("/orchestrator/user-login", post(simulate_user_login))
        .route("/orchestrator/password-reset", post(simulate_password_reset))
        .route(
            "/orchestrator/password-updated",
            post(simulate_password_updated),
        )
        .route("/orchestrator/alerts", post(receive_alert))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = TcpListener::bind(&addr).await?;

    info!(address = %addr, "API server started");

    axum::serve(listener, app).await?;

    Ok(())
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    report_response(state.health_checker.check_all().await)
}

async fn health_ready(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    report_response(state.health_checker.check_ready().await)
}

async fn health_live(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    report_response(state.health_checker.check_live().await)
}

fn report_response(report: HealthReport) -> impl IntoResponse {
    let status_code = match report.status {
        CheckStatus::Up => StatusCode::OK,
        CheckStatus::Down => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(report))
}

async fn simulate_user_created(
    State(state): State<Arc<AppState>>,
    Json(event): Json<AuthEvent>,
) -> Result<StatusCode, (StatusCode, String)> {
    simulate(&state, "user.created", &event).await
}

async fn simulate_user_login(
    State(state): State<Arc<AppState>>,
    Json(event): Json<AuthEvent>,
) -> Result<StatusCode, (StatusCode, String)> {
    simulate(&state, "user.login", &event).await
}

async fn simulate_password_reset(
    State(state): State<Arc<AppState>>,
    Json(event): Json<AuthEvent>,
) -> Result<StatusCode, (StatusCode, String)> {
    simulate(&state, "password.reset.requested", &event).await
}

async fn simulate_password_updated(
    State(state): State<Arc<AppState>>,
    Json(event): Json<AuthEvent>,
) -> Result<StatusCode, (StatusCode, String)> {
    simulate(&state, "password.updated", &event).await
}

/// Re-invokes the broker dispatch path synchronously. A dispatch failure
/// surfaces to the caller; publish failures stay fire-and-forget.
async fn simulate(
    state: &AppState,
    routing_key: &str,
    event: &AuthEvent,
) -> Result<StatusCode, (StatusCode, String)> {
    match process_event(&state.dispatcher, &state.publisher, routing_key, event).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string())),
    }
}

async fn receive_alert(
    State(state): State<Arc<AppState>>,
    Json(alert): Json<AlertEvent>,
) -> StatusCode {
    if let Some(payload) = handlers::reshape_alert(&alert) {
        state.publisher.publish_alert(&payload).await;
    }

    StatusCode::NO_CONTENT
}
