mod config;
mod dialogs;

use axum::{
    Router,
    extract::{Path, State},
    http::{HeaderValue, Request, StatusCode},
    middleware::{Next, from_fn},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use booking_flow::{
    AlwaysValidAddresses, BookingError, BookingSession, CancelRequest, FeeDecision, FlowRunner,
    FlowStatus, InMemoryReservationStore, InMemorySessionStorage, RecordingPenaltyCharger,
    Service, Step, StepInput,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{Instrument, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use crate::dialogs::{Dialog, dialog_for};

#[derive(Clone)]
struct AppState {
    runner: FlowRunner,
}

#[derive(Debug, Serialize)]
struct CommandResponse {
    session_id: String,
    step: Step,
    response: Option<String>,
    status: FlowStatus,
}

#[derive(Debug, Serialize)]
struct RetreatResponse {
    session_id: String,
    step: Step,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    dialog: Option<Dialog>,
}

struct ApiError(BookingError);

impl From<BookingError> for ApiError {
    fn from(err: BookingError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            BookingError::Validation { .. }
            | BookingError::InvalidCount { .. }
            | BookingError::TimeConstraint(_)
            | BookingError::UnknownService(_) => StatusCode::BAD_REQUEST,
            BookingError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            BookingError::NoHistory | BookingError::TerminalState => StatusCode::CONFLICT,
            BookingError::Persistence(_) => StatusCode::BAD_GATEWAY,
        };
        let dialog = match &self.0 {
            BookingError::TimeConstraint(rejection) => Some(dialog_for(rejection)),
            _ => None,
        };
        let body = ErrorBody {
            error: self.0.to_string(),
            dialog,
        };
        (status, Json(body)).into_response()
    }
}

/// Initialize structured JSON tracing based on environment variables
fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "booking_service=debug,booking_flow=debug,tower_http=debug".into());

    match log_format.as_str() {
        "pretty" => {
            // Human-readable logging for development
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        _ => {
            // Structured JSON logging for production
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_level(true),
                )
                .init();
        }
    }
}

/// Middleware to add correlation ID to all requests
async fn correlation_id_middleware(
    mut request: Request<axum::body::Body>,
    next: Next,
) -> axum::response::Response {
    let correlation_id = Uuid::new_v4().to_string();

    request.headers_mut().insert(
        "x-correlation-id",
        HeaderValue::from_str(&correlation_id).unwrap(),
    );

    let span = tracing::info_span!("http_request", correlation_id = %correlation_id);

    next.run(request).instrument(span).await
}

#[tokio::main]
async fn main() {
    init_tracing();

    let config = match config::load() {
        Ok(config) => config,
        Err(e) => {
            error!("failed to load configuration: {e:#}");
            std::process::exit(1);
        }
    };

    // demo collaborators; deployments wire real implementations of the
    // ReservationStore / AddressVerifier / PenaltyCharger traits here
    let runner = FlowRunner::new(
        Arc::new(InMemorySessionStorage::new()),
        Arc::new(config.catalog),
        Arc::new(config.price_table),
        config.time_rules,
        Arc::new(InMemoryReservationStore::new()),
        Arc::new(RecordingPenaltyCharger::new()),
    )
    .with_address_verifier(Arc::new(AlwaysValidAddresses));

    let app_state = AppState { runner };

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/services", get(list_services))
        .route("/bookings", post(create_booking))
        .route("/bookings/{id}", get(get_booking).delete(abandon_booking))
        .route("/bookings/{id}/advance", post(advance_booking))
        .route("/bookings/{id}/retreat", post(retreat_booking))
        .route("/bookings/{id}/cancel", post(cancel_booking))
        .layer(from_fn(correlation_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();

    info!("Server running on http://0.0.0.0:3000");

    axum::serve(listener, app).await.unwrap();
}

async fn health_check() -> &'static str {
    "OK"
}

async fn list_services(State(state): State<AppState>) -> Json<Vec<Service>> {
    Json(state.runner.catalog().services().to_vec())
}

async fn create_booking(State(state): State<AppState>) -> Result<Json<CommandResponse>, ApiError> {
    let session = state.runner.create_session().await?;
    info!(session_id = %session.id, "booking flow started");
    Ok(Json(CommandResponse {
        session_id: session.id,
        step: session.current_step,
        response: None,
        status: FlowStatus::WaitingForInput,
    }))
}

async fn advance_booking(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(input): Json<StepInput>,
) -> Result<Json<CommandResponse>, ApiError> {
    let outcome = state.runner.advance(&session_id, input).await?;
    info!(
        session_id = %session_id,
        step = %outcome.step,
        "advance applied"
    );
    Ok(Json(CommandResponse {
        session_id,
        step: outcome.step,
        response: outcome.response,
        status: outcome.status,
    }))
}

async fn retreat_booking(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<RetreatResponse>, ApiError> {
    let step = state.runner.retreat(&session_id).await?;
    info!(session_id = %session_id, step = %step, "retreat applied");
    Ok(Json(RetreatResponse { session_id, step }))
}

async fn get_booking(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<BookingSession>, ApiError> {
    Ok(Json(state.runner.session(&session_id).await?))
}

async fn abandon_booking(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    // nothing persisted outside storage mid-flow, so this is a plain drop
    state.runner.abandon(&session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn cancel_booking(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<CancelRequest>,
) -> Result<Json<FeeDecision>, ApiError> {
    let decision = state.runner.cancel(&session_id, request).await?;
    info!(
        session_id = %session_id,
        fee = %decision.fee_amount,
        auto_charge = decision.requires_auto_charge,
        "cancellation processed"
    );
    Ok(Json(decision))
}
