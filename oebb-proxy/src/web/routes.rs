//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderName, Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::Utc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::FallbackPolicy;
use crate::coordinator::FetchError;
use crate::domain::{RouteDirection, vienna_now};
use crate::fallback::static_schedule;
use crate::upstream::Transport;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router<T: Transport + 'static>(state: AppState<T>) -> Router {
    Router::new()
        .route("/", get(index).options(preflight))
        .route("/api", get(index).options(preflight))
        .route("/health", get(health).options(preflight))
        .route("/api/trains/:route", get(trains::<T>).options(preflight))
        .fallback(not_found)
        .layer(cors())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Any origin, read-only methods, and the header list browsers send to the
/// deployed frontend.
fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([
            HeaderName::from_static("x-csrf-token"),
            HeaderName::from_static("x-requested-with"),
            header::ACCEPT,
            HeaderName::from_static("accept-version"),
            header::CONTENT_LENGTH,
            HeaderName::from_static("content-md5"),
            header::CONTENT_TYPE,
            header::DATE,
            HeaderName::from_static("x-api-version"),
        ])
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn index() -> Json<IndexResponse> {
    Json(IndexResponse::new())
}

async fn not_found() -> AppError {
    AppError::NotFound {
        message: "not found".to_string(),
    }
}

/// Next departures for one direction.
async fn trains<T: Transport + 'static>(
    State(state): State<AppState<T>>,
    Path(slug): Path<String>,
) -> Result<Json<TrainsResponse>, AppError> {
    let direction = RouteDirection::from_slug(&slug).ok_or_else(|| AppError::NotFound {
        message: format!("unknown route: {slug}"),
    })?;
    info!(%direction, "departures requested");

    match state.coordinator.fetch(direction).await {
        Ok(outcome) => Ok(Json(TrainsResponse::live(direction, outcome, Utc::now()))),
        Err(err @ FetchError::AllSourcesExhausted { .. })
            if state.fallback == FallbackPolicy::StaticSchedule =>
        {
            warn!(%direction, "all sources failed, serving static schedule");
            let trains = static_schedule(direction, &vienna_now());
            Ok(Json(TrainsResponse::static_schedule(&err, trains, Utc::now())))
        }
        Err(err) => Err(err.into()),
    }
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    NotFound { message: String },
    Fetch(FetchError),
}

impl From<FetchError> for AppError {
    fn from(e: FetchError) -> Self {
        AppError::Fetch(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound { message } => {
                (StatusCode::NOT_FOUND, Json(ErrorResponse { error: message })).into_response()
            }
            AppError::Fetch(err) => {
                let status = match err {
                    FetchError::Busy { .. } => StatusCode::SERVICE_UNAVAILABLE,
                    FetchError::AllSourcesExhausted { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                };
                warn!(direction = %err.direction(), %status, error = %err, "fetch failed");
                (status, Json(TrainsResponse::failed(&err, Utc::now()))).into_response()
            }
        }
    }
}
