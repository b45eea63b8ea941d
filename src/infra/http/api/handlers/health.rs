use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::application::error::HttpError;
use crate::infra::http::api::state::ApiState;

/// `204` when the database answers, `503` with the error report otherwise.
pub async fn db_health(State(state): State<ApiState>) -> Response {
    match state.health.ping().await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => HttpError::from_error(
            "infra::http::db_health",
            StatusCode::SERVICE_UNAVAILABLE,
            "Database unavailable",
            &err,
        )
        .into_response(),
    }
}
