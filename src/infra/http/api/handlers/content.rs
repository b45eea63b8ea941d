//! Singleton document handlers.

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::{Map, Value, json};
use sitedesk_api_types::{
    AboutUs, ApiMessage, ApiSuccess, HomePage, Product, SharedSettings, StoredDocument,
};

use crate::domain::documents::SingletonDocument;
use crate::infra::http::api::error::{ApiError, messages};
use crate::infra::http::api::extract::ApiJson;
use crate::infra::http::api::state::ApiState;

/// Every singleton in one payload; kinds never written are `null`.
#[derive(Debug, Serialize)]
pub struct SiteData {
    pub shared: Option<StoredDocument<SharedSettings>>,
    pub homepage: Option<StoredDocument<HomePage<Product>>>,
    pub aboutus: Option<StoredDocument<AboutUs>>,
}

pub async fn get_singleton<D: SingletonDocument>(
    State(state): State<ApiState>,
) -> Result<Response, ApiError> {
    let stored = state.content.load::<D>().await?;
    Ok(document_or_empty(stored))
}

pub async fn get_homepage(State(state): State<ApiState>) -> Result<Response, ApiError> {
    let stored = state.content.load_homepage().await?;
    Ok(document_or_empty(stored))
}

pub async fn get_data(State(state): State<ApiState>) -> Result<Response, ApiError> {
    let data = SiteData {
        shared: state.content.load::<SharedSettings>().await?,
        homepage: state.content.load_homepage().await?,
        aboutus: state.content.load::<AboutUs>().await?,
    };
    Ok(Json(ApiSuccess::new(data)).into_response())
}

pub async fn upsert_singleton<D: SingletonDocument>(
    State(state): State<ApiState>,
    ApiJson(input): ApiJson<Map<String, Value>>,
) -> Result<Response, ApiError> {
    let stored = state.content.upsert::<D>(input).await?;
    Ok(Json(ApiSuccess::new(stored)).into_response())
}

pub async fn reset_singleton<D: SingletonDocument>(
    State(state): State<ApiState>,
) -> Result<Response, ApiError> {
    if !state.content.reset(D::KIND).await? {
        return Err(ApiError::not_found(messages::DOCUMENT_NOT_FOUND));
    }
    let message = format!("{} reset successfully", capitalize(D::LABEL));
    Ok(Json(ApiMessage::new(message)).into_response())
}

fn document_or_empty<T: Serialize>(stored: Option<T>) -> Response {
    match stored {
        Some(document) => Json(ApiSuccess::new(document)).into_response(),
        None => Json(ApiSuccess::new(json!({}))).into_response(),
    }
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
