//! Product handlers

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{Map, Value};
use sitedesk_api_types::{ApiMessage, ApiSuccess};
use uuid::Uuid;

use crate::domain::products::{draft_from_json, patch_from_json};
use crate::infra::http::api::error::{ApiError, messages};
use crate::infra::http::api::extract::ApiJson;
use crate::infra::http::api::state::ApiState;

pub async fn list_products(State(state): State<ApiState>) -> Result<Response, ApiError> {
    let products = state.products.list().await?;
    Ok(Json(ApiSuccess::new(products)).into_response())
}

pub async fn get_product(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let product = state.products.get(parse_product_id(&id)?).await?;
    Ok(Json(ApiSuccess::new(product)).into_response())
}

pub async fn create_product(
    State(state): State<ApiState>,
    ApiJson(body): ApiJson<Map<String, Value>>,
) -> Result<Response, ApiError> {
    let draft = draft_from_json(body).map_err(ApiError::validation)?;
    let product = state.products.create(draft).await?;
    Ok((StatusCode::CREATED, Json(ApiSuccess::new(product))).into_response())
}

pub async fn update_product(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<Map<String, Value>>,
) -> Result<Response, ApiError> {
    let id = parse_product_id(&id)?;
    let patch = patch_from_json(body).map_err(ApiError::validation)?;
    let product = state.products.update(id, patch).await?;
    Ok(Json(ApiSuccess::new(product)).into_response())
}

pub async fn delete_product(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    state.products.delete(parse_product_id(&id)?).await?;
    Ok(Json(ApiMessage::new("Product deleted successfully")).into_response())
}

/// Ids that are not UUIDs cannot name a product.
fn parse_product_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found(messages::PRODUCT_NOT_FOUND))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_ids_are_not_found() {
        let err = parse_product_id("not-a-uuid").unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn canonical_ids_parse() {
        let id = Uuid::new_v4();
        assert_eq!(parse_product_id(&id.to_string()).unwrap(), id);
    }
}
