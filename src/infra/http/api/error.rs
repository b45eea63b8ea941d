use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sitedesk_api_types::ApiFailure;

use crate::application::admin::{AdminContentError, AdminProductError};
use crate::application::error::ErrorReport;
use crate::application::repos::RepoError;
use crate::domain::error::DomainError;
use crate::domain::validation::ValidationErrors;

pub mod messages {
    pub const VALIDATION_FAILED: &str = "Validation failed";
    pub const INVALID_BODY: &str = "Invalid request body";
    pub const PRODUCT_NOT_FOUND: &str = "Product not found";
    pub const DOCUMENT_NOT_FOUND: &str = "Document not found";
    pub const NOT_FOUND: &str = "Not found";
    pub const INTERNAL: &str = "Internal server error";
}

/// Failure envelope returned by every API handler.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: &'static str,
    details: Option<ValidationErrors>,
    hint: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: &'static str, hint: Option<String>) -> Self {
        Self {
            status,
            message,
            details: None,
            hint,
        }
    }

    pub fn bad_request(message: &'static str, hint: Option<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message, hint)
    }

    pub fn validation(errors: ValidationErrors) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: messages::VALIDATION_FAILED,
            hint: Some(errors.to_string()),
            details: Some(errors),
        }
    }

    pub fn not_found(message: &'static str) -> Self {
        Self::new(StatusCode::NOT_FOUND, message, None)
    }

    /// Generic 500. The cause only reaches the error report, never the body.
    pub fn internal(hint: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            messages::INTERNAL,
            Some(hint.into()),
        )
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = ApiFailure::new(self.message);
        if let Some(details) = self.details {
            body = body.with_details(details.into_fields());
        }
        let mut response = (self.status, Json(body)).into_response();
        ErrorReport::from_message(
            "infra::http::api",
            self.status,
            self.hint.unwrap_or_else(|| self.message.to_string()),
        )
        .attach(&mut response);
        response
    }
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        ApiError::internal(err.to_string())
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::internal(err.to_string())
    }
}

impl From<AdminContentError> for ApiError {
    fn from(err: AdminContentError) -> Self {
        match err {
            AdminContentError::Validation(errors) => ApiError::validation(errors),
            AdminContentError::Domain(err) => err.into(),
            AdminContentError::Repo(err) => err.into(),
        }
    }
}

impl From<AdminProductError> for ApiError {
    fn from(err: AdminProductError) -> Self {
        match err {
            AdminProductError::Validation(errors) => ApiError::validation(errors),
            AdminProductError::NotFound => ApiError::not_found(messages::PRODUCT_NOT_FOUND),
            AdminProductError::Repo(err) => err.into(),
        }
    }
}
