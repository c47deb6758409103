// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTTP error responses.
//!
//! Every failure leaves the API as
//! `{"timestamp": ..., "status": <code>, "message": ...}` or, for field
//! validation failures, `{"timestamp": ..., "status": 400, "errors": {field: message}}`.
//! Server-side failures are logged and answered with a generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::accounts::AccountError;
use crate::auth::AuthError;
use crate::catalog::CatalogError;
use crate::validation::FieldErrors;

pub const UNEXPECTED_ERROR: &str = "Unexpected error";

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: Option<String>,
    pub errors: Option<FieldErrors>,
}

/// Error body returned by every endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub timestamp: DateTime<Utc>,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: Some(message.into()),
            errors: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn validation(errors: FieldErrors) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: None,
            errors: Some(errors),
        }
    }

    /// Log `detail` and answer 500 without exposing it.
    pub fn internal(detail: impl std::fmt::Display) -> Self {
        tracing::error!(error = %detail, "Unexpected error while handling request");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, UNEXPECTED_ERROR)
    }
}

impl From<FieldErrors> for ApiError {
    fn from(errors: FieldErrors) -> Self {
        Self::validation(errors)
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::DuplicateUsername | AccountError::DuplicateEmail => {
                Self::bad_request(err.to_string())
            }
            AccountError::UserNotFound | AccountError::InvalidCredentials => {
                Self::unauthorized(err.to_string())
            }
            AccountError::PasswordHash(_) | AccountError::Store(_) => Self::internal(err),
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::ItemNotFound(_) => Self::not_found(err.to_string()),
            CatalogError::OutOfStock(_)
            | CatalogError::InvalidQuantity
            | CatalogError::QuantityOverflow => Self::bad_request(err.to_string()),
            CatalogError::Store(_) => Self::internal(err),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let status = err.status_code();
        if status.is_server_error() {
            Self::internal(err)
        } else {
            Self::new(status, err.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            timestamp: Utc::now(),
            status: self.status.as_u16(),
            message: self.message,
            errors: self.errors,
        });
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StoreError;
    use axum::body::to_bytes;

    async fn body_json(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn constructors_set_status_and_message() {
        let nf = ApiError::not_found("missing");
        assert_eq!(nf.status, StatusCode::NOT_FOUND);
        assert_eq!(nf.message.as_deref(), Some("missing"));

        let bad = ApiError::bad_request("bad");
        assert_eq!(bad.status, StatusCode::BAD_REQUEST);
        assert_eq!(bad.message.as_deref(), Some("bad"));
    }

    #[tokio::test]
    async fn into_response_returns_json_body() {
        let (status, body) = body_json(ApiError::bad_request("bad data")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], 400);
        assert_eq!(body["message"], "bad data");
        assert!(body.get("errors").is_none());
        assert!(body["timestamp"].as_str().is_some());
    }

    #[tokio::test]
    async fn validation_errors_are_a_field_map() {
        let mut errors = FieldErrors::new();
        errors.add("name", "must not be blank");
        let (status, body) = body_json(errors.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"]["name"], "must not be blank");
        assert!(body.get("message").is_none());
    }

    #[test]
    fn domain_errors_map_to_statuses() {
        let cases: Vec<(ApiError, StatusCode)> = vec![
            (AccountError::DuplicateUsername.into(), StatusCode::BAD_REQUEST),
            (AccountError::DuplicateEmail.into(), StatusCode::BAD_REQUEST),
            (AccountError::UserNotFound.into(), StatusCode::UNAUTHORIZED),
            (AccountError::InvalidCredentials.into(), StatusCode::UNAUTHORIZED),
            (CatalogError::ItemNotFound(1).into(), StatusCode::NOT_FOUND),
            (CatalogError::OutOfStock(1).into(), StatusCode::BAD_REQUEST),
            (CatalogError::InvalidQuantity.into(), StatusCode::BAD_REQUEST),
            (AuthError::TokenExpired.into(), StatusCode::UNAUTHORIZED),
            (AuthError::InsufficientPermissions.into(), StatusCode::FORBIDDEN),
        ];
        for (err, expected) in cases {
            assert_eq!(err.status, expected, "{err:?}");
        }
    }

    #[tokio::test]
    async fn store_failures_hide_details() {
        let err = CatalogError::Store(StoreError::SequenceExhausted("sweets"));
        let (status, body) = body_json(err.into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], UNEXPECTED_ERROR);
    }

    #[test]
    fn messages_come_from_domain_errors() {
        let err: ApiError = CatalogError::ItemNotFound(3).into();
        assert_eq!(err.message.as_deref(), Some("Sweet not found"));
        let err: ApiError = AccountError::DuplicateEmail.into();
        assert_eq!(err.message.as_deref(), Some("Email already registered"));
    }
}
