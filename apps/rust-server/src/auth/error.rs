// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::error::ApiError;

/// Authentication error type.
///
/// Returned by the token service and rejected by the request guards.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No authorization header present
    #[error("Authorization header is required")]
    MissingAuthHeader,
    /// Invalid authorization header format
    #[error("Invalid authorization header format (expected 'Bearer <token>')")]
    InvalidAuthHeader,
    /// Token is malformed
    #[error("Token is malformed")]
    MalformedToken,
    /// Token signature is invalid
    #[error("Token signature is invalid")]
    InvalidSignature,
    /// Token has expired
    #[error("Token has expired")]
    TokenExpired,
    /// Token subject does not name a known account
    #[error("Token subject is not a known user")]
    UnknownPrincipal,
    /// Insufficient permissions
    #[error("Insufficient permissions for this operation")]
    InsufficientPermissions,
    /// Internal error (token signing, account lookup failure)
    #[error("Internal authentication error: {0}")]
    InternalError(String),
}

impl AuthError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingAuthHeader
            | AuthError::InvalidAuthHeader
            | AuthError::MalformedToken
            | AuthError::InvalidSignature
            | AuthError::TokenExpired
            | AuthError::UnknownPrincipal => StatusCode::UNAUTHORIZED,
            AuthError::InsufficientPermissions => StatusCode::FORBIDDEN,
            AuthError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}
