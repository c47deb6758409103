// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Registration and login. Both answer with a freshly issued bearer token.

use axum::{extract::State, Json};

use super::extract::ApiJson;
use crate::{
    accounts::User,
    error::ApiError,
    models::{AuthResponse, LoginRequest, RegisterRequest},
    state::AppState,
    validation::Validate,
};

/// Password hashing is CPU-bound; keep it off the async workers.
async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(ApiError::internal)?
}

fn token_response(state: &AppState, user: User) -> Result<Json<AuthResponse>, ApiError> {
    let token = state.tokens.issue(&user.username)?;
    Ok(Json(AuthResponse {
        token,
        username: user.username,
        role: user.role,
    }))
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    tag = "Auth",
    responses(
        (status = 200, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid input or duplicate username/email", body = crate::error::ErrorBody)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    request.validate()?;

    let accounts = state.accounts.clone();
    let registration = request.into_registration();
    let user = blocking(move || Ok(accounts.register(registration)?)).await?;

    token_response(&state, user)
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    tag = "Auth",
    responses(
        (status = 200, description = "Authenticated", body = AuthResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorBody),
        (status = 401, description = "Unknown user or wrong password", body = crate::error::ErrorBody)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    request.validate()?;

    let accounts = state.accounts.clone();
    let identifier = request.username_or_email.unwrap_or_default();
    let password = request.password.unwrap_or_default();
    let user = blocking(move || Ok(accounts.authenticate(&identifier, &password)?)).await?;

    tracing::info!(username = %user.username, "Login succeeded");
    token_response(&state, user)
}
