// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for authenticated users.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user is AuthenticatedUser
//! }
//! ```
//!
//! ## Guard Flow
//!
//! 1. Read `Authorization: Bearer <token>`
//! 2. Verify the token and take its subject
//! 3. Load the account named by the subject
//! 4. Re-validate the token against the loaded username
//! 5. Hand the handler an [`AuthenticatedUser`] built from the account's authorities
//!
//! Any failure before step 5 rejects the request with 401; a principal that
//! lacks the required role is rejected with 403.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use super::{AuthError, AuthenticatedUser, Role};
use crate::accounts::AccountError;
use crate::state::AppState;

/// Extractor for any authenticated user.
///
/// # Example
///
/// ```rust,ignore
/// async fn list_sweets(
///     Auth(user): Auth,
///     State(state): State<AppState>,
/// ) -> Result<Json<Vec<SweetResponse>>, ApiError> {
///     // user.username is the token subject
/// }
/// ```
pub struct Auth(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingAuthHeader)?
            .to_str()
            .map_err(|_| AuthError::InvalidAuthHeader)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::InvalidAuthHeader)?;

        let user = authenticate(token, state)?;
        Ok(Auth(user))
    }
}

/// Resolve a bearer token into a principal.
fn authenticate(token: &str, state: &AppState) -> Result<AuthenticatedUser, AuthError> {
    let subject = state.tokens.extract_subject(token).inspect_err(|e| {
        tracing::debug!(error = %e, "Rejected bearer token");
    })?;

    let details = state
        .accounts
        .load_for_authorization(&subject)
        .map_err(|e| match e {
            AccountError::UserNotFound => {
                tracing::debug!(subject = %subject, "Token subject has no account");
                AuthError::UnknownPrincipal
            }
            other => AuthError::InternalError(other.to_string()),
        })?;

    if !state.tokens.validate(token, &details.username) {
        return Err(AuthError::UnknownPrincipal);
    }

    Ok(AuthenticatedUser::from_details(details))
}

/// Extractor that requires admin role.
pub struct AdminOnly(pub AuthenticatedUser);

impl FromRequestParts<AppState> for AdminOnly {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Auth(user) = Auth::from_request_parts(parts, state).await?;

        user.require(Role::Admin).inspect_err(|_| {
            tracing::warn!(username = %user.username, "Admin route refused for non-admin");
        })?;

        Ok(AdminOnly(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::Registration;
    use crate::auth::TokenService;
    use axum::http::Request;
    use chrono::Duration;

    fn create_test_state() -> AppState {
        AppState::in_memory(TokenService::new("extractor-secret", Duration::hours(1)))
    }

    fn register(state: &AppState, username: &str, role: Role) {
        state
            .accounts
            .register(Registration {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                password: "password".to_string(),
                role: Some(role),
            })
            .unwrap();
    }

    fn parts_with(header: Option<String>) -> Parts {
        let mut builder = Request::builder().uri("/test");
        if let Some(value) = header {
            builder = builder.header("Authorization", value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn auth_extractor_requires_auth_header() {
        let state = create_test_state();
        let mut parts = parts_with(None);

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MissingAuthHeader)));
    }

    #[tokio::test]
    async fn auth_extractor_rejects_non_bearer_scheme() {
        let state = create_test_state();
        let mut parts = parts_with(Some("Basic YWxpY2U6cHc=".to_string()));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InvalidAuthHeader)));
    }

    #[tokio::test]
    async fn auth_extractor_succeeds_with_issued_token() {
        let state = create_test_state();
        register(&state, "alice", Role::User);
        let token = state.tokens.issue("alice").unwrap();
        let mut parts = parts_with(Some(format!("Bearer {token}")));

        let Auth(user) = Auth::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.role, Role::User);
        assert_eq!(user.authorities, vec!["ROLE_USER".to_string()]);
    }

    #[tokio::test]
    async fn auth_extractor_rejects_token_for_unknown_user() {
        let state = create_test_state();
        let token = state.tokens.issue("ghost").unwrap();
        let mut parts = parts_with(Some(format!("Bearer {token}")));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::UnknownPrincipal)));
    }

    #[tokio::test]
    async fn auth_extractor_rejects_foreign_signature() {
        let state = create_test_state();
        register(&state, "alice", Role::User);
        let foreign = TokenService::new("other-secret", Duration::hours(1));
        let token = foreign.issue("alice").unwrap();
        let mut parts = parts_with(Some(format!("Bearer {token}")));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InvalidSignature)));
    }

    #[tokio::test]
    async fn auth_extractor_rejects_expired_token() {
        let state = create_test_state();
        register(&state, "alice", Role::User);
        let token = state
            .tokens
            .issue_at("alice", chrono::Utc::now() - Duration::hours(2))
            .unwrap();
        let mut parts = parts_with(Some(format!("Bearer {token}")));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::TokenExpired)));
    }

    #[tokio::test]
    async fn admin_only_rejects_non_admin() {
        let state = create_test_state();
        register(&state, "alice", Role::User);
        let token = state.tokens.issue("alice").unwrap();
        let mut parts = parts_with(Some(format!("Bearer {token}")));

        let result = AdminOnly::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InsufficientPermissions)));
    }

    #[tokio::test]
    async fn admin_only_accepts_admin() {
        let state = create_test_state();
        register(&state, "root", Role::Admin);
        let token = state.tokens.issue("root").unwrap();
        let mut parts = parts_with(Some(format!("Bearer {token}")));

        let AdminOnly(user) = AdminOnly::from_request_parts(&mut parts, &state).await.unwrap();
        assert!(user.has_role(Role::Admin));
    }
}
