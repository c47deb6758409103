// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    body::Body,
    http::{HeaderName, Request},
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::Role,
    error::ErrorBody,
    models::{AuthResponse, LoginRequest, RegisterRequest, SweetRequest, SweetResponse},
    state::AppState,
    validation::FieldErrors,
};

pub mod auth;
pub mod extract;
pub mod health;
pub mod sweets;

const REQUEST_ID_HEADER: &str = "x-request-id";

pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route(
            "/api/sweets",
            get(sweets::list_sweets).post(sweets::create_sweet),
        )
        .route("/api/sweets/search", get(sweets::search_sweets))
        .route(
            "/api/sweets/{id}",
            put(sweets::update_sweet).delete(sweets::delete_sweet),
        )
        .route("/api/sweets/{id}/purchase", post(sweets::purchase_sweet))
        .route("/api/sweets/{id}/restock", post(sweets::restock_sweet))
        .with_state(state);

    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .merge(routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    let request_id = request
                        .headers()
                        .get(REQUEST_ID_HEADER)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("-");
                    tracing::info_span!(
                        "http",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request_id,
                    )
                }))
                .layer(PropagateRequestIdLayer::new(request_id)),
        )
        .layer(CorsLayer::permissive())
}

/// Registers the bearer token scheme referenced by `security(("bearer_auth" = []))`.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::liveness,
        health::readiness,
        auth::register,
        auth::login,
        sweets::create_sweet,
        sweets::list_sweets,
        sweets::search_sweets,
        sweets::update_sweet,
        sweets::delete_sweet,
        sweets::purchase_sweet,
        sweets::restock_sweet
    ),
    components(
        schemas(
            RegisterRequest,
            LoginRequest,
            AuthResponse,
            Role,
            SweetRequest,
            SweetResponse,
            ErrorBody,
            FieldErrors,
            health::HealthResponse,
            health::ReadyResponse,
            health::HealthChecks
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Auth", description = "Registration and login"),
        (name = "Sweets", description = "Catalog management and search"),
        (name = "Inventory", description = "Purchases and restocking")
    )
)]
pub struct ApiDoc;
