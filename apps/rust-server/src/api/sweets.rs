// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};

use super::extract::{ApiJson, ApiPath, ApiQuery};
use crate::{
    auth::{AdminOnly, Auth},
    catalog::{ItemFields, ItemId, SearchCriteria},
    error::{ApiError, ErrorBody},
    models::{RestockParams, SearchParams, SweetRequest, SweetResponse},
    state::AppState,
};

#[utoipa::path(
    post,
    path = "/api/sweets",
    request_body = SweetRequest,
    tag = "Sweets",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Sweet created", body = SweetResponse),
        (status = 400, description = "Invalid input", body = ErrorBody),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 403, description = "Admin role required", body = ErrorBody)
    )
)]
pub async fn create_sweet(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SweetRequest>,
) -> Result<Json<SweetResponse>, ApiError> {
    let fields = ItemFields::try_from(request)?;
    let item = state.catalog.create(fields)?;
    Ok(Json(item.into()))
}

#[utoipa::path(
    get,
    path = "/api/sweets",
    tag = "Sweets",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All sweets ordered by id", body = [SweetResponse]),
        (status = 401, description = "Not authenticated", body = ErrorBody)
    )
)]
pub async fn list_sweets(
    Auth(_user): Auth,
    State(state): State<AppState>,
) -> Result<Json<Vec<SweetResponse>>, ApiError> {
    let items = state.catalog.list_all()?;
    Ok(Json(items.into_iter().map(SweetResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/sweets/search",
    params(SearchParams),
    tag = "Sweets",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Matching sweets ordered by id", body = [SweetResponse]),
        (status = 400, description = "Unparseable filter value", body = ErrorBody),
        (status = 401, description = "Not authenticated", body = ErrorBody)
    )
)]
pub async fn search_sweets(
    Auth(_user): Auth,
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<SearchParams>,
) -> Result<Json<Vec<SweetResponse>>, ApiError> {
    let criteria = SearchCriteria::from(params);
    let items = state.catalog.search(&criteria)?;
    Ok(Json(items.into_iter().map(SweetResponse::from).collect()))
}

#[utoipa::path(
    put,
    path = "/api/sweets/{id}",
    params(("id" = u64, Path, description = "Sweet identifier")),
    request_body = SweetRequest,
    tag = "Sweets",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Sweet replaced", body = SweetResponse),
        (status = 400, description = "Invalid input", body = ErrorBody),
        (status = 403, description = "Admin role required", body = ErrorBody),
        (status = 404, description = "Sweet not found", body = ErrorBody)
    )
)]
pub async fn update_sweet(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ItemId>,
    ApiJson(request): ApiJson<SweetRequest>,
) -> Result<Json<SweetResponse>, ApiError> {
    let fields = ItemFields::try_from(request)?;
    let item = state.catalog.update(id, fields)?;
    Ok(Json(item.into()))
}

#[utoipa::path(
    delete,
    path = "/api/sweets/{id}",
    params(("id" = u64, Path, description = "Sweet identifier")),
    tag = "Sweets",
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Sweet deleted"),
        (status = 403, description = "Admin role required", body = ErrorBody),
        (status = 404, description = "Sweet not found", body = ErrorBody)
    )
)]
pub async fn delete_sweet(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ItemId>,
) -> Result<StatusCode, ApiError> {
    state.catalog.delete(id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/sweets/{id}/purchase",
    params(("id" = u64, Path, description = "Sweet identifier")),
    tag = "Inventory",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "One unit sold", body = SweetResponse),
        (status = 400, description = "Out of stock", body = ErrorBody),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 404, description = "Sweet not found", body = ErrorBody)
    )
)]
pub async fn purchase_sweet(
    Auth(user): Auth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ItemId>,
) -> Result<Json<SweetResponse>, ApiError> {
    let item = state.catalog.purchase(id)?;
    tracing::debug!(item_id = id, username = %user.username, "Purchase recorded");
    Ok(Json(item.into()))
}

#[utoipa::path(
    post,
    path = "/api/sweets/{id}/restock",
    params(
        ("id" = u64, Path, description = "Sweet identifier"),
        RestockParams
    ),
    tag = "Inventory",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Stock increased", body = SweetResponse),
        (status = 400, description = "Quantity missing or not positive", body = ErrorBody),
        (status = 403, description = "Admin role required", body = ErrorBody),
        (status = 404, description = "Sweet not found", body = ErrorBody)
    )
)]
pub async fn restock_sweet(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ItemId>,
    ApiQuery(params): ApiQuery<RestockParams>,
) -> Result<Json<SweetResponse>, ApiError> {
    let item = state.catalog.restock(id, params.qty)?;
    Ok(Json(item.into()))
}
