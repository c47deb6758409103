// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! This module defines the request and response data structures used by
//! the REST API. Field names are camelCase on the wire and every type
//! derives `ToSchema` for the OpenAPI document.
//!
//! Request bodies keep every field optional so that a missing field is
//! reported by [`Validate`] as a field error instead of a decode failure.
//!
//! ## Model Categories
//!
//! - **Auth**: registration, login and the issued token
//! - **Sweets**: catalog item create/update payloads and responses
//! - **Queries**: search filters and restock amount

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::accounts::Registration;
use crate::auth::Role;
use crate::catalog::{CatalogItem, ItemFields, ItemId, SearchCriteria};
use crate::money::Money;
use crate::validation::{self, FieldErrors, Validate};

// =============================================================================
// Auth
// =============================================================================

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[schema(example = "alice")]
    pub username: Option<String>,
    #[schema(example = "alice@example.com")]
    pub email: Option<String>,
    pub password: Option<String>,
    /// Defaults to `USER` when omitted.
    pub role: Option<Role>,
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        validation::not_blank(&mut errors, "username", self.username.as_deref());
        validation::max_len(&mut errors, "username", self.username.as_deref(), 50);
        validation::not_blank(&mut errors, "email", self.email.as_deref());
        validation::email(&mut errors, "email", self.email.as_deref());
        validation::max_len(&mut errors, "email", self.email.as_deref(), 120);
        validation::not_blank(&mut errors, "password", self.password.as_deref());
        errors.into_result()
    }
}

impl RegisterRequest {
    /// Convert a validated request.
    pub fn into_registration(self) -> Registration {
        Registration {
            username: self.username.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            password: self.password.unwrap_or_default(),
            role: self.role,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Username or email address.
    #[schema(example = "alice")]
    pub username_or_email: Option<String>,
    pub password: Option<String>,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        validation::not_blank(
            &mut errors,
            "usernameOrEmail",
            self.username_or_email.as_deref(),
        );
        validation::not_blank(&mut errors, "password", self.password.as_deref());
        errors.into_result()
    }
}

/// Issued after a successful register or login.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub username: String,
    pub role: Role,
}

// =============================================================================
// Sweets
// =============================================================================

/// Create or full-replace payload for a catalog item.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SweetRequest {
    #[schema(example = "Ladoo")]
    pub name: Option<String>,
    #[schema(example = "Indian")]
    pub category: Option<String>,
    /// Unit price with at most two decimal places.
    #[schema(value_type = Option<f64>, example = 12.5)]
    pub price: Option<Money>,
    #[schema(example = 5)]
    pub quantity: Option<i64>,
}

/// Validates every field and builds the item fields in one pass, so a
/// rejected request always carries at least one field error.
impl TryFrom<SweetRequest> for ItemFields {
    type Error = FieldErrors;

    fn try_from(request: SweetRequest) -> Result<Self, Self::Error> {
        let mut errors = FieldErrors::new();
        let name = required_text(&mut errors, "name", request.name, 120);
        let category = required_text(&mut errors, "category", request.category, 80);

        let price = match request.price {
            None => {
                errors.add("price", validation::MUST_NOT_BE_NULL);
                None
            }
            Some(price) if !price.is_positive() => {
                errors.add("price", validation::MUST_BE_POSITIVE);
                None
            }
            Some(price) => Some(price),
        };

        let quantity = match request.quantity {
            None => {
                errors.add("quantity", validation::MUST_NOT_BE_NULL);
                None
            }
            Some(quantity) if quantity < 0 => {
                errors.add("quantity", validation::MUST_NOT_BE_NEGATIVE);
                None
            }
            Some(quantity) => match u32::try_from(quantity) {
                Ok(quantity) => Some(quantity),
                Err(_) => {
                    errors.add(
                        "quantity",
                        format!("must be less than or equal to {}", u32::MAX),
                    );
                    None
                }
            },
        };

        match (name, category, price, quantity) {
            (Some(name), Some(category), Some(price), Some(quantity)) => Ok(ItemFields {
                name,
                category,
                price,
                quantity,
            }),
            _ => Err(errors),
        }
    }
}

/// Not blank and at most `max` characters; returns the trimmed value.
fn required_text(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<String>,
    max: usize,
) -> Option<String> {
    validation::not_blank(errors, field, value.as_deref());
    validation::max_len(errors, field, value.as_deref(), max);
    value
        .filter(|_| errors.get(field).is_none())
        .map(|v| v.trim().to_string())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SweetResponse {
    pub id: ItemId,
    pub name: String,
    pub category: String,
    #[schema(value_type = f64, example = 12.5)]
    pub price: Money,
    pub quantity: u32,
}

impl From<CatalogItem> for SweetResponse {
    fn from(item: CatalogItem) -> Self {
        Self {
            id: item.id,
            name: item.name,
            category: item.category,
            price: item.price,
            quantity: item.quantity,
        }
    }
}

// =============================================================================
// Queries
// =============================================================================

/// Search filters; every filter is optional and all present filters apply.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Case-insensitive substring of the item name.
    pub name: Option<String>,
    /// Exact category.
    pub category: Option<String>,
    /// Inclusive lower price bound.
    #[serde(default, deserialize_with = "blank_money_as_none")]
    #[param(value_type = Option<f64>)]
    pub min_price: Option<Money>,
    /// Inclusive upper price bound.
    #[serde(default, deserialize_with = "blank_money_as_none")]
    #[param(value_type = Option<f64>)]
    pub max_price: Option<Money>,
}

/// `minPrice=` and `minPrice=%20` leave the bound unset.
fn blank_money_as_none<'de, D>(deserializer: D) -> Result<Option<Money>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)?.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse::<Money>().map(Some).map_err(serde::de::Error::custom),
    }
}

impl From<SearchParams> for SearchCriteria {
    fn from(params: SearchParams) -> Self {
        SearchCriteria::new(
            params.name,
            params.category,
            params.min_price,
            params.max_price,
        )
    }
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RestockParams {
    /// Units to add; must be positive.
    pub qty: i64,
}
