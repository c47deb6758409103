// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request field validation.
//!
//! Each request DTO implements [`Validate`] by running the rule helpers
//! below against its fields. Failures are collected per field (first
//! failure wins) and surfaced as a 400 with an `errors` map.

use std::collections::BTreeMap;

use serde::Serialize;
use utoipa::ToSchema;

pub const MUST_NOT_BE_BLANK: &str = "must not be blank";
pub const MUST_NOT_BE_NULL: &str = "must not be null";
pub const MUST_BE_EMAIL: &str = "must be a well-formed email address";
pub const MUST_BE_POSITIVE: &str = "must be greater than 0.0";
pub const MUST_NOT_BE_NEGATIVE: &str = "must be greater than or equal to 0";

/// Field name → first validation message for that field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` for `field` unless the field already failed.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// `Ok(())` when nothing failed.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

/// Implemented by request bodies checked before any service call.
pub trait Validate {
    fn validate(&self) -> Result<(), FieldErrors>;
}

/// Present and not whitespace-only.
pub fn not_blank(errors: &mut FieldErrors, field: &str, value: Option<&str>) {
    if value.is_none_or(|v| v.trim().is_empty()) {
        errors.add(field, MUST_NOT_BE_BLANK);
    }
}

/// At most `max` characters. Absent values pass.
pub fn max_len(errors: &mut FieldErrors, field: &str, value: Option<&str>, max: usize) {
    if value.is_some_and(|v| v.chars().count() > max) {
        errors.add(field, format!("size must be between 0 and {max}"));
    }
}

/// Loose address check: one `@`, non-empty local part, dotted domain
/// without empty labels. Absent or blank values pass.
pub fn email(errors: &mut FieldErrors, field: &str, value: Option<&str>) {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return;
    };
    if !is_well_formed_email(value) {
        errors.add(field, MUST_BE_EMAIL);
    }
}

fn is_well_formed_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') || value.chars().any(char::is_whitespace) {
        return false;
    }
    !domain.is_empty() && domain.split('.').all(|label| !label.is_empty())
}
