// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Tracing subscriber setup.
//!
//! `RUST_LOG` controls the filter (default `info,tower_http=debug`) and
//! `LOG_FORMAT` picks JSON lines or human-readable output.

use tracing_subscriber::EnvFilter;

use crate::config::LogFormat;

pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

pub fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let result = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.try_init(),
    };

    if let Err(e) = result {
        tracing::warn!(error = %e, "tracing init failed");
    }
}
