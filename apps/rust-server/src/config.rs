// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read once from the environment at startup into
//! [`AppConfig`].
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `STORE_BACKEND` | `redb` or `memory` | `redb` |
//! | `DATABASE_PATH` | redb database file | `data/sweetshop.redb` |
//! | `JWT_SECRET` | Token signing secret | Required |
//! | `JWT_EXPIRATION_MS` | Token lifetime in milliseconds | `86400000` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use crate::auth::token::DEFAULT_TOKEN_LIFETIME_MS;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const STORE_BACKEND_ENV: &str = "STORE_BACKEND";
pub const DATABASE_PATH_ENV: &str = "DATABASE_PATH";
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";
pub const JWT_EXPIRATION_ENV: &str = "JWT_EXPIRATION_MS";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATABASE_PATH: &str = "data/sweetshop.redb";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} has invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(var: &'static str, value: &str, reason: impl ToString) -> Self {
        Self::Invalid {
            var,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Redb,
    Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Clone)]
pub struct AppConfig {
    pub host: IpAddr,
    pub port: u16,
    pub store_backend: StoreBackend,
    pub database_path: PathBuf,
    pub jwt_secret: String,
    pub jwt_expiration_ms: i64,
    pub log_format: LogFormat,
}

// Hand-written so the secret never reaches the logs.
impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("store_backend", &self.store_backend)
            .field("database_path", &self.database_path)
            .field("jwt_secret", &"<redacted>")
            .field("jwt_expiration_ms", &self.jwt_expiration_ms)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = match get(HOST_ENV) {
            Some(v) => v
                .trim()
                .parse()
                .map_err(|e| ConfigError::invalid(HOST_ENV, &v, e))?,
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };

        let port = match get(PORT_ENV) {
            Some(v) => v
                .trim()
                .parse()
                .map_err(|e| ConfigError::invalid(PORT_ENV, &v, e))?,
            None => DEFAULT_PORT,
        };

        let store_backend = match get(STORE_BACKEND_ENV) {
            Some(v) => match v.trim().to_ascii_lowercase().as_str() {
                "redb" => StoreBackend::Redb,
                "memory" => StoreBackend::Memory,
                _ => {
                    return Err(ConfigError::invalid(
                        STORE_BACKEND_ENV,
                        &v,
                        "expected 'redb' or 'memory'",
                    ))
                }
            },
            None => StoreBackend::Redb,
        };

        let database_path = get(DATABASE_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH));

        let jwt_secret = get(JWT_SECRET_ENV).ok_or(ConfigError::Missing(JWT_SECRET_ENV))?;

        let jwt_expiration_ms = match get(JWT_EXPIRATION_ENV) {
            Some(v) => {
                let ms: i64 = v
                    .trim()
                    .parse()
                    .map_err(|e| ConfigError::invalid(JWT_EXPIRATION_ENV, &v, e))?;
                if ms <= 0 {
                    return Err(ConfigError::invalid(JWT_EXPIRATION_ENV, &v, "must be positive"));
                }
                let fits = chrono::Duration::try_milliseconds(ms)
                    .and_then(|lifetime| chrono::Utc::now().checked_add_signed(lifetime))
                    .is_some();
                if !fits {
                    return Err(ConfigError::invalid(
                        JWT_EXPIRATION_ENV,
                        &v,
                        "expiry would be out of range",
                    ));
                }
                ms
            }
            None => DEFAULT_TOKEN_LIFETIME_MS,
        };

        let log_format = match get(LOG_FORMAT_ENV) {
            Some(v) => match v.trim().to_ascii_lowercase().as_str() {
                "json" => LogFormat::Json,
                "pretty" => LogFormat::Pretty,
                _ => {
                    return Err(ConfigError::invalid(
                        LOG_FORMAT_ENV,
                        &v,
                        "expected 'json' or 'pretty'",
                    ))
                }
            },
            None => LogFormat::Pretty,
        };

        Ok(Self {
            host,
            port,
            store_backend,
            database_path,
            jwt_secret,
            jwt_expiration_ms,
            log_format,
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn token_lifetime(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(self.jwt_expiration_ms)
    }
}
