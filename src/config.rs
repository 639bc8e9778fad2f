// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read from the environment once at startup (after an
//! optional `.env` file is loaded) and passed down explicitly.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `AUTH_DOMAIN` | Token issuer domain (e.g. `tenant.auth0.com`) | Required |
//! | `AUTH_AUDIENCE` | Expected JWT audience claim | `dev` |
//! | `AUTH_ALGORITHMS` | Comma-separated signing algorithm allow-list | `RS256` |
//! | `AUTH_LEEWAY_SECS` | Clock skew tolerance for `exp`/`nbf` | `60` |
//! | `JWKS_CACHE_TTL_SECS` | How long a fetched key set is reused | `300` |
//! | `JWKS_MIN_REFRESH_SECS` | Minimum key set age before an unknown `kid` forces a refetch | `30` |
//! | `JWKS_FETCH_TIMEOUT_SECS` | Timeout for a single JWKS request | `10` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use jsonwebtoken::Algorithm;
use url::Url;

use crate::auth::verifier::{DEFAULT_LEEWAY_SECS, RSA_ALGORITHMS};

pub const AUTH_DOMAIN_ENV: &str = "AUTH_DOMAIN";
pub const AUTH_AUDIENCE_ENV: &str = "AUTH_AUDIENCE";
pub const AUTH_ALGORITHMS_ENV: &str = "AUTH_ALGORITHMS";
pub const AUTH_LEEWAY_ENV: &str = "AUTH_LEEWAY_SECS";
pub const JWKS_CACHE_TTL_ENV: &str = "JWKS_CACHE_TTL_SECS";
pub const JWKS_MIN_REFRESH_ENV: &str = "JWKS_MIN_REFRESH_SECS";
pub const JWKS_FETCH_TIMEOUT_ENV: &str = "JWKS_FETCH_TIMEOUT_SECS";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Audience used when `AUTH_AUDIENCE` is unset.
pub const DEFAULT_AUDIENCE: &str = "dev";

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
    #[error("signing algorithm {0:?} is not an allowed RSA algorithm")]
    UnsupportedAlgorithm(String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

/// Token verification settings.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Issuer domain, without scheme
    pub domain: String,
    /// Expected `iss` claim, `https://{domain}/`
    pub issuer: String,
    /// Expected `aud` claim
    pub audience: String,
    /// `https://{domain}/.well-known/jwks.json`
    pub jwks_url: Url,
    /// Accepted signing algorithms
    pub algorithms: Vec<Algorithm>,
    /// Clock skew tolerance in seconds
    pub leeway: u64,
    pub cache_ttl: Duration,
    pub min_refresh_interval: Duration,
    pub fetch_timeout: Duration,
}

impl AuthConfig {
    /// Settings for `domain` with default algorithms, leeway and cache policy.
    pub fn for_domain(domain: &str, audience: impl Into<String>) -> Result<Self, ConfigError> {
        let domain = domain.trim().trim_end_matches('/');
        let invalid = || ConfigError::Invalid {
            name: AUTH_DOMAIN_ENV,
            value: domain.to_string(),
        };
        if domain.is_empty() || domain.contains("://") || domain.contains('/') {
            return Err(invalid());
        }

        let issuer = format!("https://{domain}/");
        let jwks_url = Url::parse(&issuer)
            .and_then(|base| base.join(".well-known/jwks.json"))
            .map_err(|_| invalid())?;

        Ok(Self {
            domain: domain.to_string(),
            issuer,
            audience: audience.into(),
            jwks_url,
            algorithms: vec![Algorithm::RS256],
            leeway: DEFAULT_LEEWAY_SECS,
            cache_ttl: crate::auth::jwks::DEFAULT_CACHE_TTL,
            min_refresh_interval: crate::auth::jwks::DEFAULT_MIN_REFRESH_INTERVAL,
            fetch_timeout: crate::auth::jwks::DEFAULT_FETCH_TIMEOUT,
        })
    }
}

/// Process configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub auth: AuthConfig,
    pub bind_addr: SocketAddr,
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let domain = var(AUTH_DOMAIN_ENV).ok_or(ConfigError::Missing(AUTH_DOMAIN_ENV))?;
        let audience = var(AUTH_AUDIENCE_ENV).unwrap_or_else(|| DEFAULT_AUDIENCE.to_string());
        let mut auth = AuthConfig::for_domain(&domain, audience)?;

        if let Some(algorithms) = var(AUTH_ALGORITHMS_ENV) {
            auth.algorithms = parse_algorithms(&algorithms)?;
        }
        if let Some(leeway) = var(AUTH_LEEWAY_ENV) {
            auth.leeway = parse_number(AUTH_LEEWAY_ENV, &leeway)?;
        }
        if let Some(ttl) = var(JWKS_CACHE_TTL_ENV) {
            auth.cache_ttl = Duration::from_secs(parse_number(JWKS_CACHE_TTL_ENV, &ttl)?);
        }
        if let Some(interval) = var(JWKS_MIN_REFRESH_ENV) {
            auth.min_refresh_interval =
                Duration::from_secs(parse_number(JWKS_MIN_REFRESH_ENV, &interval)?);
        }
        if let Some(timeout) = var(JWKS_FETCH_TIMEOUT_ENV) {
            auth.fetch_timeout =
                Duration::from_secs(parse_number(JWKS_FETCH_TIMEOUT_ENV, &timeout)?);
        }

        let host = var(HOST_ENV).unwrap_or_else(|| "0.0.0.0".to_string());
        let host: IpAddr = host.parse().map_err(|_| ConfigError::Invalid {
            name: HOST_ENV,
            value: host.clone(),
        })?;
        let port = match var(PORT_ENV) {
            Some(port) => parse_number(PORT_ENV, &port)?,
            None => 8080,
        };

        let log_format = match var(LOG_FORMAT_ENV).as_deref().map(str::to_ascii_lowercase) {
            None => LogFormat::default(),
            Some(format) if format == "json" => LogFormat::Json,
            Some(format) if format == "pretty" => LogFormat::Pretty,
            Some(format) => {
                return Err(ConfigError::Invalid {
                    name: LOG_FORMAT_ENV,
                    value: format,
                })
            }
        };

        Ok(Self {
            auth,
            bind_addr: SocketAddr::new(host, port),
            log_format,
        })
    }
}

fn parse_number<T: FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: value.to_string(),
    })
}

fn parse_algorithms(value: &str) -> Result<Vec<Algorithm>, ConfigError> {
    let algorithms = value
        .split(',')
        .map(str::trim)
        .filter(|alg| !alg.is_empty())
        .map(|alg| match Algorithm::from_str(alg) {
            Ok(parsed) if RSA_ALGORITHMS.contains(&parsed) => Ok(parsed),
            _ => Err(ConfigError::UnsupportedAlgorithm(alg.to_string())),
        })
        .collect::<Result<Vec<_>, _>>()?;

    if algorithms.is_empty() {
        return Err(ConfigError::Invalid {
            name: AUTH_ALGORITHMS_ENV,
            value: value.to_string(),
        });
    }
    Ok(algorithms)
}
