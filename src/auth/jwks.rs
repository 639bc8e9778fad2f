// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWKS (JSON Web Key Set) fetching and caching.
//!
//! ## Caching
//!
//! - Keys are cached with a configurable TTL
//! - A cold or expired cache is refreshed by a single in-flight fetch;
//!   concurrent callers wait on the refresh lock and reuse its result
//! - A token whose `kid` is missing from the cache forces a refresh, at most
//!   once per `min_refresh_interval`, so rotated keys are picked up quickly
//! - Fetch failures are not masked with stale keys; a failed fetch is
//!   remembered for `min_refresh_interval` and returned to callers in that
//!   window without contacting the issuer again

use std::sync::Arc;
use std::time::{Duration, Instant};

use jsonwebtoken::{Algorithm, DecodingKey};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use url::Url;

use super::error::AuthError;

/// Default JWKS cache TTL (5 minutes).
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Default floor between refreshes triggered by unknown key ids.
pub const DEFAULT_MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Default timeout for a single JWKS request.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// A single published verification key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningKey {
    /// Key ID
    #[serde(default)]
    pub kid: Option<String>,
    /// Key type (`RSA` is the only type accepted for verification)
    pub kty: String,
    /// Intended usage (`sig` for signing keys)
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub key_use: Option<String>,
    /// RSA modulus, base64url
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,
    /// RSA public exponent, base64url
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,
    /// Algorithm the key is meant for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
}

impl SigningKey {
    /// Build the RSA decoding key for a token signed with `alg`.
    ///
    /// The key must be an RSA signing key and, when it names an algorithm,
    /// that algorithm must be the one the token claims.
    pub fn decoding_key(&self, alg: Algorithm) -> Result<DecodingKey, AuthError> {
        if self.kty != "RSA" {
            return Err(AuthError::MalformedToken);
        }
        if self.key_use.as_deref().is_some_and(|usage| usage != "sig") {
            return Err(AuthError::MalformedToken);
        }
        if let Some(key_alg) = &self.alg {
            let key_alg: Algorithm = key_alg.parse().map_err(|_| AuthError::MalformedToken)?;
            if key_alg != alg {
                return Err(AuthError::MalformedToken);
            }
        }

        let (Some(n), Some(e)) = (&self.n, &self.e) else {
            return Err(AuthError::MalformedToken);
        };
        DecodingKey::from_rsa_components(n, e).map_err(|_| AuthError::MalformedToken)
    }
}

/// The issuer's published key set, in the order it was served.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySet {
    pub keys: Vec<SigningKey>,
}

impl KeySet {
    /// First key whose `kid` matches.
    pub fn find(&self, kid: &str) -> Option<&SigningKey> {
        self.keys.iter().find(|key| key.kid.as_deref() == Some(kid))
    }
}

/// JWKS cache entry.
struct CacheEntry {
    keys: Arc<KeySet>,
    fetched_at: Instant,
}

/// Most recent failed fetch.
struct FailedFetch {
    error: AuthError,
    failed_at: Instant,
}

/// JWKS manager with caching.
///
/// Cheap to clone; clones share the cache.
#[derive(Clone)]
pub struct JwksManager {
    /// JWKS URL
    jwks_url: Url,
    /// Cache TTL
    cache_ttl: Duration,
    /// Minimum cache age before an unknown `kid` forces a refresh
    min_refresh_interval: Duration,
    /// Cached key set
    cache: Arc<RwLock<Option<CacheEntry>>>,
    /// Held for the duration of a fetch; remembers the last failure
    refresh_lock: Arc<Mutex<Option<FailedFetch>>>,
    /// HTTP client
    client: reqwest::Client,
}

impl JwksManager {
    /// Create a new JWKS manager.
    ///
    /// # Arguments
    /// - `jwks_url`: The JWKS endpoint URL (e.g., `https://tenant.auth0.com/.well-known/jwks.json`)
    /// - `fetch_timeout`: Upper bound on a single JWKS request
    pub fn new(jwks_url: Url, fetch_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(fetch_timeout).build()?;
        Ok(Self {
            jwks_url,
            cache_ttl: DEFAULT_CACHE_TTL,
            min_refresh_interval: DEFAULT_MIN_REFRESH_INTERVAL,
            cache: Arc::new(RwLock::new(None)),
            refresh_lock: Arc::new(Mutex::new(None)),
            client,
        })
    }

    /// Create with custom cache TTL.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Create with a custom floor between unknown-`kid` refreshes.
    pub fn with_min_refresh_interval(mut self, interval: Duration) -> Self {
        self.min_refresh_interval = interval;
        self
    }

    /// Get the JWKS URL.
    pub fn jwks_url(&self) -> &Url {
        &self.jwks_url
    }

    /// Current key set, fetched if the cache is cold or expired.
    pub async fn key_set(&self) -> Result<Arc<KeySet>, AuthError> {
        if let Some(keys) = self.cached_within(self.cache_ttl).await {
            return Ok(keys);
        }
        self.refresh_if_older_than(self.cache_ttl).await
    }

    /// Find the key with the given `kid`, refreshing once if it is unknown.
    ///
    /// A failed refresh surfaces as [`AuthError::KeySetUnavailable`].
    pub async fn find_key(&self, kid: &str) -> Result<SigningKey, AuthError> {
        let keys = self.key_set().await?;
        if let Some(key) = keys.find(kid) {
            return Ok(key.clone());
        }

        let keys = self.refresh_if_older_than(self.min_refresh_interval).await?;

        keys.find(kid).cloned().ok_or_else(|| {
            tracing::debug!(kid, "Key id not present in issuer key set");
            AuthError::UnknownSigningKey
        })
    }

    /// Check if JWKS is currently cached and valid.
    pub async fn is_cached(&self) -> bool {
        self.cached_within(self.cache_ttl).await.is_some()
    }

    /// Cached keys if they were fetched less than `max_age` ago.
    async fn cached_within(&self, max_age: Duration) -> Option<Arc<KeySet>> {
        let cache = self.cache.read().await;
        cache
            .as_ref()
            .filter(|entry| entry.fetched_at.elapsed() < max_age)
            .map(|entry| Arc::clone(&entry.keys))
    }

    /// Fetch under the refresh lock unless another caller already refreshed
    /// within `max_age`, or a fetch failed within `min_refresh_interval`,
    /// while we waited.
    async fn refresh_if_older_than(&self, max_age: Duration) -> Result<Arc<KeySet>, AuthError> {
        let mut last_failure = self.refresh_lock.lock().await;
        if let Some(keys) = self.cached_within(max_age).await {
            return Ok(keys);
        }
        if let Some(failed) = last_failure
            .as_ref()
            .filter(|failed| failed.failed_at.elapsed() < self.min_refresh_interval)
        {
            return Err(failed.error.clone());
        }

        match self.fetch_and_store().await {
            Ok(keys) => {
                *last_failure = None;
                Ok(keys)
            }
            Err(error) => {
                *last_failure = Some(FailedFetch {
                    error: error.clone(),
                    failed_at: Instant::now(),
                });
                Err(error)
            }
        }
    }

    async fn fetch_and_store(&self) -> Result<Arc<KeySet>, AuthError> {
        let keys = Arc::new(self.fetch_jwks().await?);
        tracing::debug!(url = %self.jwks_url, keys = keys.keys.len(), "Fetched JWKS");

        let mut cache = self.cache.write().await;
        *cache = Some(CacheEntry {
            keys: Arc::clone(&keys),
            fetched_at: Instant::now(),
        });
        Ok(keys)
    }

    /// Fetch JWKS from the endpoint.
    async fn fetch_jwks(&self) -> Result<KeySet, AuthError> {
        let response = self
            .client
            .get(self.jwks_url.clone())
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(url = %self.jwks_url, error = %e, "JWKS request failed");
                AuthError::KeySetUnavailable(e.to_string())
            })?;

        if !response.status().is_success() {
            tracing::warn!(url = %self.jwks_url, status = %response.status(), "JWKS endpoint returned an error");
            return Err(AuthError::KeySetUnavailable(format!(
                "HTTP {} from JWKS endpoint",
                response.status()
            )));
        }

        response.json::<KeySet>().await.map_err(|e| {
            tracing::warn!(url = %self.jwks_url, error = %e, "JWKS response could not be parsed");
            AuthError::KeySetUnavailable(e.to_string())
        })
    }
}
