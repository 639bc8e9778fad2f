// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer token verification against the issuer's JWKS.
//!
//! Verification steps:
//!
//! 1. Read the unverified header for `alg` and `kid`
//! 2. Reject algorithms outside the allow-list (RSA family only)
//! 3. Look the `kid` up in the issuer key set
//! 4. Verify the signature and the `exp`, `aud` and `iss` claims

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Algorithm, Validation};

use super::{AuthError, Claims, JwksManager};
use crate::config::AuthConfig;

/// Default clock skew tolerance (60 seconds).
pub const DEFAULT_LEEWAY_SECS: u64 = 60;

/// Claims every token must carry.
const REQUIRED_CLAIMS: [&str; 3] = ["exp", "aud", "iss"];

/// Algorithms that may appear in the allow-list.
///
/// Keys come from the JWKS as RSA components, so HMAC and EC algorithms are
/// never usable and `none` is not representable.
pub const RSA_ALGORITHMS: [Algorithm; 6] = [
    Algorithm::RS256,
    Algorithm::RS384,
    Algorithm::RS512,
    Algorithm::PS256,
    Algorithm::PS384,
    Algorithm::PS512,
];

/// Verifies bearer tokens issued by a single authority.
#[derive(Clone)]
pub struct TokenVerifier {
    jwks: JwksManager,
    issuer: String,
    audience: String,
    algorithms: Vec<Algorithm>,
    leeway: u64,
}

impl TokenVerifier {
    /// Create a verifier accepting RS256 tokens for `audience` from `issuer`.
    pub fn new(jwks: JwksManager, issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            jwks,
            issuer: issuer.into(),
            audience: audience.into(),
            algorithms: vec![Algorithm::RS256],
            leeway: DEFAULT_LEEWAY_SECS,
        }
    }

    /// Build the verifier and its JWKS manager from configuration.
    pub fn from_config(config: &AuthConfig) -> Result<Self, reqwest::Error> {
        let jwks = JwksManager::new(config.jwks_url.clone(), config.fetch_timeout)?
            .with_cache_ttl(config.cache_ttl)
            .with_min_refresh_interval(config.min_refresh_interval);

        Ok(Self::new(jwks, config.issuer.clone(), config.audience.clone())
            .with_algorithms(config.algorithms.clone())
            .with_leeway(config.leeway))
    }

    /// Replace the algorithm allow-list. Non-RSA algorithms are dropped.
    pub fn with_algorithms(mut self, algorithms: Vec<Algorithm>) -> Self {
        self.algorithms = algorithms
            .into_iter()
            .filter(|alg| RSA_ALGORITHMS.contains(alg))
            .collect();
        self
    }

    /// Set the clock skew tolerance in seconds.
    pub fn with_leeway(mut self, leeway: u64) -> Self {
        self.leeway = leeway;
        self
    }

    /// The JWKS manager backing this verifier.
    pub fn jwks(&self) -> &JwksManager {
        &self.jwks
    }

    /// Expected `iss` claim.
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Verify `token` and return its full claim set.
    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let header = decode_header(token).map_err(|_| AuthError::MalformedToken)?;

        if !self.algorithms.contains(&header.alg) {
            tracing::debug!(alg = ?header.alg, "Token algorithm not in allow-list");
            return Err(AuthError::MalformedToken);
        }

        let kid = header.kid.as_deref().ok_or(AuthError::UnknownSigningKey)?;
        let key = self.jwks.find_key(kid).await?;
        let decoding_key = key.decoding_key(header.alg)?;

        let mut validation = Validation::new(header.alg);
        validation.leeway = self.leeway;
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.set_required_spec_claims(&REQUIRED_CLAIMS);

        let token_data = decode::<Claims>(token, &decoding_key, &validation).map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            ErrorKind::InvalidAudience
            | ErrorKind::InvalidIssuer
            | ErrorKind::ImmatureSignature
            | ErrorKind::MissingRequiredClaim(_) => AuthError::ClaimValidationFailed,
            _ => AuthError::MalformedToken,
        })?;

        Ok(token_data.claims)
    }
}
