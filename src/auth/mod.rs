// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Bearer token verification and scope permissions for the Drinks API.
//!
//! ## Auth Flow
//!
//! 1. The client obtains an access token from the external issuer
//! 2. The client sends `Authorization: Bearer <token>`
//! 3. The route's [`AuthGuard`]:
//!    - Extracts the token from the header
//!    - Fetches the issuer JWKS via HTTPS (cached)
//!    - Verifies the RS256 signature, expiry, issuer and audience
//!    - Checks the `scope` claim for the route's permission
//! 4. The handler receives the decoded [`Claims`]
//!
//! ## Security
//!
//! - Only allow-listed RSA algorithms are accepted
//! - Tokens signed by a key missing from the JWKS are rejected
//! - JWKS fetches are bounded by a timeout and cached with a TTL
//! - Clock skew tolerance defaults to 60 seconds

pub mod claims;
pub mod error;
pub mod extractor;
pub mod jwks;
pub mod middleware;
pub mod permissions;
pub mod verifier;

#[cfg(test)]
pub(crate) mod testing;

pub use claims::Claims;
pub use error::AuthError;
pub use extractor::bearer_token;
pub use jwks::{JwksManager, KeySet, SigningKey};
pub use middleware::{require_permission, AuthGuard};
pub use permissions::check_permissions;
pub use verifier::TokenVerifier;
