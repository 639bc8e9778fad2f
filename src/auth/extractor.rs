// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer token extraction from request headers.

use axum::http::{header::AUTHORIZATION, HeaderMap};

use super::AuthError;

/// Authorization scheme accepted by the API (compared case-insensitively).
const BEARER_SCHEME: &str = "bearer";

/// Extract the bearer token from the `Authorization` header.
///
/// The header must contain exactly two whitespace-separated parts, a scheme
/// equal to `Bearer` (any case) followed by the credential.
///
/// # Example
///
/// ```rust,ignore
/// let token = bearer_token(request.headers())?;
/// ```
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingHeader)?
        .to_str()
        .map_err(|_| AuthError::MalformedHeader)?;

    let mut parts = header.split_ascii_whitespace();
    let (scheme, token) = match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) => (scheme, token),
        _ => return Err(AuthError::MalformedHeader),
    };

    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return Err(AuthError::MalformedHeader);
    }

    Ok(token)
}
