// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication and authorization errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Failure raised by any stage of the bearer token pipeline.
///
/// Header, key set and token problems map to `401 Unauthorized`; scope
/// problems map to `403 Forbidden`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No authorization header present
    #[error("Authorization header is required")]
    MissingHeader,
    /// Header is not `Bearer <token>`
    #[error("Authorization header must be in the form 'Bearer <token>'")]
    MalformedHeader,
    /// The issuer's key set could not be retrieved; the detail is for logs only
    #[error("Unable to retrieve signing keys")]
    KeySetUnavailable(String),
    /// Token key id is not in the issuer's key set
    #[error("Token was signed with an unknown key")]
    UnknownSigningKey,
    /// Token has expired
    #[error("Token has expired")]
    TokenExpired,
    /// Audience, issuer or another registered claim did not validate
    #[error("Invalid claims, please check the audience and issuer")]
    ClaimValidationFailed,
    /// Token could not be parsed or its signature did not verify
    #[error("Token could not be parsed")]
    MalformedToken,
    /// Claims carry no scope at all
    #[error("Token does not carry any permissions")]
    NoPermissions,
    /// Scope does not include the required permission
    #[error("Do not possess required permissions")]
    PermissionDenied,
}

#[derive(Serialize)]
struct AuthErrorBody {
    success: bool,
    error: &'static str,
    message: String,
}

impl AuthError {
    /// Stable machine-readable label for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingHeader => "missing_header",
            AuthError::MalformedHeader => "malformed_header",
            AuthError::KeySetUnavailable(_) => "key_set_unavailable",
            AuthError::UnknownSigningKey => "unknown_signing_key",
            AuthError::TokenExpired => "token_expired",
            AuthError::ClaimValidationFailed => "claim_validation_failed",
            AuthError::MalformedToken => "malformed_token",
            AuthError::NoPermissions => "no_permissions",
            AuthError::PermissionDenied => "permission_denied",
        }
    }

    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingHeader
            | AuthError::MalformedHeader
            | AuthError::KeySetUnavailable(_)
            | AuthError::UnknownSigningKey
            | AuthError::TokenExpired
            | AuthError::ClaimValidationFailed
            | AuthError::MalformedToken => StatusCode::UNAUTHORIZED,
            AuthError::NoPermissions | AuthError::PermissionDenied => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            success: false,
            error: self.error_code(),
            message: self.to_string(),
        });
        (status, body).into_response()
    }
}
