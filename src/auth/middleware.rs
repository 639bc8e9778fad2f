// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Permission guard middleware for Axum.
//!
//! Each protected handler is wrapped with its own [`AuthGuard`] carrying the
//! permission it requires:
//!
//! ```rust,ignore
//! let guard = AuthGuard::new(verifier.clone(), "post:drinks");
//!
//! let app = Router::new().route(
//!     "/drinks",
//!     post(create_drink.layer(middleware::from_fn_with_state(guard, require_permission))),
//! );
//! ```
//!
//! On success the verified [`Claims`] are placed in the request extensions,
//! where the handler picks them up with `Extension<Claims>`. On failure the
//! [`AuthError`] becomes the response and the handler never runs.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::{bearer_token, check_permissions, AuthError, Claims, TokenVerifier};

/// Verifier plus the permission a route requires.
#[derive(Clone)]
pub struct AuthGuard {
    verifier: Arc<TokenVerifier>,
    permission: &'static str,
}

impl AuthGuard {
    pub fn new(verifier: Arc<TokenVerifier>, permission: &'static str) -> Self {
        Self {
            verifier,
            permission,
        }
    }

    /// Permission this guard enforces.
    pub fn permission(&self) -> &'static str {
        self.permission
    }

    /// Run extraction, verification and the permission check.
    pub async fn authorize(&self, headers: &HeaderMap) -> Result<Claims, AuthError> {
        let token = bearer_token(headers)?;
        let claims = self.verifier.verify(token).await?;
        check_permissions(self.permission, &claims)?;
        Ok(claims)
    }
}

/// Middleware function enforcing an [`AuthGuard`].
pub async fn require_permission(
    State(guard): State<AuthGuard>,
    mut request: Request,
    next: Next,
) -> Response {
    match guard.authorize(request.headers()).await {
        Ok(claims) => {
            tracing::debug!(
                permission = guard.permission,
                sub = claims.subject().unwrap_or_default(),
                "Request authorized"
            );
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(e) => {
            tracing::warn!(
                permission = guard.permission,
                error_code = e.error_code(),
                status = e.status_code().as_u16(),
                method = %request.method(),
                path = request.uri().path(),
                "Request rejected"
            );
            e.into_response()
        }
    }
}
