// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared fixtures for the HTTP-level tests: an RSA signing key, a mock
//! issuer serving its JWKS, and request helpers against the router.

use std::sync::OnceLock;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use drinks_api::{
    api::router,
    auth::{JwksManager, TokenVerifier},
    state::AppState,
    store::InMemoryStore,
};
use httpmock::prelude::*;
use httpmock::Mock;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use rsa::pkcs1::{EncodeRsaPrivateKey, LineEnding};
use rsa::rand_core::OsRng;
use rsa::traits::PublicKeyParts;
use rsa::RsaPrivateKey;
use serde_json::{json, Value};
use tower::ServiceExt;
use url::Url;

pub const ISSUER: &str = "https://coffee-shop.test/";
pub const AUDIENCE: &str = "dev";
pub const KID: &str = "barista-key";
const JWKS_PATH: &str = "/.well-known/jwks.json";

struct Keys {
    encoding: EncodingKey,
    jwks: Value,
}

fn keys() -> &'static Keys {
    static KEYS: OnceLock<Keys> = OnceLock::new();
    KEYS.get_or_init(|| {
        let private_key = RsaPrivateKey::new(&mut OsRng, 2048).expect("key generation");
        let public_key = private_key.to_public_key();
        let pem = private_key
            .to_pkcs1_pem(LineEnding::LF)
            .expect("private pem");

        Keys {
            encoding: EncodingKey::from_rsa_pem(pem.as_bytes()).expect("encoding key"),
            jwks: json!({
                "keys": [{
                    "kty": "RSA",
                    "kid": KID,
                    "use": "sig",
                    "alg": "RS256",
                    "n": URL_SAFE_NO_PAD.encode(public_key.n().to_bytes_be()),
                    "e": URL_SAFE_NO_PAD.encode(public_key.e().to_bytes_be())
                }]
            }),
        }
    })
}

/// Signed RS256 token for `claims`.
pub fn token(claims: &Value) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(KID.to_string());
    encode(&header, claims, &keys().encoding).expect("sign token")
}

/// Token from the test issuer granting the space-separated `scope`.
pub fn token_with_scope(scope: &str) -> String {
    let now = Utc::now().timestamp();
    token(&json!({
        "iss": ISSUER,
        "sub": "auth0|barista",
        "aud": AUDIENCE,
        "iat": now,
        "exp": now + 600,
        "scope": scope
    }))
}

/// Router backed by an empty store and a mock issuer.
pub struct TestApp {
    pub server: MockServer,
    pub router: Router,
    jwks_mock: usize,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let server = MockServer::start_async().await;
        let jwks_mock = server
            .mock_async(|when, then| {
                when.method(GET).path(JWKS_PATH);
                then.status(200).json_body(keys().jwks.clone());
            })
            .await
            .id;

        let url = Url::parse(&server.url(JWKS_PATH)).expect("jwks url");
        let jwks = JwksManager::new(url, Duration::from_secs(2)).expect("http client");
        let verifier = TokenVerifier::new(jwks, ISSUER, AUDIENCE);
        let router = router(AppState::new(InMemoryStore::new(), verifier));

        Self {
            server,
            router,
            jwks_mock,
        }
    }

    /// Number of times the issuer's JWKS endpoint was fetched.
    pub async fn jwks_fetches(&self) -> usize {
        Mock::new(self.jwks_mock, &self.server).hits_async().await
    }

    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let response = self.router.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }
}

pub fn latte() -> Value {
    json!({
        "title": "Latte",
        "recipe": [
            { "name": "espresso", "color": "brown", "parts": 1 },
            { "name": "milk", "color": "white", "parts": 3 }
        ]
    })
}
