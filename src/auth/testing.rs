// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signing keys, tokens and a mock JWKS endpoint for auth tests.

use std::sync::OnceLock;
use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use httpmock::prelude::*;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use rsa::pkcs1::{EncodeRsaPrivateKey, LineEnding};
use rsa::rand_core::OsRng;
use rsa::traits::PublicKeyParts;
use rsa::RsaPrivateKey;
use serde_json::{json, Value};
use url::Url;

use super::{JwksManager, TokenVerifier};

pub const ISSUER: &str = "https://coffee-shop.test/";
pub const AUDIENCE: &str = "dev";
pub const KID: &str = "test-key";
pub const JWKS_PATH: &str = "/.well-known/jwks.json";

pub struct KeyMaterial {
    pub encoding: EncodingKey,
    pub modulus: String,
    pub exponent: String,
}

/// RSA key pair shared by every test in the binary.
pub fn key_material() -> &'static KeyMaterial {
    static KEYS: OnceLock<KeyMaterial> = OnceLock::new();
    KEYS.get_or_init(|| {
        let mut rng = OsRng;
        let private_key = RsaPrivateKey::new(&mut rng, 2048).expect("key generation");
        let public_key = private_key.to_public_key();
        let private_pem = private_key
            .to_pkcs1_pem(LineEnding::LF)
            .expect("private pem");

        KeyMaterial {
            encoding: EncodingKey::from_rsa_pem(private_pem.as_bytes()).expect("encoding key"),
            modulus: URL_SAFE_NO_PAD.encode(public_key.n().to_bytes_be()),
            exponent: URL_SAFE_NO_PAD.encode(public_key.e().to_bytes_be()),
        }
    })
}

/// JWKS document publishing the shared key under `kid`.
pub fn jwks_body(kid: &str) -> Value {
    let keys = key_material();
    json!({
        "keys": [{
            "kty": "RSA",
            "kid": kid,
            "use": "sig",
            "alg": "RS256",
            "n": keys.modulus,
            "e": keys.exponent
        }]
    })
}

/// Claims of a valid token granting `scope`.
pub fn valid_claims(scope: &str) -> Value {
    let now = Utc::now().timestamp();
    json!({
        "iss": ISSUER,
        "sub": "auth0|barista",
        "aud": AUDIENCE,
        "iat": now,
        "exp": now + 600,
        "scope": scope
    })
}

/// Sign `claims` with the shared key, advertising `kid`.
pub fn sign(claims: &Value, kid: &str) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(kid.to_string());
    encode(&header, claims, &key_material().encoding).expect("sign token")
}

/// Mock issuer serving the shared key under [`KID`].
pub async fn jwks_server() -> MockServer {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(JWKS_PATH);
            then.status(200).json_body(jwks_body(KID));
        })
        .await;
    server
}

/// Verifier pointed at `server` with the test issuer and audience.
pub fn verifier_for(server: &MockServer) -> TokenVerifier {
    let url = Url::parse(&server.url(JWKS_PATH)).expect("jwks url");
    let jwks = JwksManager::new(url, Duration::from_secs(2)).expect("http client");
    TokenVerifier::new(jwks, ISSUER, AUDIENCE)
}
