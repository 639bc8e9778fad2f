// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

mod support;

use axum::http::StatusCode;
use chrono::Utc;
use serde_json::json;
use support::{latte, token, token_with_scope, TestApp, AUDIENCE, ISSUER};

const ALL_SCOPES: &str = "get:drinks-detail post:drinks patch:drinks delete:drinks";

#[tokio::test]
async fn public_menu_needs_no_token() {
    let app = TestApp::spawn().await;

    let (status, body) = app.send("GET", "/drinks", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["drinks"], json!([]));
}

#[tokio::test]
async fn write_without_header_is_unauthorized() {
    let app = TestApp::spawn().await;

    let (status, body) = app.send("POST", "/drinks", None, Some(latte())).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "missing_header");
}

#[tokio::test]
async fn token_without_permission_is_forbidden() {
    let app = TestApp::spawn().await;
    let token = token_with_scope("get:drinks-detail");

    let (status, body) = app
        .send("POST", "/drinks", Some(&token), Some(latte()))
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "permission_denied");

    let (_, menu) = app.send("GET", "/drinks", None, None).await;
    assert_eq!(menu["drinks"], json!([]));
}

#[tokio::test]
async fn token_without_scope_claim_is_forbidden() {
    let app = TestApp::spawn().await;
    let now = Utc::now().timestamp();
    let token = token(&json!({
        "iss": ISSUER,
        "sub": "auth0|guest",
        "aud": AUDIENCE,
        "exp": now + 600
    }));

    let (status, body) = app.send("GET", "/drinks-detail", Some(&token), None).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "no_permissions");
}

#[tokio::test]
async fn expired_token_is_unauthorized() {
    let app = TestApp::spawn().await;
    let now = Utc::now().timestamp();
    let token = token(&json!({
        "iss": ISSUER,
        "sub": "auth0|barista",
        "aud": AUDIENCE,
        "exp": now - 3600,
        "scope": ALL_SCOPES
    }));

    let (status, body) = app.send("GET", "/drinks-detail", Some(&token), None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "token_expired");
}

#[tokio::test]
async fn token_for_other_audience_is_unauthorized() {
    let app = TestApp::spawn().await;
    let now = Utc::now().timestamp();
    let token = token(&json!({
        "iss": ISSUER,
        "sub": "auth0|barista",
        "aud": "another-api",
        "exp": now + 600,
        "scope": ALL_SCOPES
    }));

    let (status, body) = app.send("GET", "/drinks-detail", Some(&token), None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "claim_validation_failed");
}

#[tokio::test]
async fn drink_lifecycle_with_scoped_token() {
    let app = TestApp::spawn().await;
    let token = token_with_scope(ALL_SCOPES);

    let (status, created) = app
        .send("POST", "/drinks", Some(&token), Some(latte()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["success"], true);
    let id = created["drinks"][0]["id"].as_u64().expect("drink id");
    assert_eq!(created["drinks"][0]["recipe"][0]["name"], "espresso");

    let (status, menu) = app.send("GET", "/drinks", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        menu["drinks"],
        json!([{
            "id": id,
            "title": "Latte",
            "recipe": [
                { "color": "brown", "parts": 1 },
                { "color": "white", "parts": 3 }
            ]
        }])
    );

    let (status, detail) = app.send("GET", "/drinks-detail", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["drinks"][0]["recipe"][1]["name"], "milk");

    let (status, updated) = app
        .send(
            "PATCH",
            &format!("/drinks/{id}"),
            Some(&token),
            Some(json!({ "title": "Flat White" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["drinks"][0]["title"], "Flat White");
    assert_eq!(updated["drinks"][0]["recipe"][1]["parts"], 3);

    let (status, deleted) = app
        .send("DELETE", &format!("/drinks/{id}"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted, json!({ "success": true, "delete": id }));

    let (_, menu) = app.send("GET", "/drinks", None, None).await;
    assert_eq!(menu["drinks"], json!([]));
}

#[tokio::test]
async fn missing_drink_is_not_found() {
    let app = TestApp::spawn().await;
    let token = token_with_scope(ALL_SCOPES);

    let (status, body) = app
        .send(
            "PATCH",
            "/drinks/404",
            Some(&token),
            Some(json!({ "title": "Ghost" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], 404);

    let (status, _) = app
        .send("DELETE", "/drinks/not-a-number", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_drink_is_unprocessable() {
    let app = TestApp::spawn().await;
    let token = token_with_scope("post:drinks");

    let (status, body) = app
        .send(
            "POST",
            "/drinks",
            Some(&token),
            Some(json!({ "title": "Air", "recipe": [] })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], 422);

    app.send("POST", "/drinks", Some(&token), Some(latte())).await;
    let (status, _) = app
        .send("POST", "/drinks", Some(&token), Some(latte()))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn key_set_is_fetched_once_across_requests() {
    let app = TestApp::spawn().await;
    let token = token_with_scope(ALL_SCOPES);

    for _ in 0..3 {
        let (status, _) = app.send("GET", "/drinks-detail", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = app.send("GET", "/health/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["checks"]["jwks"], "ok");

    assert_eq!(app.jwks_fetches().await, 1);
}
