// ABOUTME: Integration tests for account, token, avatar, and profile routes
// ABOUTME: Exercises registration validation, login/logout, password change, and avatars over HTTP
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use axum::http::StatusCode;
use common::{TestApp, PASSWORD, PNG_DATA_URI, PUBLIC_BASE_URL};
use helpers::axum_test::AxumTestRequest;
use serde_json::{json, Value};

fn registration(username: &str) -> Value {
    json!({
        "email": format!("{username}@example.com"),
        "username": username,
        "first_name": "Ivan",
        "last_name": "Petrov",
        "password": PASSWORD,
    })
}

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn test_register_returns_public_fields() {
    let app = TestApp::new().await;

    let body: Value = AxumTestRequest::post("/api/users")
        .json(&registration("chef"))
        .send(app.app())
        .await
        .assert_status(StatusCode::CREATED)
        .json();

    assert_eq!(body["email"], "chef@example.com");
    assert_eq!(body["username"], "chef");
    assert_eq!(body["first_name"], "Ivan");
    assert!(body["id"].as_i64().unwrap() > 0);
    assert!(body.get("password").is_none());
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_rejects_duplicates() {
    let app = TestApp::new().await;
    app.register("chef").await;

    let mut same_email = registration("other");
    same_email["email"] = json!("CHEF@example.com");
    let body: Value = AxumTestRequest::post("/api/users")
        .json(&same_email)
        .send(app.app())
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .json();
    assert!(body["error"]["details"].get("email").is_some());

    let mut same_username = registration("chef");
    same_username["email"] = json!("fresh@example.com");
    let body: Value = AxumTestRequest::post("/api/users")
        .json(&same_username)
        .send(app.app())
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .json();
    assert!(body["error"]["details"].get("username").is_some());
}

#[tokio::test]
async fn test_register_reports_every_bad_field() {
    let app = TestApp::new().await;

    let body: Value = AxumTestRequest::post("/api/users")
        .json(&json!({
            "email": "not-an-email",
            "username": "bad name!",
            "password": "12345678",
        }))
        .send(app.app())
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .json();

    let details = &body["error"]["details"];
    for field in ["email", "username", "first_name", "last_name", "password"] {
        assert!(details.get(field).is_some(), "missing error for {field}: {body}");
    }
}

// ============================================================================
// Tokens
// ============================================================================

#[tokio::test]
async fn test_login_with_bad_credentials_is_400() {
    let app = TestApp::new().await;
    app.register("chef").await;

    AxumTestRequest::post("/api/auth/token/login")
        .json(&json!({ "email": "chef@example.com", "password": "wrong-password" }))
        .send(app.app())
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    AxumTestRequest::post("/api/auth/token/login")
        .json(&json!({ "email": "nobody@example.com", "password": PASSWORD }))
        .send(app.app())
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_token_and_bearer_schemes_are_accepted() {
    let app = TestApp::new().await;
    let (id, token) = app.register("chef").await;

    let body: Value = AxumTestRequest::get("/api/users/me")
        .token(&token)
        .send(app.app())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(body["id"], id);
    assert_eq!(body["is_subscribed"], false);

    AxumTestRequest::get("/api/users/me")
        .header("authorization", &format!("Bearer {token}"))
        .send(app.app())
        .await
        .assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_logout_revokes_token() {
    let app = TestApp::new().await;
    let (_, token) = app.register("chef").await;

    AxumTestRequest::post("/api/auth/token/logout")
        .token(&token)
        .send(app.app())
        .await
        .assert_status(StatusCode::NO_CONTENT);

    AxumTestRequest::get("/api/users/me")
        .token(&token)
        .send(app.app())
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    // A new login still works
    let fresh = app.login("chef@example.com").await;
    AxumTestRequest::get("/api/users/me")
        .token(&fresh)
        .send(app.app())
        .await
        .assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_anonymous_and_invalid_tokens() {
    let app = TestApp::new().await;

    AxumTestRequest::get("/api/users/me")
        .send(app.app())
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    // Public endpoint, but a presented garbage token is still rejected
    AxumTestRequest::get("/api/users")
        .token("garbage")
        .send(app.app())
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    AxumTestRequest::get("/api/users")
        .send(app.app())
        .await
        .assert_status(StatusCode::OK);
}

// ============================================================================
// Profiles
// ============================================================================

#[tokio::test]
async fn test_user_list_is_paginated_with_absolute_links() {
    let app = TestApp::new().await;
    for name in ["a1", "a2", "a3"] {
        app.register(name).await;
    }

    let body: Value = AxumTestRequest::get("/api/users?limit=2")
        .send(app.app())
        .await
        .assert_status(StatusCode::OK)
        .json();

    assert_eq!(body["count"], 3);
    assert_eq!(body["results"].as_array().unwrap().len(), 2);
    assert_eq!(body["results"][0]["username"], "a1");
    assert!(body["previous"].is_null());
    let next = body["next"].as_str().unwrap();
    assert!(next.starts_with(&format!("{PUBLIC_BASE_URL}/api/users?")));
    assert!(next.contains("page=2"));
    assert!(next.contains("limit=2"));

    let body: Value = AxumTestRequest::get("/api/users?limit=2&page=2")
        .send(app.app())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(body["results"].as_array().unwrap().len(), 1);
    assert!(body["next"].is_null());
    assert!(!body["previous"].as_str().unwrap().contains("page="));
}

#[tokio::test]
async fn test_get_user_by_id() {
    let app = TestApp::new().await;
    let (id, _) = app.register("chef").await;

    let body: Value = AxumTestRequest::get(&format!("/api/users/{id}"))
        .send(app.app())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(body["username"], "chef");
    assert!(body["avatar"].is_null());

    AxumTestRequest::get("/api/users/9999")
        .send(app.app())
        .await
        .assert_status(StatusCode::NOT_FOUND);
    AxumTestRequest::get("/api/users/abc")
        .send(app.app())
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_set_password() {
    let app = TestApp::new().await;
    let (_, token) = app.register("chef").await;

    AxumTestRequest::post("/api/users/set_password")
        .token(&token)
        .json(&json!({ "current_password": "not-it-at-all", "new_password": "brand-new-pass" }))
        .send(app.app())
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    AxumTestRequest::post("/api/users/set_password")
        .token(&token)
        .json(&json!({ "current_password": PASSWORD, "new_password": "brand-new-pass" }))
        .send(app.app())
        .await
        .assert_status(StatusCode::NO_CONTENT);

    AxumTestRequest::post("/api/auth/token/login")
        .json(&json!({ "email": "chef@example.com", "password": PASSWORD }))
        .send(app.app())
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    AxumTestRequest::post("/api/auth/token/login")
        .json(&json!({ "email": "chef@example.com", "password": "brand-new-pass" }))
        .send(app.app())
        .await
        .assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_avatar_upload_and_delete() {
    let app = TestApp::new().await;
    let (id, token) = app.register("chef").await;

    let body: Value = AxumTestRequest::put("/api/users/me/avatar")
        .token(&token)
        .json(&json!({ "avatar": PNG_DATA_URI }))
        .send(app.app())
        .await
        .assert_status(StatusCode::OK)
        .json();
    let url = body["avatar"].as_str().unwrap().to_owned();
    assert!(url.starts_with(&format!("{PUBLIC_BASE_URL}/media/users/avatars/")));
    assert!(url.ends_with(".png"));

    let relative = url.trim_start_matches(&format!("{PUBLIC_BASE_URL}/media/"));
    assert!(app.media_root().join(relative).exists());

    let profile: Value = AxumTestRequest::get(&format!("/api/users/{id}"))
        .send(app.app())
        .await
        .json();
    assert_eq!(profile["avatar"], url.as_str());

    AxumTestRequest::delete("/api/users/me/avatar")
        .token(&token)
        .send(app.app())
        .await
        .assert_status(StatusCode::NO_CONTENT);
    assert!(!app.media_root().join(relative).exists());

    AxumTestRequest::put("/api/users/me/avatar")
        .token(&token)
        .json(&json!({ "avatar": "not a data uri" }))
        .send(app.app())
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}
