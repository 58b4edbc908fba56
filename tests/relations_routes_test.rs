// ABOUTME: Integration tests for favorites, shopping cart, subscriptions, and the shopping-list download
// ABOUTME: Checks duplicate/missing relation errors and the aggregated plain-text report
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use axum::http::StatusCode;
use common::TestApp;
use helpers::axum_test::AxumTestRequest;
use serde_json::Value;

// ============================================================================
// Favorites and shopping cart
// ============================================================================

#[tokio::test]
async fn test_favorite_twice_and_remove_missing_are_400() {
    let app = TestApp::new().await;
    let (_, token) = app.register("cook").await;
    let flour = app.ingredient("Мука", "г").await;
    let id = app.recipe(&token, "Хлеб", &[(flour, 500)]).await;
    let url = format!("/api/recipes/{id}/favorite");

    let body: Value = AxumTestRequest::post(&url)
        .token(&token)
        .send(app.app())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    assert_eq!(body["id"], id);
    assert_eq!(body["name"], "Хлеб");
    assert_eq!(body["cooking_time"], 15);
    assert!(body.get("ingredients").is_none());

    AxumTestRequest::post(&url)
        .token(&token)
        .send(app.app())
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    AxumTestRequest::delete(&url)
        .token(&token)
        .send(app.app())
        .await
        .assert_status(StatusCode::NO_CONTENT);

    AxumTestRequest::delete(&url)
        .token(&token)
        .send(app.app())
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    AxumTestRequest::post("/api/recipes/9999/favorite")
        .token(&token)
        .send(app.app())
        .await
        .assert_status(StatusCode::NOT_FOUND);

    AxumTestRequest::post(&url)
        .send(app.app())
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_relation_lists_are_per_user() {
    let app = TestApp::new().await;
    let (_, alice) = app.register("alice").await;
    let (_, bob) = app.register("bob").await;
    let flour = app.ingredient("Мука", "г").await;
    let bread = app.recipe(&alice, "Хлеб", &[(flour, 500)]).await;
    let cake = app.recipe(&alice, "Торт", &[(flour, 300)]).await;

    for id in [bread, cake] {
        AxumTestRequest::post(&format!("/api/recipes/{id}/shopping_cart"))
            .token(&bob)
            .send(app.app())
            .await
            .assert_status(StatusCode::CREATED);
    }

    let body: Value = AxumTestRequest::get("/api/recipes/shopping_cart")
        .token(&bob)
        .send(app.app())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(body["count"], 2);
    assert!(body["results"][0]["image"].as_str().unwrap().starts_with("http"));

    let body: Value = AxumTestRequest::get("/api/recipes/shopping_cart")
        .token(&alice)
        .send(app.app())
        .await
        .json();
    assert_eq!(body["count"], 0);

    let body: Value = AxumTestRequest::get("/api/recipes/favorites")
        .token(&bob)
        .send(app.app())
        .await
        .json();
    assert_eq!(body["count"], 0);

    let recipe: Value = AxumTestRequest::get(&format!("/api/recipes/{cake}"))
        .token(&bob)
        .send(app.app())
        .await
        .json();
    assert_eq!(recipe["is_in_shopping_cart"], true);
    assert_eq!(recipe["is_favorited"], false);
}

// ============================================================================
// Shopping list download
// ============================================================================

#[tokio::test]
async fn test_download_aggregates_cart() {
    let app = TestApp::new().await;
    let (_, token) = app.register("cook").await;
    let flour = app.ingredient("Мука", "г").await;
    let sugar = app.ingredient("Сахар", "г").await;

    let a = app.recipe(&token, "Рецепт A", &[(sugar, 50), (flour, 200)]).await;
    let b = app.recipe(&token, "Рецепт B", &[(flour, 100)]).await;
    for id in [a, b] {
        AxumTestRequest::post(&format!("/api/recipes/{id}/shopping_cart"))
            .token(&token)
            .send(app.app())
            .await
            .assert_status(StatusCode::CREATED);
    }

    let response = AxumTestRequest::get("/api/recipes/download_shopping_cart")
        .token(&token)
        .send(app.app())
        .await
        .assert_status(StatusCode::OK);
    assert_eq!(
        response.header("content-type").as_deref(),
        Some("text/plain; charset=utf-8")
    );
    assert_eq!(
        response.header("content-disposition").as_deref(),
        Some("attachment; filename=\"shopping_list.txt\"")
    );

    let text = response.text();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "Список покупок:");
    assert_eq!(&lines[1..], ["Мука (г) — 300", "Сахар (г) — 50"]);
}

#[tokio::test]
async fn test_download_with_empty_cart_is_400() {
    let app = TestApp::new().await;
    let (_, token) = app.register("cook").await;

    AxumTestRequest::get("/api/recipes/download_shopping_cart")
        .token(&token)
        .send(app.app())
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    AxumTestRequest::get("/api/recipes/download_shopping_cart")
        .send(app.app())
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Subscriptions
// ============================================================================

#[tokio::test]
async fn test_subscribe_rules() {
    let app = TestApp::new().await;
    let (me, token) = app.register("reader").await;
    let (author, _) = app.register("writer").await;

    AxumTestRequest::post(&format!("/api/users/{me}/subscribe"))
        .token(&token)
        .send(app.app())
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    AxumTestRequest::post("/api/users/9999/subscribe")
        .token(&token)
        .send(app.app())
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let body: Value = AxumTestRequest::post(&format!("/api/users/{author}/subscribe"))
        .token(&token)
        .send(app.app())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    assert_eq!(body["id"], author);
    assert_eq!(body["is_subscribed"], true);
    assert_eq!(body["recipes_count"], 0);

    AxumTestRequest::post(&format!("/api/users/{author}/subscribe"))
        .token(&token)
        .send(app.app())
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let profile: Value = AxumTestRequest::get(&format!("/api/users/{author}"))
        .token(&token)
        .send(app.app())
        .await
        .json();
    assert_eq!(profile["is_subscribed"], true);

    AxumTestRequest::delete(&format!("/api/users/{author}/subscribe"))
        .token(&token)
        .send(app.app())
        .await
        .assert_status(StatusCode::NO_CONTENT);

    AxumTestRequest::delete(&format!("/api/users/{author}/subscribe"))
        .token(&token)
        .send(app.app())
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_subscriptions_list_truncates_recipes() {
    let app = TestApp::new().await;
    let (_, reader) = app.register("reader").await;
    let (author, writer) = app.register("writer").await;
    let flour = app.ingredient("Мука", "г").await;
    for name in ["Один", "Два", "Три"] {
        app.recipe(&writer, name, &[(flour, 100)]).await;
    }

    AxumTestRequest::post(&format!("/api/users/{author}/subscribe"))
        .token(&reader)
        .send(app.app())
        .await
        .assert_status(StatusCode::CREATED);

    let body: Value = AxumTestRequest::get("/api/users/subscriptions?recipes_limit=2")
        .token(&reader)
        .send(app.app())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(body["count"], 1);
    let entry = &body["results"][0];
    assert_eq!(entry["username"], "writer");
    assert_eq!(entry["recipes_count"], 3);
    let recipes = entry["recipes"].as_array().unwrap();
    assert_eq!(recipes.len(), 2);
    assert_eq!(recipes[0]["name"], "Три");

    let body: Value = AxumTestRequest::get("/api/users/subscriptions")
        .token(&reader)
        .send(app.app())
        .await
        .json();
    assert_eq!(body["results"][0]["recipes"].as_array().unwrap().len(), 3);

    AxumTestRequest::get("/api/users/subscriptions?recipes_limit=lots")
        .token(&reader)
        .send(app.app())
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}
