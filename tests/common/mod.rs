// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Builds in-memory server resources and registers users, ingredients, and recipes over HTTP
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]

use std::path::PathBuf;
use std::sync::{Arc, Once};

use axum::http::StatusCode;
use axum::Router;
use foodgram_server::{
    config::environment::{
        AuthConfig, DatabaseUrl, Environment, MediaConfig, ServerConfig,
    },
    database::Database,
    models::NewIngredient,
    resources::ServerResources,
    server::build_app,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower_http::normalize_path::NormalizePath;

use crate::helpers::axum_test::AxumTestRequest;

/// 1x1 transparent PNG
pub const PNG_DATA_URI: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR4nGNgYGD4DwABBAEAwS2OUAAAAABJRU5ErkJggg==";

/// Base URL rendered into absolute links
pub const PUBLIC_BASE_URL: &str = "http://testserver";

/// Password used by every registered test user
pub const PASSWORD: &str = "s3cure-pass";

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        let _ = tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .try_init();
    });
}

/// Server resources backed by an in-memory database and a temporary media root
pub struct TestApp {
    /// Shared state handed to the routers
    pub resources: Arc<ServerResources>,
    media_dir: TempDir,
}

impl TestApp {
    /// Fresh app with an empty database
    pub async fn new() -> Self {
        init_test_logging();

        let media_dir = tempfile::tempdir().unwrap();
        let config = test_config(media_dir.path().to_path_buf());
        let database = Database::new(&DatabaseUrl::Memory, 1).await.unwrap();

        Self {
            resources: Arc::new(ServerResources::new(database, config)),
            media_dir,
        }
    }

    /// The full application, including trailing-slash normalization
    pub fn app(&self) -> NormalizePath<Router> {
        build_app(Arc::clone(&self.resources))
    }

    /// Media root on disk
    pub fn media_root(&self) -> PathBuf {
        self.media_dir.path().to_path_buf()
    }

    /// Register a user over HTTP and log in, returning `(id, token)`
    pub async fn register(&self, username: &str) -> (i64, String) {
        let body: Value = AxumTestRequest::post("/api/users")
            .json(&json!({
                "email": format!("{username}@example.com"),
                "username": username,
                "first_name": "Test",
                "last_name": "Cook",
                "password": PASSWORD,
            }))
            .send(self.app())
            .await
            .assert_status(StatusCode::CREATED)
            .json();
        let id = body["id"].as_i64().unwrap();

        (id, self.login(&format!("{username}@example.com")).await)
    }

    /// Log in with the shared test password
    pub async fn login(&self, email: &str) -> String {
        let body: Value = AxumTestRequest::post("/api/auth/token/login")
            .json(&json!({ "email": email, "password": PASSWORD }))
            .send(self.app())
            .await
            .assert_status(StatusCode::OK)
            .json();
        body["auth_token"].as_str().unwrap().to_owned()
    }

    /// Insert a catalog ingredient directly and return its id
    pub async fn ingredient(&self, name: &str, unit: &str) -> i64 {
        let ingredients = self.resources.database.ingredients();
        ingredients
            .create_if_missing(&NewIngredient {
                name: name.to_owned(),
                measurement_unit: unit.to_owned(),
            })
            .await
            .unwrap();
        ingredients
            .search(Some(name))
            .await
            .unwrap()
            .into_iter()
            .find(|i| i.name == name && i.measurement_unit == unit)
            .unwrap()
            .id
    }

    /// Publish a recipe over HTTP, returning its id
    pub async fn recipe(&self, token: &str, name: &str, ingredients: &[(i64, i64)]) -> i64 {
        let body: Value = AxumTestRequest::post("/api/recipes")
            .token(token)
            .json(&recipe_body(name, ingredients))
            .send(self.app())
            .await
            .assert_status(StatusCode::CREATED)
            .json();
        body["id"].as_i64().unwrap()
    }
}

/// Valid create body for a recipe
pub fn recipe_body(name: &str, ingredients: &[(i64, i64)]) -> Value {
    json!({
        "ingredients": ingredients
            .iter()
            .map(|(id, amount)| json!({ "id": id, "amount": amount }))
            .collect::<Vec<_>>(),
        "image": PNG_DATA_URI,
        "name": name,
        "text": format!("How to cook {name}"),
        "cooking_time": 15,
    })
}

fn test_config(media_root: PathBuf) -> ServerConfig {
    ServerConfig {
        environment: Environment::Testing,
        http_host: "127.0.0.1".to_owned(),
        http_port: 0,
        database_url: DatabaseUrl::Memory,
        database_max_connections: 1,
        auth: AuthConfig {
            jwt_secret: b"integration-test-secret-with-enough-bytes".to_vec(),
            jwt_expiry_hours: 24,
            bcrypt_cost: 4,
        },
        media: MediaConfig {
            root: media_root,
            url_prefix: "/media/".to_owned(),
        },
        public_base_url: PUBLIC_BASE_URL.to_owned(),
        cors_allowed_origins: vec!["*".to_owned()],
        max_request_body_bytes: 10 * 1024 * 1024,
    }
}
