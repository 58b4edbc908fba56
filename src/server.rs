// ABOUTME: Router assembly and HTTP server lifecycle
// ABOUTME: Merges domain routers, mounts media, applies tower layers, handles graceful shutdown
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{extract::DefaultBodyLimit, extract::Request, Router, ServiceExt};
use tokio::net::TcpListener;
use tower::Layer;
use tower_http::{
    normalize_path::{NormalizePath, NormalizePathLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::info;

use crate::middleware::setup_cors;
use crate::resources::ServerResources;
use crate::routes::{AuthRoutes, IngredientRoutes, RecipeRoutes, UserRoutes};

/// Build the API router with media serving and the shared tower layers
pub fn build_router(resources: Arc<ServerResources>) -> Router {
    let config = Arc::clone(&resources.config);

    let mut router = Router::new()
        .merge(AuthRoutes::routes(Arc::clone(&resources)))
        .merge(IngredientRoutes::routes(Arc::clone(&resources)))
        .merge(RecipeRoutes::routes(Arc::clone(&resources)))
        .merge(UserRoutes::routes(Arc::clone(&resources)));

    let media_mount = config.media.url_prefix.trim_end_matches('/');
    if !media_mount.is_empty() {
        router = router.nest_service(media_mount, ServeDir::new(resources.media.root()));
    }

    router
        .layer(DefaultBodyLimit::max(config.max_request_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(setup_cors(&config))
}

/// Router wrapped so `/api/recipes/` and `/api/recipes` route identically
pub fn build_app(resources: Arc<ServerResources>) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(build_router(resources))
}

/// Bind the configured address and serve until ctrl-c or SIGTERM
///
/// # Errors
///
/// Returns an error if the listener cannot be bound or the server fails
pub async fn run(resources: Arc<ServerResources>) -> Result<()> {
    let addr = format!(
        "{}:{}",
        resources.config.http_host, resources.config.http_port
    );
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Foodgram API listening on http://{addr}");

    let app = build_app(resources);
    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server terminated with an error")?;

    info!("Foodgram API stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received ctrl-c, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
