// ABOUTME: Shared server state handed to every router
// ABOUTME: Bundles the database, auth components, media store, and configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use crate::auth::AuthManager;
use crate::config::environment::ServerConfig;
use crate::database::Database;
use crate::media::MediaStore;
use crate::middleware::auth::AuthMiddleware;

/// Centralized resource container for dependency injection
///
/// Built once at startup and shared as `Arc<ServerResources>` axum state.
#[derive(Clone)]
pub struct ServerResources {
    /// Database handle
    pub database: Arc<Database>,
    /// Token issuance and password hashing
    pub auth_manager: Arc<AuthManager>,
    /// Authorization header resolution
    pub auth_middleware: Arc<AuthMiddleware>,
    /// Uploaded image storage
    pub media: Arc<MediaStore>,
    /// Server configuration
    pub config: Arc<ServerConfig>,
}

impl ServerResources {
    /// Wire resources together from a connected database and configuration
    #[must_use]
    pub fn new(database: Database, config: ServerConfig) -> Self {
        let auth_manager = AuthManager::new(&config.auth);
        let auth_middleware = AuthMiddleware::new(auth_manager.clone(), database.clone());
        let media = MediaStore::new(&config.media, &config.public_base_url);

        Self {
            database: Arc::new(database),
            auth_manager: Arc::new(auth_manager),
            auth_middleware: Arc::new(auth_middleware),
            media: Arc::new(media),
            config: Arc::new(config),
        }
    }
}
