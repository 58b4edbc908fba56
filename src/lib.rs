// ABOUTME: Main library entry point for the Foodgram recipe-sharing server
// ABOUTME: Provides REST endpoints for users, recipes, ingredients, and relations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Foodgram Server
//!
//! A recipe-sharing REST API. Users publish recipes built from a shared
//! ingredient catalog, bookmark recipes as favorites, queue them in a
//! shopping cart, subscribe to other authors, and download an aggregated
//! shopping list for everything in their cart.
//!
//! ## Architecture
//!
//! - **Routes**: thin axum handlers grouped per domain
//! - **Services**: validation and the shopping-list aggregator
//! - **Database**: one manager per domain over a shared `SqlitePool`
//! - **Auth**: `JWT` issuance/validation and request authentication
//! - **Media**: base64 image persistence under a served media root
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use foodgram_server::config::environment::ServerConfig;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("Foodgram configured on port {}", config.http_port);
//!     Ok(())
//! }
//! ```

/// `JWT` issuance, validation, and password hashing
pub mod auth;

/// Environment-driven configuration
pub mod config;

/// Application constants
pub mod constants;

/// `SQLite` schema and per-domain database managers
pub mod database;

/// Unified error handling re-exported from `foodgram-core`
pub mod errors;

/// Structured logging setup
pub mod logging;

/// Base64 image persistence for recipe images and avatars
pub mod media;

/// Request authentication
pub mod middleware;

/// Domain models
pub mod models;

/// Page-number pagination types and link rendering
pub mod pagination;

/// Shared server state handed to every router
pub mod resources;

/// `HTTP` route handlers organized by domain
pub mod routes;

/// Router assembly and server lifecycle
pub mod server;

/// Domain service layer: validation and shopping-list aggregation
pub mod services;
