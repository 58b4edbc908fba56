// ABOUTME: HTTP middleware for request authentication and cross-origin access
// ABOUTME: Token resolution lives here; handlers call it explicitly
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Authorization header resolution
pub mod auth;
/// CORS layer configuration
pub mod cors;

pub use auth::{AuthMiddleware, AuthResult};
pub use cors::setup_cors;
