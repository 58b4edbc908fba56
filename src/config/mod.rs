// ABOUTME: Configuration management module for centralized server settings
// ABOUTME: Environment-driven settings for HTTP, database, auth, and media storage
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Environment and server configuration
pub mod environment;

pub use environment::{AuthConfig, DatabaseUrl, Environment, MediaConfig, ServerConfig};
