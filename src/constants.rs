// ABOUTME: Application constants re-exported from foodgram-core plus server-only values
// ABOUTME: Environment variable names and configuration defaults live here
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub use foodgram_core::constants::*;

/// Environment variable names read by `ServerConfig::from_env`
pub mod env_config {
    /// Bind address
    pub const HTTP_HOST: &str = "HTTP_HOST";
    /// Listen port
    pub const HTTP_PORT: &str = "HTTP_PORT";
    /// Database connection string
    pub const DATABASE_URL: &str = "DATABASE_URL";
    /// Pool size for file-backed databases
    pub const DATABASE_MAX_CONNECTIONS: &str = "DATABASE_MAX_CONNECTIONS";
    /// HS256 signing secret
    pub const JWT_SECRET: &str = "JWT_SECRET";
    /// Token lifetime in hours
    pub const JWT_EXPIRY_HOURS: &str = "JWT_EXPIRY_HOURS";
    /// bcrypt work factor
    pub const BCRYPT_COST: &str = "BCRYPT_COST";
    /// Directory uploaded images are written to
    pub const MEDIA_ROOT: &str = "MEDIA_ROOT";
    /// URL prefix the media directory is served under
    pub const MEDIA_URL: &str = "MEDIA_URL";
    /// Externally visible origin used for absolute links
    pub const PUBLIC_BASE_URL: &str = "PUBLIC_BASE_URL";
    /// Comma-separated CORS origins, or `*`
    pub const CORS_ALLOWED_ORIGINS: &str = "CORS_ALLOWED_ORIGINS";
    /// Request body cap in bytes
    pub const MAX_REQUEST_BODY_BYTES: &str = "MAX_REQUEST_BODY_BYTES";
    /// Deployment environment
    pub const ENVIRONMENT: &str = "ENVIRONMENT";
}

/// Configuration defaults
pub mod defaults {
    /// Default bind address
    pub const HTTP_HOST: &str = "0.0.0.0";
    /// Default listen port
    pub const HTTP_PORT: u16 = 8000;
    /// Default database location
    pub const DATABASE_URL: &str = "sqlite:./data/foodgram.db";
    /// Default pool size
    pub const DATABASE_MAX_CONNECTIONS: u32 = 5;
    /// Default token lifetime
    pub const JWT_EXPIRY_HOURS: i64 = 24;
    /// Default media directory
    pub const MEDIA_ROOT: &str = "./media";
    /// Default media URL prefix
    pub const MEDIA_URL: &str = "/media/";
    /// Default public origin
    pub const PUBLIC_BASE_URL: &str = "http://localhost:8000";
    /// Default request body cap (base64 images inflate by a third)
    pub const MAX_REQUEST_BODY_BYTES: usize = 10 * 1024 * 1024;
}
