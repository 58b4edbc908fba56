// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Parses environment variables into a typed ServerConfig with safe defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment-based configuration management

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::auth::generate_jwt_secret;
use crate::constants::{defaults, env_config};

/// Environment type for security and other configurations
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Live deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Type-safe database location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatabaseUrl {
    /// `SQLite` database file
    SQLite {
        /// File path
        path: PathBuf,
    },
    /// In-memory `SQLite` (tests and throwaway runs)
    Memory,
}

impl DatabaseUrl {
    /// Parse from string with validation
    ///
    /// # Errors
    ///
    /// Returns an error for URL schemes other than `sqlite:`
    pub fn parse_url(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if let Some(rest) = trimmed.strip_prefix("sqlite:") {
            let path = rest.trim_start_matches("//");
            if path == ":memory:" || path.is_empty() {
                return Ok(Self::Memory);
            }
            return Ok(Self::SQLite {
                path: PathBuf::from(path),
            });
        }
        if trimmed.contains("://") {
            bail!("Unsupported database URL scheme: {trimmed}");
        }
        Ok(Self::SQLite {
            path: PathBuf::from(trimmed),
        })
    }

    /// Convert to a sqlx connection string
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::SQLite { path } => format!("sqlite:{}", path.display()),
            Self::Memory => "sqlite::memory:".to_owned(),
        }
    }

    /// Check if this is an in-memory database
    #[must_use]
    pub const fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }
}

impl Default for DatabaseUrl {
    fn default() -> Self {
        Self::SQLite {
            path: PathBuf::from("./data/foodgram.db"),
        }
    }
}

impl FromStr for DatabaseUrl {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_url(s)
    }
}

impl fmt::Display for DatabaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_connection_string())
    }
}

/// Token and password settings
#[derive(Clone)]
pub struct AuthConfig {
    /// HS256 signing secret
    pub jwt_secret: Vec<u8>,
    /// Token lifetime in hours
    pub jwt_expiry_hours: i64,
    /// bcrypt work factor
    pub bcrypt_cost: u32,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_expiry_hours", &self.jwt_expiry_hours)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

/// Uploaded image storage
#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// Directory images are written to
    pub root: PathBuf,
    /// URL prefix the directory is served under, with leading and trailing `/`
    pub url_prefix: String,
}

/// Complete server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Deployment environment
    pub environment: Environment,
    /// Bind address
    pub http_host: String,
    /// Listen port
    pub http_port: u16,
    /// Database location
    pub database_url: DatabaseUrl,
    /// Pool size for file-backed databases
    pub database_max_connections: u32,
    /// Token and password settings
    pub auth: AuthConfig,
    /// Media storage settings
    pub media: MediaConfig,
    /// Externally visible origin, without trailing slash
    pub public_base_url: String,
    /// Allowed CORS origins; `*` allows any
    pub cors_allowed_origins: Vec<String>,
    /// Request body cap in bytes
    pub max_request_body_bytes: usize,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but malformed, or if
    /// `JWT_SECRET` is missing in production
    pub fn from_env() -> Result<Self> {
        let environment = Environment::from_str_or_default(
            &env::var(env_config::ENVIRONMENT).unwrap_or_default(),
        );

        let jwt_secret = match env::var(env_config::JWT_SECRET) {
            Ok(secret) if !secret.is_empty() => secret.into_bytes(),
            _ if environment.is_production() => {
                bail!("{} must be set in production", env_config::JWT_SECRET)
            }
            _ => {
                warn!(
                    "{} not set; generated an ephemeral secret, tokens will not survive a restart",
                    env_config::JWT_SECRET
                );
                generate_jwt_secret().to_vec()
            }
        };

        let database_url = env::var(env_config::DATABASE_URL)
            .unwrap_or_else(|_| defaults::DATABASE_URL.to_owned())
            .parse::<DatabaseUrl>()
            .context("Invalid DATABASE_URL")?;

        Ok(Self {
            environment,
            http_host: env::var(env_config::HTTP_HOST)
                .unwrap_or_else(|_| defaults::HTTP_HOST.to_owned()),
            http_port: parse_env(env_config::HTTP_PORT, defaults::HTTP_PORT)?,
            database_url,
            database_max_connections: parse_env(
                env_config::DATABASE_MAX_CONNECTIONS,
                defaults::DATABASE_MAX_CONNECTIONS,
            )?,
            auth: AuthConfig {
                jwt_secret,
                jwt_expiry_hours: parse_env(
                    env_config::JWT_EXPIRY_HOURS,
                    defaults::JWT_EXPIRY_HOURS,
                )?,
                bcrypt_cost: parse_env(env_config::BCRYPT_COST, bcrypt::DEFAULT_COST)?,
            },
            media: MediaConfig {
                root: PathBuf::from(
                    env::var(env_config::MEDIA_ROOT)
                        .unwrap_or_else(|_| defaults::MEDIA_ROOT.to_owned()),
                ),
                url_prefix: normalize_url_prefix(
                    &env::var(env_config::MEDIA_URL)
                        .unwrap_or_else(|_| defaults::MEDIA_URL.to_owned()),
                ),
            },
            public_base_url: env::var(env_config::PUBLIC_BASE_URL)
                .unwrap_or_else(|_| defaults::PUBLIC_BASE_URL.to_owned())
                .trim_end_matches('/')
                .to_owned(),
            cors_allowed_origins: env::var(env_config::CORS_ALLOWED_ORIGINS)
                .map(|value| parse_origins(&value))
                .unwrap_or_else(|_| vec!["*".to_owned()]),
            max_request_body_bytes: parse_env(
                env_config::MAX_REQUEST_BODY_BYTES,
                defaults::MAX_REQUEST_BODY_BYTES,
            )?,
        })
    }

    /// Log-safe one-line description; never includes the JWT secret
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Foodgram server ({}) on {}:{}, database {}, media {} at {}, public URL {}",
            self.environment,
            self.http_host,
            self.http_port,
            self.database_url,
            self.media.root.display(),
            self.media.url_prefix,
            self.public_base_url,
        )
    }
}

fn parse_env<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {name}: {value}")),
        _ => Ok(default),
    }
}

fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

/// Ensure the media URL prefix starts and ends with `/`
#[must_use]
pub fn normalize_url_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/".to_owned()
    } else {
        format!("/{trimmed}/")
    }
}
