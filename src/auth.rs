// ABOUTME: JWT issuance and validation plus bcrypt password hashing
// ABOUTME: Tokens are HS256-signed and carry a jti so logout can revoke them
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Authentication
//!
//! `AuthManager` signs and validates the tokens handed out by
//! `POST /api/auth/token/login`. Each token carries a unique `jti`; the
//! middleware rejects tokens whose `jti` appears in the revoked registry.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::environment::AuthConfig;
use crate::constants::service_names;
use crate::errors::{AppError, AppResult};
use crate::models::User;

/// `JWT` validation failure
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JwtValidationError {
    /// Token is past its `exp`
    #[error("JWT token expired at {expired_at}")]
    TokenExpired {
        /// When the token expired
        expired_at: DateTime<Utc>,
    },
    /// Signature, audience, or algorithm check failed
    #[error("JWT token is invalid: {reason}")]
    TokenInvalid {
        /// Reason for invalidity
        reason: String,
    },
    /// Not a decodable `JWT`
    #[error("JWT token is malformed: {details}")]
    TokenMalformed {
        /// Details about malformation
        details: String,
    },
}

impl From<JwtValidationError> for AppError {
    fn from(error: JwtValidationError) -> Self {
        match error {
            JwtValidationError::TokenExpired { .. } => Self::auth_expired(error.to_string()),
            JwtValidationError::TokenInvalid { .. } | JwtValidationError::TokenMalformed { .. } => {
                Self::auth_invalid(error.to_string())
            }
        }
    }
}

/// `JWT` claims for user authentication
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// User id
    pub sub: String,
    /// User email
    pub email: String,
    /// Unique token id, used for revocation
    pub jti: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// Audience
    pub aud: String,
}

impl Claims {
    /// Parse `sub` back into a user id
    ///
    /// # Errors
    ///
    /// Returns an authentication error if `sub` is not an integer
    pub fn user_id(&self) -> AppResult<i64> {
        self.sub
            .parse()
            .map_err(|_| AppError::auth_invalid("Token subject is not a user id"))
    }

    /// Expiry as a timestamp
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }
}

/// Authentication manager for `JWT` tokens and password hashes
#[derive(Clone)]
pub struct AuthManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiry_hours: i64,
    bcrypt_cost: u32,
}

impl AuthManager {
    /// Create a new authentication manager
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(&config.jwt_secret),
            decoding_key: DecodingKey::from_secret(&config.jwt_secret),
            token_expiry_hours: config.jwt_expiry_hours,
            bcrypt_cost: config.bcrypt_cost,
        }
    }

    /// Issue a signed token for `user`
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails
    pub fn generate_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.token_expiry_hours)).timestamp(),
            aud: service_names::FOODGRAM_SERVER.to_owned(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to sign token: {e}")))
    }

    /// Verify signature, audience, and expiry
    ///
    /// # Errors
    ///
    /// Returns a [`JwtValidationError`] describing why the token was rejected
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtValidationError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_audience(&[service_names::FOODGRAM_SERVER]);
        validation.set_required_spec_claims(&["exp", "sub", "aud"]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| Self::convert_jwt_error(token, &e))
    }

    fn convert_jwt_error(token: &str, e: &jsonwebtoken::errors::Error) -> JwtValidationError {
        match e.kind() {
            ErrorKind::ExpiredSignature => JwtValidationError::TokenExpired {
                expired_at: Self::peek_expiry(token).unwrap_or_else(Utc::now),
            },
            ErrorKind::InvalidToken
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_) => JwtValidationError::TokenMalformed {
                details: e.to_string(),
            },
            _ => JwtValidationError::TokenInvalid {
                reason: e.to_string(),
            },
        }
    }

    /// Read `exp` from an already-rejected token for the error message
    fn peek_expiry(token: &str) -> Option<DateTime<Utc>> {
        use base64::engine::general_purpose::URL_SAFE_NO_PAD;
        use base64::Engine;

        let payload = token.split('.').nth(1)?;
        let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
        let value: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
        DateTime::from_timestamp(value.get("exp")?.as_i64()?, 0)
    }

    /// Hash a password with bcrypt on the blocking pool
    ///
    /// # Errors
    ///
    /// Returns an error if hashing fails or the blocking task panics
    pub async fn hash_password(&self, password: &str) -> AppResult<String> {
        let password = password.to_owned();
        let cost = self.bcrypt_cost;

        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| AppError::internal(format!("Password hashing task failed: {e}")))?
            .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))
    }

    /// Check a password against a stored bcrypt hash on the blocking pool
    ///
    /// A malformed stored hash counts as a mismatch.
    ///
    /// # Errors
    ///
    /// Returns an error if the blocking task panics
    pub async fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        let password = password.to_owned();
        let hash = hash.to_owned();

        tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash).unwrap_or(false))
            .await
            .map_err(|e| AppError::internal(format!("Password verification task failed: {e}")))
    }
}

/// Generate a random 64-byte `JWT` signing secret
#[must_use]
pub fn generate_jwt_secret() -> [u8; 64] {
    let mut secret = [0u8; 64];
    rand::thread_rng().fill(&mut secret[..]);
    secret
}
