// ABOUTME: User account model
// ABOUTME: Accounts own recipes and relations; passwords are stored as bcrypt hashes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Registered account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    /// Database-assigned identifier
    pub id: i64,
    /// Login email, unique
    pub email: String,
    /// Public handle, unique
    pub username: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// bcrypt hash
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Avatar path relative to the media root
    pub avatar: Option<String>,
    /// Inactive accounts cannot authenticate
    pub is_active: bool,
    /// Registration time
    pub created_at: DateTime<Utc>,
}

/// Validated registration data ready to insert
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Login email
    pub email: String,
    /// Public handle
    pub username: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// bcrypt hash of the chosen password
    pub password_hash: String,
}
