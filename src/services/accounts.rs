// ABOUTME: Registration and password-change validation rules
// ABOUTME: Checks email shape, username charset, name lengths, and password strength
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

use super::FieldErrors;
use crate::constants::limits::{EMAIL_MAX_LEN, PASSWORD_MIN_LEN, USER_NAME_MAX_LEN};
use crate::errors::{AppError, AppResult};

static EMAIL_RE: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
static USERNAME_RE: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();

fn compiled(
    cell: &'static OnceLock<Result<Regex, regex::Error>>,
    pattern: &str,
) -> AppResult<&'static Regex> {
    cell.get_or_init(|| Regex::new(pattern))
        .as_ref()
        .map_err(|e| AppError::internal(format!("Invalid validation pattern: {e}")))
}

/// Registration body for `POST /api/users`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationInput {
    /// Login email
    pub email: Option<String>,
    /// Public handle
    pub username: Option<String>,
    /// Given name
    pub first_name: Option<String>,
    /// Family name
    pub last_name: Option<String>,
    /// Plain-text password
    pub password: Option<String>,
}

/// Registration data that passed validation; the password is still plain text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// Login email
    pub email: String,
    /// Public handle
    pub username: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Plain-text password, to be hashed
    pub password: String,
}

impl RegistrationInput {
    /// Validate every field, reporting all failures at once
    ///
    /// # Errors
    ///
    /// Returns an `InvalidInput` error whose details name each bad field
    pub fn validate(self) -> AppResult<Registration> {
        let email_re = compiled(&EMAIL_RE, r"^[^@\s]+@[^@\s]+\.[^@\s]+$")?;
        let username_re = compiled(&USERNAME_RE, r"^[\w.@+-]+$")?;
        let mut errors = FieldErrors::new();

        let email = required_text(&mut errors, "email", self.email, EMAIL_MAX_LEN);
        if !email.is_empty() && !email_re.is_match(&email) {
            errors.add("email", "Enter a valid email address.");
        }

        let username = required_text(&mut errors, "username", self.username, USER_NAME_MAX_LEN);
        if !username.is_empty() && !username_re.is_match(&username) {
            errors.add(
                "username",
                "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
            );
        }

        let first_name =
            required_text(&mut errors, "first_name", self.first_name, USER_NAME_MAX_LEN);
        let last_name = required_text(&mut errors, "last_name", self.last_name, USER_NAME_MAX_LEN);

        let password = self.password.unwrap_or_default();
        if password.is_empty() {
            errors.required("password");
        } else {
            check_password(&mut errors, "password", &password);
        }

        errors.finish(Registration {
            email,
            username,
            first_name,
            last_name,
            password,
        })
    }
}

/// Validate a new password against the strength rules
///
/// # Errors
///
/// Returns an `InvalidInput` error naming `field`
pub fn validate_password(field: &str, password: &str) -> AppResult<()> {
    let mut errors = FieldErrors::new();
    if password.is_empty() {
        errors.required(field);
    } else {
        check_password(&mut errors, field, password);
    }
    errors.finish(())
}

fn check_password(errors: &mut FieldErrors, field: &str, password: &str) {
    if password.chars().count() < PASSWORD_MIN_LEN {
        errors.add(
            field,
            format!("This password is too short. It must contain at least {PASSWORD_MIN_LEN} characters."),
        );
    }
    if password.chars().all(|c| c.is_ascii_digit()) {
        errors.add(field, "This password is entirely numeric.");
    }
}

fn required_text(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<String>,
    max_len: usize,
) -> String {
    let value = value.map(|v| v.trim().to_owned()).unwrap_or_default();
    if value.is_empty() {
        errors.required(field);
    } else if value.chars().count() > max_len {
        errors.add(
            field,
            format!("Ensure this field has no more than {max_len} characters."),
        );
    }
    value
}
