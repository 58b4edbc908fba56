// ABOUTME: Accumulator for per-field validation messages
// ABOUTME: Collapses into a single AppError whose details map field -> messages
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde_json::{Map, Value};

use crate::errors::{AppError, AppResult, ErrorCode};

/// Collects validation failures so a client sees all of them at once
#[derive(Debug, Default)]
pub struct FieldErrors {
    fields: Map<String, Value>,
}

impl FieldErrors {
    /// Empty accumulator
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` against `field`
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        let entry = self
            .fields
            .entry(field.to_owned())
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(messages) = entry {
            messages.push(Value::String(message.into()));
        }
    }

    /// Record the standard "required" message against `field`
    pub fn required(&mut self, field: &str) {
        self.add(field, "This field is required.");
    }

    /// Whether nothing has been recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// `Ok(value)` if no errors were recorded
    ///
    /// # Errors
    ///
    /// Returns an `InvalidInput` error carrying every recorded message
    pub fn finish<T>(self, value: T) -> AppResult<T> {
        if self.fields.is_empty() {
            return Ok(value);
        }

        let summary = self
            .fields
            .iter()
            .map(|(field, messages)| {
                let first = messages
                    .as_array()
                    .and_then(|m| m.first())
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                format!("{field}: {first}")
            })
            .collect::<Vec<_>>()
            .join("; ");

        Err(AppError::new(ErrorCode::InvalidInput, summary).with_details(Value::Object(self.fields)))
    }
}
