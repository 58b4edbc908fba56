// ABOUTME: Domain service layer between route handlers and database managers
// ABOUTME: Request validation and the shopping-list aggregator live here
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Registration and password rules
pub mod accounts;
/// Recipe payload validation
pub mod recipes;
/// Shopping-list aggregation and rendering
pub mod shopping_list;

mod field_errors;

pub use field_errors::FieldErrors;
