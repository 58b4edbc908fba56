// ABOUTME: Core types and constants for the Foodgram recipe server
// ABOUTME: Foundation crate with error handling, pagination, and domain limits
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Foodgram Core
//!
//! Foundation crate providing shared types and constants for the Foodgram
//! recipe-sharing server. It changes rarely, which keeps incremental builds
//! of the server crate fast.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError` and `ErrorCode`
//! - **constants**: Domain limits and pagination defaults
//! - **pagination**: Page-number pagination parameters and response envelope

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Domain limits and shared constant values
pub mod constants;

/// Page-number pagination for list endpoints
pub mod pagination;
