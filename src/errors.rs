// ABOUTME: Unified error types re-exported from foodgram-core
// ABOUTME: Keeps AppError/ErrorCode the same type across all workspace crates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub use foodgram_core::errors::*;
