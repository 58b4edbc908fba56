// ABOUTME: Page-number pagination parameters and the count/next/previous/results envelope
// ABOUTME: Link rendering is delegated to the caller so this crate stays URL-agnostic
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};

use crate::constants::pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Query parameters accepted by paginated list endpoints
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageParams {
    /// 1-based page number
    pub page: Option<u32>,
    /// Page size
    pub limit: Option<u32>,
}

impl PageParams {
    /// Create explicit parameters
    #[must_use]
    pub const fn new(page: u32, limit: u32) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
        }
    }

    /// Effective page number, never below 1
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    /// Effective page size, clamped to `1..=MAX_PAGE_SIZE`
    #[must_use]
    pub fn limit(&self) -> u32 {
        self.limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    /// Row offset for SQL `OFFSET`
    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.page() - 1) * i64::from(self.limit())
    }
}

/// Paginated response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    /// Total number of items across all pages
    pub count: i64,
    /// Link to the next page, if any
    pub next: Option<String>,
    /// Link to the previous page, if any
    pub previous: Option<String>,
    /// Items on this page
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Build a page, rendering neighbour links with `link_for(page_number)`
    pub fn new<F>(results: Vec<T>, count: i64, params: &PageParams, link_for: F) -> Self
    where
        F: Fn(u32) -> String,
    {
        let page = params.page();
        let consumed = params.offset() + i64::from(params.limit());

        Self {
            count,
            next: (consumed < count).then(|| link_for(page + 1)),
            previous: (page > 1).then(|| link_for(page - 1)),
            results,
        }
    }
}
