// ABOUTME: Re-exports pagination types from foodgram-core and renders page links
// ABOUTME: Links are absolute URLs built from the public base URL and request URI
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub use foodgram_core::pagination::*;

use axum::http::Uri;
use url::Url;

/// Render the absolute URL of `page` for the list request at `uri`
///
/// Other query parameters (filters, `limit`) are preserved. Page 1 drops
/// the `page` parameter entirely.
#[must_use]
pub fn page_link(public_base_url: &str, uri: &Uri, page: u32) -> String {
    let raw = format!("{}{}", public_base_url.trim_end_matches('/'), uri);
    let Ok(mut url) = Url::parse(&raw) else {
        return raw;
    };

    let retained: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != "page")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    url.set_query(None);
    if page > 1 || !retained.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in &retained {
            pairs.append_pair(key, value);
        }
        if page > 1 {
            pairs.append_pair("page", &page.to_string());
        }
    }

    url.into()
}
