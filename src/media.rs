// ABOUTME: Filesystem store for base64 data-URI images (recipe images, avatars)
// ABOUTME: Files are named by UUID under the media root and served from the media URL
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::path::{Component, Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::environment::MediaConfig;
use crate::constants::media::ALLOWED_IMAGE_TYPES;
use crate::errors::{AppError, AppResult};

/// Image decoded from a `data:image/<type>;base64,<payload>` string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    /// File extension derived from the MIME subtype
    pub extension: &'static str,
    /// Raw image bytes
    pub bytes: Vec<u8>,
}

/// Decode a data URI submitted in `field`
///
/// # Errors
///
/// Returns a field-level validation error for anything that is not a
/// base64 data URI of an allowed image type
pub fn decode_data_uri(field: &str, value: &str) -> AppResult<DecodedImage> {
    let invalid = |message: &str| AppError::invalid_field(field, message.to_owned());

    let rest = value
        .trim()
        .strip_prefix("data:image/")
        .ok_or_else(|| invalid("Expected a data:image/...;base64 URI"))?;
    let (subtype, payload) = rest
        .split_once(";base64,")
        .ok_or_else(|| invalid("Image must be base64-encoded"))?;

    let subtype = subtype.to_ascii_lowercase();
    let extension = ALLOWED_IMAGE_TYPES
        .iter()
        .copied()
        .find(|allowed| *allowed == subtype)
        .ok_or_else(|| invalid("Unsupported image type"))?;
    let extension = if extension == "jpeg" { "jpg" } else { extension };

    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|_| invalid("Image payload is not valid base64"))?;
    if bytes.is_empty() {
        return Err(invalid("Image payload is empty"));
    }

    Ok(DecodedImage { extension, bytes })
}

/// Stores uploaded images and renders their public URLs
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
    url_prefix: String,
    public_base_url: String,
}

impl MediaStore {
    /// Create a store rooted at the configured media directory
    #[must_use]
    pub fn new(config: &MediaConfig, public_base_url: &str) -> Self {
        Self {
            root: config.root.clone(),
            url_prefix: config.url_prefix.clone(),
            public_base_url: public_base_url.trim_end_matches('/').to_owned(),
        }
    }

    /// Media root directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Decode `data_uri` and write it under `subdir`, returning the relative path
    ///
    /// # Errors
    ///
    /// Returns a validation error for a bad data URI, or a storage error if
    /// the file cannot be written
    pub async fn save_data_uri(&self, field: &str, subdir: &str, data_uri: &str) -> AppResult<String> {
        let image = decode_data_uri(field, data_uri)?;
        let relative = format!("{subdir}/{}.{}", Uuid::new_v4(), image.extension);
        let path = self.root.join(&relative);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::storage(format!("Failed to create media directory: {e}")))?;
        }
        tokio::fs::write(&path, &image.bytes)
            .await
            .map_err(|e| AppError::storage(format!("Failed to write image: {e}")))?;

        debug!(path = %relative, bytes = image.bytes.len(), "Stored image");
        Ok(relative)
    }

    /// Absolute URL for a stored relative path
    #[must_use]
    pub fn url_for(&self, relative: &str) -> String {
        format!("{}{}{}", self.public_base_url, self.url_prefix, relative)
    }

    /// Remove a stored file; failures are logged, never returned
    pub async fn delete(&self, relative: &str) {
        let Some(path) = self.resolve(relative) else {
            warn!(path = %relative, "Refusing to delete media path outside the media root");
            return;
        };

        if let Err(e) = tokio::fs::remove_file(&path).await {
            warn!(path = %relative, error = %e, "Failed to delete media file");
        }
    }

    fn resolve(&self, relative: &str) -> Option<PathBuf> {
        let relative = Path::new(relative);
        relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
            .then(|| self.root.join(relative))
    }
}
