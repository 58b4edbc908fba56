// ABOUTME: Domain limits, pagination defaults, and fixed strings shared across crates
// ABOUTME: Bounds here mirror the CHECK constraints in the database schema
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Numeric and length bounds for recipe and user fields
pub mod limits {
    /// Smallest ingredient amount and cooking time
    pub const MIN_AMOUNT: i64 = 1;
    /// Largest ingredient amount and cooking time
    pub const MAX_AMOUNT: i64 = 32_000;

    /// Maximum recipe name length in characters
    pub const RECIPE_NAME_MAX_LEN: usize = 256;
    /// Maximum ingredient name length in characters
    pub const INGREDIENT_NAME_MAX_LEN: usize = 128;
    /// Maximum measurement unit length in characters
    pub const MEASUREMENT_UNIT_MAX_LEN: usize = 64;

    /// Maximum email length
    pub const EMAIL_MAX_LEN: usize = 254;
    /// Maximum username, first name, and last name length
    pub const USER_NAME_MAX_LEN: usize = 150;
    /// Minimum password length
    pub const PASSWORD_MIN_LEN: usize = 8;
}

/// Page-number pagination defaults
pub mod pagination {
    /// Page size when `limit` is absent
    pub const DEFAULT_PAGE_SIZE: u32 = 10;
    /// Largest page size a client may request
    pub const MAX_PAGE_SIZE: u32 = 100;
}

/// Shopping list report rendering
pub mod shopping_list {
    /// First line of the downloadable report
    pub const HEADER: &str = "Список покупок:";
    /// Attachment file name
    pub const FILE_NAME: &str = "shopping_list.txt";
}

/// Media sub-directories under the media root
pub mod media {
    /// Recipe images
    pub const RECIPE_IMAGES_DIR: &str = "recipes/images";
    /// User avatars
    pub const AVATARS_DIR: &str = "users/avatars";
    /// Image extensions accepted from data URIs
    pub const ALLOWED_IMAGE_TYPES: &[&str] = &["png", "jpeg", "jpg", "gif", "webp"];
}

/// Service identity used in tokens and logs
pub mod service_names {
    /// Service name for logging and JWT audience
    pub const FOODGRAM_SERVER: &str = "foodgram-server";
}
