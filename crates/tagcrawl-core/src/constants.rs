//! Shared constants.

/// `tag_source` value for records discovered through the account's own media listing.
pub const OWN_MEDIA_TAG_SOURCE: &str = "__USER_MEDIA__";

/// Default platform label stamped on every record.
pub const DEFAULT_PLATFORM: &str = "instagram";

/// Content type of every object written by the pipeline.
pub const CANONICAL_CONTENT_TYPE: &str = "image/jpeg";

/// File extension matching [`CANONICAL_CONTENT_TYPE`].
pub const CANONICAL_EXTENSION: &str = "jpg";

/// Default namespace prefix for storage keys.
pub const DEFAULT_STORAGE_PREFIX: &str = "images/instagram/";
