//! Storage key scheme shared by all backends.

use tagcrawl_core::constants::CANONICAL_EXTENSION;
use tagcrawl_core::MediaOrigin;

/// Build the deterministic key for a media item: `{prefix}/{origin}_{media_id}.jpg`.
///
/// Surrounding `/` on the prefix are trimmed. An empty prefix yields a bare
/// `{origin}_{media_id}.jpg`. Distinct origins never share a key, so a tag hit
/// and an own-media listing of the same id land in different objects.
pub fn build_storage_key(prefix: &str, origin: &MediaOrigin, media_id: &str) -> String {
    let prefix = prefix.trim_matches('/');
    let filename = format!("{}_{}.{}", origin.label(), media_id, CANONICAL_EXTENSION);
    if prefix.is_empty() {
        filename
    } else {
        format!("{}/{}", prefix, filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_key() {
        let origin = MediaOrigin::Tag("sunset".to_string());
        assert_eq!(
            build_storage_key("images/instagram/", &origin, "B"),
            "images/instagram/tag_sunset_B.jpg"
        );
    }

    #[test]
    fn test_owner_key_and_prefix_trimming() {
        let origin = MediaOrigin::Owner("1784".to_string());
        assert_eq!(
            build_storage_key("/images/instagram", &origin, "42"),
            "images/instagram/user_1784_42.jpg"
        );
        assert_eq!(build_storage_key("", &origin, "42"), "user_1784_42.jpg");
    }

    #[test]
    fn test_keys_are_deterministic_and_origin_scoped() {
        let tag = MediaOrigin::Tag("1784".to_string());
        let owner = MediaOrigin::Owner("1784".to_string());
        assert_eq!(
            build_storage_key("p", &tag, "9"),
            build_storage_key("p/", &tag, "9")
        );
        assert_ne!(
            build_storage_key("p", &tag, "9"),
            build_storage_key("p", &owner, "9")
        );
    }
}
