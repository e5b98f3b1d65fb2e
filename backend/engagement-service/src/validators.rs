use validator::ValidationError;

/// Input validation utilities for engagement service

/// Post and comment body limit, measured in bytes
pub const MAX_CONTENT_BYTES: usize = 4096;

/// Tag count bounds per post
pub const MIN_TAGS: usize = 1;
pub const MAX_TAGS: usize = 3;

/// Validate post/comment content (non-empty, at most 4096 bytes)
pub fn validate_content(content: &str) -> bool {
    !content.is_empty() && content.len() <= MAX_CONTENT_BYTES
}

/// validator crate compatible custom validator for content bounds
pub fn validate_content_validator(content: &str) -> Result<(), ValidationError> {
    if validate_content(content) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_content_length"))
    }
}

/// Validate tag list shape (1-3 tags, none blank)
pub fn validate_tags(tags: &[String]) -> bool {
    (MIN_TAGS..=MAX_TAGS).contains(&tags.len()) && tags.iter().all(|t| !t.trim().is_empty())
}

/// validator crate compatible custom validator for the tag list
pub fn validate_tags_validator(tags: &[String]) -> Result<(), ValidationError> {
    if validate_tags(tags) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_tags"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_content() {
        assert!(validate_content("hello"));
        assert!(validate_content(&"a".repeat(4096)));
    }

    #[test]
    fn test_invalid_content() {
        assert!(!validate_content(""));
        assert!(!validate_content(&"a".repeat(4097)));
        // Multi-byte characters count by encoded size, not char count
        assert!(!validate_content(&"é".repeat(2049)));
    }

    #[test]
    fn test_valid_tags() {
        assert!(validate_tags(&["rust".to_string()]));
        assert!(validate_tags(&[
            "rust".to_string(),
            "backend".to_string(),
            "databases".to_string(),
        ]));
    }

    #[test]
    fn test_invalid_tags() {
        assert!(!validate_tags(&[]));
        assert!(!validate_tags(&[
            "a".to_string(),
            "b".to_string(),
            "c".to_string(),
            "d".to_string(),
        ]));
        assert!(!validate_tags(&["rust".to_string(), "  ".to_string()]));
    }
}
