/// Data models for engagement-service
///
/// Defines the viewer-facing projections (`PostView`, `CommentView`),
/// the vote target/direction types shared by the vote pipeline, and the
/// request/response DTOs for the HTTP boundary.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

// ============================================================================
// Votes
// ============================================================================

/// Direction of a vote. Absence of a vote row means "no vote".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    /// Signed value stored in `votes.vote_value`
    pub fn value(&self) -> i16 {
        match self {
            VoteDirection::Up => 1,
            VoteDirection::Down => -1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VoteDirection::Up => "up",
            VoteDirection::Down => "down",
        }
    }
}

/// Votable target. Comment targets carry the owning post id so the
/// post/comment relationship can be checked before the write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteTarget {
    Post { post_id: Uuid },
    Comment { post_id: Uuid, comment_id: Uuid },
}

impl VoteTarget {
    /// Discriminant stored in `votes.target_kind`
    pub fn kind(&self) -> i16 {
        match self {
            VoteTarget::Post { .. } => 0,
            VoteTarget::Comment { .. } => 1,
        }
    }

    /// Id stored in `votes.target_id`
    pub fn target_id(&self) -> Uuid {
        match self {
            VoteTarget::Post { post_id } => *post_id,
            VoteTarget::Comment { comment_id, .. } => *comment_id,
        }
    }

    pub fn kind_str(&self) -> &'static str {
        match self {
            VoteTarget::Post { .. } => "post",
            VoteTarget::Comment { .. } => "comment",
        }
    }
}

// ============================================================================
// Viewer projections
// ============================================================================

/// Post as seen by a specific viewer
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PostView {
    pub post_id: Uuid,
    pub content: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub upvotes_count: i32,
    pub downvotes_count: i32,
    pub score: i32,
    pub me_upvoted: bool,
    pub me_downvoted: bool,
    pub can_upvote: bool,
    pub can_downvote: bool,
    pub comments_count: i64,
    pub is_created_by_me: bool,
    pub is_deleted: bool,
}

/// Comment as seen by a specific viewer
///
/// Deleted comments survive in listings with `content` blanked and
/// `is_deleted` set, so reply threads stay navigable.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CommentView {
    pub comment_id: Uuid,
    pub content: String,
    pub in_reply_to: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub upvotes_count: i32,
    pub downvotes_count: i32,
    pub score: i32,
    pub me_upvoted: bool,
    pub me_downvoted: bool,
    pub can_upvote: bool,
    pub can_downvote: bool,
    pub is_created_by_me: bool,
    pub is_deleted: bool,
    pub depth: i32,
    pub replies_count: i64,
}

// ============================================================================
// Comment sorting
// ============================================================================

/// Sort order for top-level comment listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CommentSortBy {
    #[default]
    Top,
    New,
    Old,
}

impl CommentSortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentSortBy::Top => "top",
            CommentSortBy::New => "new",
            CommentSortBy::Old => "old",
        }
    }
}

// ============================================================================
// Request DTOs
// ============================================================================

/// Create post request
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(custom(function = "crate::validators::validate_content_validator"))]
    pub content: String,
    #[validate(custom(function = "crate::validators::validate_tags_validator"))]
    pub tags: Vec<String>,
}

/// Add comment request. `in_reply_to` names the parent comment for replies.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct AddCommentRequest {
    #[validate(custom(function = "crate::validators::validate_content_validator"))]
    pub content: String,
    #[serde(default)]
    pub in_reply_to: Option<Uuid>,
}

/// Disable comments request
#[derive(Debug, Serialize, Deserialize)]
pub struct DisableCommentsRequest {
    /// Soft-delete all existing comments together with the flag flip
    #[serde(default)]
    pub delete_existing: bool,
}

/// Query parameters for the post listing
#[derive(Debug, Deserialize)]
pub struct GetPostsQuery {
    pub tag: String,
    pub limit: Option<i32>,
    pub pagination_key: Option<Uuid>,
}

/// Query parameters for the comment listing
#[derive(Debug, Deserialize)]
pub struct GetCommentsQuery {
    #[serde(default)]
    pub sort_by: CommentSortBy,
    pub limit: Option<i32>,
    pub pagination_key: Option<Uuid>,
    pub direct_replies_per_comment: Option<i32>,
}

/// Query parameters for the reply listing
#[derive(Debug, Deserialize)]
pub struct GetRepliesQuery {
    pub limit: Option<i32>,
    pub pagination_key: Option<Uuid>,
}

// ============================================================================
// Response DTOs
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatePostResponse {
    pub post_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddCommentResponse {
    pub post_id: Uuid,
    pub comment_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GetPostsResponse {
    pub posts: Vec<PostView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination_key: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GetCommentsResponse {
    pub comments: Vec<CommentView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination_key: Option<Uuid>,
    /// Top-level comments on the post, deleted included
    pub total_comments_count: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GetRepliesResponse {
    pub replies: Vec<CommentView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination_key: Option<Uuid>,
    /// Direct replies of the parent, deleted included
    pub total_replies_count: i64,
    pub parent_comment_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vote_direction_values() {
        assert_eq!(VoteDirection::Up.value(), 1);
        assert_eq!(VoteDirection::Down.value(), -1);
    }

    #[test]
    fn test_vote_target_encoding() {
        let post_id = Uuid::new_v4();
        let comment_id = Uuid::new_v4();

        let post_target = VoteTarget::Post { post_id };
        assert_eq!(post_target.kind(), 0);
        assert_eq!(post_target.target_id(), post_id);

        let comment_target = VoteTarget::Comment {
            post_id,
            comment_id,
        };
        assert_eq!(comment_target.kind(), 1);
        assert_eq!(comment_target.target_id(), comment_id);
    }

    #[test]
    fn test_sort_by_default_and_wire_names() {
        assert_eq!(CommentSortBy::default(), CommentSortBy::Top);

        let parsed: CommentSortBy = serde_json::from_str("\"new\"").unwrap();
        assert_eq!(parsed, CommentSortBy::New);
        assert_eq!(serde_json::to_string(&CommentSortBy::Old).unwrap(), "\"old\"");
    }

    #[test]
    fn test_pagination_key_omitted_when_absent() {
        let resp = GetPostsResponse {
            posts: vec![],
            pagination_key: None,
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert!(json.get("pagination_key").is_none());
    }

    #[test]
    fn test_create_post_validation_names_the_field() {
        let no_tags = CreatePostRequest {
            content: "hello".to_string(),
            tags: vec![],
        };
        let err = no_tags.validate().unwrap_err();
        assert!(err.to_string().contains("tags"));

        let too_many = CreatePostRequest {
            content: "hello".to_string(),
            tags: vec!["a", "b", "c", "d"].into_iter().map(String::from).collect(),
        };
        assert!(too_many.validate().is_err());

        let oversized = CreatePostRequest {
            content: "a".repeat(4097),
            tags: vec!["rust".to_string()],
        };
        let err = oversized.validate().unwrap_err();
        assert!(err.to_string().contains("content"));
    }
}
