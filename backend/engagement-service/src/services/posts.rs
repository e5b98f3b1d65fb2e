/// Post service
///
/// Post creation, author-gated moderation (delete, comment toggles) and
/// the tag-filtered listing.
use tracing::{debug, warn};
use uuid::Uuid;
use validator::Validate;

use crate::db::{PostRepository, PostUpdateOutcome};
use crate::error::{AppError, Result};
use crate::models::{
    CreatePostRequest, CreatePostResponse, GetPostsQuery, GetPostsResponse, PostView,
};
use crate::services::{bounded_limit, next_page_key};

const DEFAULT_POSTS_LIMIT: i64 = 25;
const MAX_POSTS_LIMIT: i64 = 25;

#[derive(Clone)]
pub struct PostService {
    posts: PostRepository,
}

impl PostService {
    pub fn new(posts: PostRepository) -> Self {
        Self { posts }
    }

    pub async fn create_post(
        &self,
        author: Uuid,
        req: CreatePostRequest,
    ) -> Result<CreatePostResponse> {
        req.validate()?;
        let tags = normalize_tags(&req.tags);

        let post_id = self.posts.create_post(author, &req.content, &tags).await?;
        debug!(post_id = %post_id, user_id = %author, tag_count = tags.len(), "post created");
        Ok(CreatePostResponse { post_id })
    }

    pub async fn delete_post(&self, author: Uuid, post_id: Uuid) -> Result<()> {
        let outcome = self.posts.soft_delete_post(post_id, author).await?;
        match update_error(outcome, "delete the post") {
            None => {
                debug!(post_id = %post_id, user_id = %author, "post deleted");
                Ok(())
            }
            Some(err) => {
                warn!(post_id = %post_id, user_id = %author, "post delete rejected");
                Err(err)
            }
        }
    }

    /// Turn comments off for a post, optionally soft-deleting every
    /// existing comment along with the flag.
    pub async fn disable_comments(
        &self,
        author: Uuid,
        post_id: Uuid,
        delete_existing: bool,
    ) -> Result<()> {
        let outcome = self
            .posts
            .disable_comments(post_id, author, delete_existing)
            .await?;
        match update_error(outcome, "change comment settings") {
            None => {
                debug!(post_id = %post_id, user_id = %author, delete_existing, "comments disabled");
                Ok(())
            }
            Some(err) => {
                warn!(post_id = %post_id, user_id = %author, "comment disable rejected");
                Err(err)
            }
        }
    }

    pub async fn enable_comments(&self, author: Uuid, post_id: Uuid) -> Result<()> {
        let outcome = self.posts.enable_comments(post_id, author).await?;
        match update_error(outcome, "change comment settings") {
            None => {
                debug!(post_id = %post_id, user_id = %author, "comments enabled");
                Ok(())
            }
            Some(err) => {
                warn!(post_id = %post_id, user_id = %author, "comment enable rejected");
                Err(err)
            }
        }
    }

    pub async fn get_post(&self, viewer: Uuid, post_id: Uuid) -> Result<PostView> {
        self.posts
            .get_post(post_id, viewer)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))
    }

    /// Tag-filtered listing, best-and-newest first. A pagination key
    /// that no longer resolves serves the first page again instead of
    /// failing the request.
    pub async fn get_posts(&self, viewer: Uuid, query: GetPostsQuery) -> Result<GetPostsResponse> {
        let tag = query.tag.trim();
        if tag.is_empty() {
            return Err(AppError::Validation("tag must not be empty".to_string()));
        }
        let limit = bounded_limit(query.limit, DEFAULT_POSTS_LIMIT, 1, MAX_POSTS_LIMIT, "limit")?;

        let cursor = match query.pagination_key {
            None => None,
            Some(key) => {
                let cursor = self.posts.resolve_cursor(key).await?;
                if cursor.is_none() {
                    debug!(pagination_key = %key, "pagination key no longer resolves, serving first page");
                }
                cursor
            }
        };

        let posts = self.posts.list_posts(viewer, tag, limit, cursor).await?;
        let pagination_key = next_page_key(&posts, limit, |p: &PostView| p.post_id);

        Ok(GetPostsResponse {
            posts,
            pagination_key,
        })
    }
}

/// Client-facing error for an author-gated update, None on success.
/// `action` completes the forbidden message ("Only the post author
/// can ...").
fn update_error(outcome: PostUpdateOutcome, action: &str) -> Option<AppError> {
    match outcome {
        PostUpdateOutcome::Updated => None,
        PostUpdateOutcome::PostMissing => Some(AppError::NotFound("Post not found".to_string())),
        PostUpdateOutcome::NotAuthor => Some(AppError::Forbidden(format!(
            "Only the post author can {action}"
        ))),
    }
}

/// Trim tags and collapse duplicates, keeping first-seen order.
fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !out.iter().any(|seen| seen == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_trimmed_and_deduplicated_in_order() {
        let tags = vec![
            "rust".to_string(),
            " rust ".to_string(),
            "postgres".to_string(),
            "rust".to_string(),
        ];
        assert_eq!(normalize_tags(&tags), vec!["rust", "postgres"]);
    }

    #[test]
    fn missing_post_maps_to_not_found() {
        let err = update_error(PostUpdateOutcome::PostMissing, "delete the post").unwrap();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn foreign_post_maps_to_forbidden_with_the_action_named() {
        let err = update_error(PostUpdateOutcome::NotAuthor, "change comment settings").unwrap();
        assert!(
            matches!(err, AppError::Forbidden(msg) if msg == "Only the post author can change comment settings")
        );
    }

    #[test]
    fn successful_update_is_not_an_error() {
        assert!(update_error(PostUpdateOutcome::Updated, "delete the post").is_none());
    }
}
