/// Comment service
///
/// Comment writes (add, both delete flavors) and the threaded listings:
/// top-level pages with inline reply previews, and the full reply
/// listing of one parent.
use tracing::{debug, warn};
use uuid::Uuid;
use validator::Validate;

use crate::db::{
    CommentCursor, CommentDeleteOutcome, CommentInsertOutcome, CommentRepository, PostRepository,
};
use crate::error::{AppError, Result};
use crate::metrics::writes::COMMENT_WRITE_TOTAL;
use crate::models::{
    AddCommentRequest, AddCommentResponse, CommentView, GetCommentsQuery, GetCommentsResponse,
    GetRepliesQuery, GetRepliesResponse,
};
use crate::services::{bounded_limit, next_page_key};

const DEFAULT_COMMENTS_LIMIT: i64 = 25;
const MAX_COMMENTS_LIMIT: i64 = 50;
const DEFAULT_REPLIES_PREVIEW: i64 = 3;
const MAX_REPLIES_PREVIEW: i64 = 10;
const DEFAULT_REPLIES_LIMIT: i64 = 50;
const MAX_REPLIES_LIMIT: i64 = 100;

#[derive(Clone)]
pub struct CommentService {
    comments: CommentRepository,
    posts: PostRepository,
}

impl CommentService {
    pub fn new(comments: CommentRepository, posts: PostRepository) -> Self {
        Self { comments, posts }
    }

    pub async fn add_comment(
        &self,
        author: Uuid,
        post_id: Uuid,
        req: AddCommentRequest,
    ) -> Result<AddCommentResponse> {
        req.validate()?;

        let outcome = self
            .comments
            .add_comment(post_id, author, &req.content, req.in_reply_to)
            .await?;
        COMMENT_WRITE_TOTAL
            .with_label_values(&["add", insert_label(outcome)])
            .inc();

        match outcome {
            CommentInsertOutcome::Created { comment_id } => {
                debug!(post_id = %post_id, comment_id = %comment_id, user_id = %author, "comment added");
                Ok(AddCommentResponse {
                    post_id,
                    comment_id,
                })
            }
            CommentInsertOutcome::PostMissing => {
                warn!(post_id = %post_id, user_id = %author, "comment rejected: post missing");
                Err(AppError::NotFound("Post not found".to_string()))
            }
            CommentInsertOutcome::CommentsDisabled => {
                warn!(post_id = %post_id, user_id = %author, "comment rejected: comments disabled");
                Err(AppError::Forbidden(
                    "Comments are disabled on this post".to_string(),
                ))
            }
            CommentInsertOutcome::ParentMissing => {
                warn!(post_id = %post_id, user_id = %author, "comment rejected: parent missing");
                Err(AppError::NotFound("Parent comment not found".to_string()))
            }
            CommentInsertOutcome::ParentTooDeep => {
                warn!(post_id = %post_id, user_id = %author, "comment rejected: depth cap reached");
                Err(AppError::Validation(
                    "Maximum comment depth reached".to_string(),
                ))
            }
        }
    }

    /// Post-author moderation delete. Removing an already-gone comment
    /// is a success.
    pub async fn delete_comment_as_post_author(
        &self,
        requester: Uuid,
        post_id: Uuid,
        comment_id: Uuid,
    ) -> Result<()> {
        let outcome = self
            .comments
            .delete_comment_as_post_author(post_id, comment_id, requester)
            .await?;
        COMMENT_WRITE_TOTAL
            .with_label_values(&["moderate_delete", delete_label(outcome)])
            .inc();

        match outcome {
            CommentDeleteOutcome::Deleted => {
                debug!(post_id = %post_id, comment_id = %comment_id, user_id = %requester, "comment removed by post author");
                Ok(())
            }
            CommentDeleteOutcome::PostMissing => {
                warn!(post_id = %post_id, comment_id = %comment_id, user_id = %requester, "moderation delete rejected: post missing");
                Err(AppError::NotFound("Post not found".to_string()))
            }
            CommentDeleteOutcome::NotPostAuthor => {
                warn!(post_id = %post_id, comment_id = %comment_id, user_id = %requester, "moderation delete rejected: not the post author");
                Err(AppError::Forbidden(
                    "Only the post author can remove comments".to_string(),
                ))
            }
        }
    }

    /// Comment-author delete. Always reports success; a miss changes
    /// nothing and leaks nothing about other users' comments.
    pub async fn delete_own_comment(
        &self,
        requester: Uuid,
        post_id: Uuid,
        comment_id: Uuid,
    ) -> Result<()> {
        let removed = self
            .comments
            .delete_own_comment(post_id, comment_id, requester)
            .await?;
        COMMENT_WRITE_TOTAL
            .with_label_values(&["delete_own", if removed { "deleted" } else { "noop" }])
            .inc();

        debug!(post_id = %post_id, comment_id = %comment_id, user_id = %requester, removed, "own-comment delete");
        Ok(())
    }

    /// One page of top-level comments plus a short preview of each
    /// thread, appended flat behind the page and linked by
    /// `in_reply_to`.
    pub async fn get_comments(
        &self,
        viewer: Uuid,
        post_id: Uuid,
        query: GetCommentsQuery,
    ) -> Result<GetCommentsResponse> {
        let limit = bounded_limit(
            query.limit,
            DEFAULT_COMMENTS_LIMIT,
            1,
            MAX_COMMENTS_LIMIT,
            "limit",
        )?;
        let per_parent = bounded_limit(
            query.direct_replies_per_comment,
            DEFAULT_REPLIES_PREVIEW,
            0,
            MAX_REPLIES_PREVIEW,
            "direct_replies_per_comment",
        )?;

        if !self.posts.post_exists(post_id).await? {
            return Err(AppError::NotFound("Post not found".to_string()));
        }

        let total_comments_count = self.comments.count_top_level(post_id).await?;
        let cursor = self
            .resolve_comment_cursor(post_id, query.pagination_key)
            .await?;

        let top_level = self
            .comments
            .list_top_level(post_id, viewer, query.sort_by, limit, cursor)
            .await?;
        let pagination_key = next_page_key(&top_level, limit, |c: &CommentView| c.comment_id);

        let parent_ids: Vec<Uuid> = top_level.iter().map(|c| c.comment_id).collect();
        let previews = self
            .comments
            .preview_direct_replies(&parent_ids, viewer, per_parent)
            .await?;

        let mut comments = top_level;
        comments.extend(previews);

        Ok(GetCommentsResponse {
            comments,
            pagination_key,
            total_comments_count,
        })
    }

    /// Every direct reply of one parent, oldest first, paginated.
    pub async fn get_replies(
        &self,
        viewer: Uuid,
        post_id: Uuid,
        parent_comment_id: Uuid,
        query: GetRepliesQuery,
    ) -> Result<GetRepliesResponse> {
        let limit = bounded_limit(
            query.limit,
            DEFAULT_REPLIES_LIMIT,
            1,
            MAX_REPLIES_LIMIT,
            "limit",
        )?;

        if !self
            .comments
            .reply_parent_exists(post_id, parent_comment_id)
            .await?
        {
            return Err(AppError::NotFound("Comment not found".to_string()));
        }

        let total_replies_count = self.comments.count_replies(parent_comment_id).await?;
        let cursor = self
            .resolve_comment_cursor(post_id, query.pagination_key)
            .await?;

        let replies = self
            .comments
            .list_replies(parent_comment_id, viewer, limit, cursor)
            .await?;
        let pagination_key = next_page_key(&replies, limit, |c: &CommentView| c.comment_id);

        Ok(GetRepliesResponse {
            replies,
            pagination_key,
            total_replies_count,
            parent_comment_id,
        })
    }

    async fn resolve_comment_cursor(
        &self,
        post_id: Uuid,
        key: Option<Uuid>,
    ) -> Result<Option<CommentCursor>> {
        let key = match key {
            Some(key) => key,
            None => return Ok(None),
        };
        let cursor = self.comments.resolve_cursor(key, post_id).await?;
        if cursor.is_none() {
            debug!(pagination_key = %key, post_id = %post_id, "pagination key no longer resolves, serving first page");
        }
        Ok(cursor)
    }
}

fn insert_label(outcome: CommentInsertOutcome) -> &'static str {
    match outcome {
        CommentInsertOutcome::Created { .. } => "created",
        CommentInsertOutcome::PostMissing => "post_missing",
        CommentInsertOutcome::CommentsDisabled => "comments_disabled",
        CommentInsertOutcome::ParentMissing => "parent_missing",
        CommentInsertOutcome::ParentTooDeep => "too_deep",
    }
}

fn delete_label(outcome: CommentDeleteOutcome) -> &'static str {
    match outcome {
        CommentDeleteOutcome::Deleted => "deleted",
        CommentDeleteOutcome::PostMissing => "post_missing",
        CommentDeleteOutcome::NotPostAuthor => "not_post_author",
    }
}
