/// Comment repository
///
/// Owns the comment tree (parent-id column, depth fixed at insert time),
/// soft deletes, and every comment-facing projection query. Deleted
/// comments stay in listings with blanked content so threads keep their
/// shape; the blanking happens in SQL, not after the scan.
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{CommentSortBy, CommentView};

/// Deepest comment the tree accepts. A parent at this depth can no
/// longer be replied to.
pub const MAX_COMMENT_DEPTH: i32 = 10;

/// Result of an `add_comment` after all preconditions ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentInsertOutcome {
    Created { comment_id: Uuid },
    /// Post missing or deleted.
    PostMissing,
    /// The post author turned comments off.
    CommentsDisabled,
    /// Parent comment missing, deleted, or under another post.
    ParentMissing,
    /// Parent sits at the depth cap.
    ParentTooDeep,
}

/// Result of a post-author comment delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentDeleteOutcome {
    /// Comment deleted now, or it was already gone. Both are a success.
    Deleted,
    PostMissing,
    NotPostAuthor,
}

/// Sort key of the last comment a previous page returned.
#[derive(Debug, Clone, Copy)]
pub struct CommentCursor {
    pub score: i32,
    pub created_at: DateTime<Utc>,
    pub id: Uuid,
}

/// Shared projection columns over a `comments c` source. `$2` is always
/// the viewer id. Aliases line up with `CommentView`.
const COMMENT_COLUMNS: &str = r#"
    c.id AS comment_id,
    CASE WHEN c.is_deleted THEN '' ELSE c.content END AS content,
    c.parent_comment_id AS in_reply_to,
    c.created_at,
    c.upvotes_count,
    c.downvotes_count,
    c.score,
    CASE WHEN EXISTS (
        SELECT 1 FROM votes v
        WHERE v.target_kind = 1 AND v.target_id = c.id
          AND v.user_id = $2 AND v.vote_value = 1
    ) THEN TRUE ELSE FALSE END AS me_upvoted,
    CASE WHEN EXISTS (
        SELECT 1 FROM votes v
        WHERE v.target_kind = 1 AND v.target_id = c.id
          AND v.user_id = $2 AND v.vote_value = -1
    ) THEN TRUE ELSE FALSE END AS me_downvoted,
    CASE
        WHEN c.author_id = $2 THEN FALSE
        WHEN EXISTS (
            SELECT 1 FROM votes v
            WHERE v.target_kind = 1 AND v.target_id = c.id AND v.user_id = $2
        ) THEN FALSE
        ELSE TRUE
    END AS can_upvote,
    CASE
        WHEN c.author_id = $2 THEN FALSE
        WHEN EXISTS (
            SELECT 1 FROM votes v
            WHERE v.target_kind = 1 AND v.target_id = c.id AND v.user_id = $2
        ) THEN FALSE
        ELSE TRUE
    END AS can_downvote,
    CASE WHEN c.author_id = $2 THEN TRUE ELSE FALSE END AS is_created_by_me,
    c.is_deleted,
    c.depth,
    (SELECT COUNT(*) FROM comments r
     WHERE r.parent_comment_id = c.id) AS replies_count
"#;

#[derive(Clone)]
pub struct CommentRepository {
    pool: PgPool,
}

impl CommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a comment, top level or as a reply.
    ///
    /// Check order: post exists and is live, comments are enabled, the
    /// parent (when given) is a live comment of the same post, the
    /// parent is above the depth cap. Depth is `parent.depth + 1` and
    /// never changes afterwards.
    pub async fn add_comment(
        &self,
        post_id: Uuid,
        author: Uuid,
        content: &str,
        in_reply_to: Option<Uuid>,
    ) -> Result<CommentInsertOutcome, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let comments_enabled = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT comments_enabled FROM posts
            WHERE id = $1 AND is_deleted = FALSE
            "#,
        )
        .bind(post_id)
        .fetch_optional(&mut *tx)
        .await?;

        let comments_enabled = match comments_enabled {
            Some(enabled) => enabled,
            None => return Ok(CommentInsertOutcome::PostMissing),
        };
        if !comments_enabled {
            return Ok(CommentInsertOutcome::CommentsDisabled);
        }

        let depth = match in_reply_to {
            None => 0,
            Some(parent_id) => {
                let parent_depth = sqlx::query_scalar::<_, i32>(
                    r#"
                    SELECT depth FROM comments
                    WHERE id = $1 AND post_id = $2 AND is_deleted = FALSE
                    "#,
                )
                .bind(parent_id)
                .bind(post_id)
                .fetch_optional(&mut *tx)
                .await?;

                match parent_depth {
                    None => return Ok(CommentInsertOutcome::ParentMissing),
                    Some(d) if d >= MAX_COMMENT_DEPTH => {
                        return Ok(CommentInsertOutcome::ParentTooDeep)
                    }
                    Some(d) => d + 1,
                }
            }
        };

        let comment_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO comments (post_id, author_id, content, parent_comment_id, depth)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(post_id)
        .bind(author)
        .bind(content)
        .bind(in_reply_to)
        .bind(depth)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(CommentInsertOutcome::Created { comment_id })
    }

    /// Post-author moderation delete. Succeeds whether or not the
    /// comment still exists; only the post's state can fail it.
    pub async fn delete_comment_as_post_author(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
        requester: Uuid,
    ) -> Result<CommentDeleteOutcome, sqlx::Error> {
        let post_author = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT author_id FROM posts
            WHERE id = $1 AND is_deleted = FALSE
            "#,
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        let post_author = match post_author {
            Some(author) => author,
            None => return Ok(CommentDeleteOutcome::PostMissing),
        };
        if post_author != requester {
            return Ok(CommentDeleteOutcome::NotPostAuthor);
        }

        sqlx::query(
            r#"
            UPDATE comments SET is_deleted = TRUE
            WHERE id = $1 AND post_id = $2 AND is_deleted = FALSE
            "#,
        )
        .bind(comment_id)
        .bind(post_id)
        .execute(&self.pool)
        .await?;

        Ok(CommentDeleteOutcome::Deleted)
    }

    /// Comment-author delete. One guarded update; a miss (wrong author,
    /// wrong post, already deleted, never existed) changes nothing and
    /// is still reported to the caller as a success. Returns whether a
    /// row was actually deleted, for logging.
    pub async fn delete_own_comment(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
        requester: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let updated = sqlx::query(
            r#"
            UPDATE comments SET is_deleted = TRUE
            WHERE id = $1 AND post_id = $2 AND author_id = $3 AND is_deleted = FALSE
            "#,
        )
        .bind(comment_id)
        .bind(post_id)
        .bind(requester)
        .execute(&self.pool)
        .await?;

        Ok(updated.rows_affected() > 0)
    }

    /// Top-level comment count for a post, deleted included.
    pub async fn count_top_level(&self, post_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM comments
            WHERE post_id = $1 AND parent_comment_id IS NULL
            "#,
        )
        .bind(post_id)
        .fetch_one(&self.pool)
        .await
    }

    /// One page of top-level comments under the given sort mode,
    /// resuming after the cursor when one is given.
    pub async fn list_top_level(
        &self,
        post_id: Uuid,
        viewer: Uuid,
        sort: CommentSortBy,
        limit: i64,
        cursor: Option<CommentCursor>,
    ) -> Result<Vec<CommentView>, sqlx::Error> {
        let (order, keyset) = match sort {
            CommentSortBy::Top => (
                "c.score DESC, c.created_at DESC, c.id ASC",
                r#" AND (c.score < $4
                     OR (c.score = $4 AND c.created_at < $5)
                     OR (c.score = $4 AND c.created_at = $5 AND c.id > $6))"#,
            ),
            CommentSortBy::New => (
                "c.created_at DESC, c.id ASC",
                " AND (c.created_at < $4 OR (c.created_at = $4 AND c.id > $5))",
            ),
            CommentSortBy::Old => (
                "c.created_at ASC, c.id ASC",
                " AND (c.created_at > $4 OR (c.created_at = $4 AND c.id > $5))",
            ),
        };
        let keyset = if cursor.is_some() { keyset } else { "" };

        let sql = format!(
            r#"
            SELECT {COMMENT_COLUMNS}
            FROM comments c
            WHERE c.post_id = $1 AND c.parent_comment_id IS NULL{keyset}
            ORDER BY {order}
            LIMIT $3
            "#
        );

        let query = sqlx::query_as::<_, CommentView>(&sql)
            .bind(post_id)
            .bind(viewer)
            .bind(limit);

        match (cursor, sort) {
            (Some(cur), CommentSortBy::Top) => {
                query
                    .bind(cur.score)
                    .bind(cur.created_at)
                    .bind(cur.id)
                    .fetch_all(&self.pool)
                    .await
            }
            (Some(cur), _) => {
                query
                    .bind(cur.created_at)
                    .bind(cur.id)
                    .fetch_all(&self.pool)
                    .await
            }
            (None, _) => query.fetch_all(&self.pool).await,
        }
    }

    /// Best direct replies for a batch of parents, `per_parent` each,
    /// ranked inside each thread by score then age. Returned grouped by
    /// parent so the page assembly can append them in thread order.
    pub async fn preview_direct_replies(
        &self,
        parent_ids: &[Uuid],
        viewer: Uuid,
        per_parent: i64,
    ) -> Result<Vec<CommentView>, sqlx::Error> {
        if parent_ids.is_empty() || per_parent == 0 {
            return Ok(Vec::new());
        }

        let sql = format!(
            r#"
            SELECT {COMMENT_COLUMNS}
            FROM (
                SELECT *, ROW_NUMBER() OVER (
                    PARTITION BY parent_comment_id
                    ORDER BY score DESC, created_at ASC, id ASC
                ) AS rn
                FROM comments
                WHERE parent_comment_id = ANY($1)
            ) c
            WHERE c.rn <= $3
            ORDER BY c.parent_comment_id, c.rn
            "#
        );

        sqlx::query_as::<_, CommentView>(&sql)
            .bind(parent_ids)
            .bind(viewer)
            .bind(per_parent)
            .fetch_all(&self.pool)
            .await
    }

    /// True when the parent comment exists under the post. Deleted
    /// parents count; their reply thread stays navigable.
    pub async fn reply_parent_exists(
        &self,
        post_id: Uuid,
        parent_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM comments WHERE id = $1 AND post_id = $2
            )
            "#,
        )
        .bind(parent_id)
        .bind(post_id)
        .fetch_one(&self.pool)
        .await
    }

    /// Direct reply count for one parent, deleted included.
    pub async fn count_replies(&self, parent_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"SELECT COUNT(*) FROM comments WHERE parent_comment_id = $1"#,
        )
        .bind(parent_id)
        .fetch_one(&self.pool)
        .await
    }

    /// One page of all direct replies of one parent, oldest first.
    pub async fn list_replies(
        &self,
        parent_id: Uuid,
        viewer: Uuid,
        limit: i64,
        cursor: Option<CommentCursor>,
    ) -> Result<Vec<CommentView>, sqlx::Error> {
        let keyset = if cursor.is_some() {
            " AND (c.created_at > $4 OR (c.created_at = $4 AND c.id > $5))"
        } else {
            ""
        };

        let sql = format!(
            r#"
            SELECT {COMMENT_COLUMNS}
            FROM comments c
            WHERE c.parent_comment_id = $1{keyset}
            ORDER BY c.created_at ASC, c.id ASC
            LIMIT $3
            "#
        );

        let query = sqlx::query_as::<_, CommentView>(&sql)
            .bind(parent_id)
            .bind(viewer)
            .bind(limit);

        match cursor {
            Some(cur) => {
                query
                    .bind(cur.created_at)
                    .bind(cur.id)
                    .fetch_all(&self.pool)
                    .await
            }
            None => query.fetch_all(&self.pool).await,
        }
    }

    /// Re-read the sort key behind a pagination key. The comment must
    /// belong to the post; deletion does not unanchor it. None sends the
    /// caller back to the first page.
    pub async fn resolve_cursor(
        &self,
        key: Uuid,
        post_id: Uuid,
    ) -> Result<Option<CommentCursor>, sqlx::Error> {
        let row = sqlx::query_as::<_, (i32, DateTime<Utc>)>(
            r#"SELECT score, created_at FROM comments WHERE id = $1 AND post_id = $2"#,
        )
        .bind(key)
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(score, created_at)| CommentCursor {
            score,
            created_at,
            id: key,
        }))
    }
}
