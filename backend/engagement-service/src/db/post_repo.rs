/// Post repository
///
/// Owns post rows, their tag set, and the viewer-facing post projection.
/// Author-gated updates run as guarded UPDATEs; a zero-row match is then
/// classified into missing-post vs foreign-post with one follow-up read.
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::PostView;

/// Result of an author-gated post update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostUpdateOutcome {
    Updated,
    /// Post missing or already deleted.
    PostMissing,
    /// Post exists but the caller did not author it.
    NotAuthor,
}

/// Sort key of the last post a previous page returned. The listing
/// resumes strictly after this key.
#[derive(Debug, Clone, Copy)]
pub struct PostCursor {
    pub score: i32,
    pub created_at: DateTime<Utc>,
    pub id: Uuid,
}

/// Shared projection columns. `$1` is always the viewer id; the other
/// placeholders are query-specific. Aliases line up with `PostView`.
const POST_COLUMNS: &str = r#"
    p.id AS post_id,
    p.content,
    COALESCE(ARRAY_AGG(pt.tag ORDER BY pt.tag) FILTER (WHERE pt.tag IS NOT NULL),
             ARRAY[]::TEXT[]) AS tags,
    p.created_at,
    p.upvotes_count,
    p.downvotes_count,
    p.score,
    CASE WHEN EXISTS (
        SELECT 1 FROM votes v
        WHERE v.target_kind = 0 AND v.target_id = p.id
          AND v.user_id = $1 AND v.vote_value = 1
    ) THEN TRUE ELSE FALSE END AS me_upvoted,
    CASE WHEN EXISTS (
        SELECT 1 FROM votes v
        WHERE v.target_kind = 0 AND v.target_id = p.id
          AND v.user_id = $1 AND v.vote_value = -1
    ) THEN TRUE ELSE FALSE END AS me_downvoted,
    CASE
        WHEN p.author_id = $1 THEN FALSE
        WHEN EXISTS (
            SELECT 1 FROM votes v
            WHERE v.target_kind = 0 AND v.target_id = p.id AND v.user_id = $1
        ) THEN FALSE
        ELSE TRUE
    END AS can_upvote,
    CASE
        WHEN p.author_id = $1 THEN FALSE
        WHEN EXISTS (
            SELECT 1 FROM votes v
            WHERE v.target_kind = 0 AND v.target_id = p.id AND v.user_id = $1
        ) THEN FALSE
        ELSE TRUE
    END AS can_downvote,
    (SELECT COUNT(*) FROM comments c
     WHERE c.post_id = p.id AND c.is_deleted = FALSE) AS comments_count,
    CASE WHEN p.author_id = $1 THEN TRUE ELSE FALSE END AS is_created_by_me,
    p.is_deleted
"#;

#[derive(Clone)]
pub struct PostRepository {
    pool: PgPool,
}

impl PostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a post with its tag set. Tags arrive normalized; duplicate
    /// rows are absorbed by the primary key.
    pub async fn create_post(
        &self,
        author: Uuid,
        content: &str,
        tags: &[String],
    ) -> Result<Uuid, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let post_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO posts (author_id, content)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(author)
        .bind(content)
        .fetch_one(&mut *tx)
        .await?;

        for tag in tags {
            sqlx::query(
                r#"
                INSERT INTO post_tags (post_id, tag)
                VALUES ($1, $2)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(post_id)
            .bind(tag)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(post_id)
    }

    /// Author-only soft delete. Deleting an already-deleted post reports
    /// `PostMissing`; the row is no longer addressable.
    pub async fn soft_delete_post(
        &self,
        post_id: Uuid,
        author: Uuid,
    ) -> Result<PostUpdateOutcome, sqlx::Error> {
        let updated = sqlx::query(
            r#"
            UPDATE posts SET is_deleted = TRUE
            WHERE id = $1 AND author_id = $2 AND is_deleted = FALSE
            "#,
        )
        .bind(post_id)
        .bind(author)
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return self.classify_update_miss(post_id).await;
        }
        Ok(PostUpdateOutcome::Updated)
    }

    /// Turn comments off. With `delete_existing` every live comment on the
    /// post is soft-deleted in the same transaction as the flag flip.
    pub async fn disable_comments(
        &self,
        post_id: Uuid,
        author: Uuid,
        delete_existing: bool,
    ) -> Result<PostUpdateOutcome, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE posts SET comments_enabled = FALSE
            WHERE id = $1 AND author_id = $2 AND is_deleted = FALSE
            "#,
        )
        .bind(post_id)
        .bind(author)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return self.classify_update_miss(post_id).await;
        }

        if delete_existing {
            sqlx::query(
                r#"
                UPDATE comments SET is_deleted = TRUE
                WHERE post_id = $1 AND is_deleted = FALSE
                "#,
            )
            .bind(post_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(PostUpdateOutcome::Updated)
    }

    /// Turn comments back on. Idempotent.
    pub async fn enable_comments(
        &self,
        post_id: Uuid,
        author: Uuid,
    ) -> Result<PostUpdateOutcome, sqlx::Error> {
        let updated = sqlx::query(
            r#"
            UPDATE posts SET comments_enabled = TRUE
            WHERE id = $1 AND author_id = $2 AND is_deleted = FALSE
            "#,
        )
        .bind(post_id)
        .bind(author)
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return self.classify_update_miss(post_id).await;
        }
        Ok(PostUpdateOutcome::Updated)
    }

    /// Single-post projection for a viewer. None when missing or deleted.
    pub async fn get_post(
        &self,
        post_id: Uuid,
        viewer: Uuid,
    ) -> Result<Option<PostView>, sqlx::Error> {
        let sql = format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts p
            LEFT JOIN post_tags pt ON pt.post_id = p.id
            WHERE p.id = $2 AND p.is_deleted = FALSE
            GROUP BY p.id
            "#
        );

        sqlx::query_as::<_, PostView>(&sql)
            .bind(viewer)
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Live posts carrying `tag`, newest-best first, resuming after the
    /// cursor when one is given.
    pub async fn list_posts(
        &self,
        viewer: Uuid,
        tag: &str,
        limit: i64,
        cursor: Option<PostCursor>,
    ) -> Result<Vec<PostView>, sqlx::Error> {
        let keyset = if cursor.is_some() {
            r#" AND (p.score < $4
                 OR (p.score = $4 AND p.created_at < $5)
                 OR (p.score = $4 AND p.created_at = $5 AND p.id < $6))"#
        } else {
            ""
        };

        let sql = format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts p
            LEFT JOIN post_tags pt ON pt.post_id = p.id
            WHERE p.is_deleted = FALSE
              AND EXISTS (
                  SELECT 1 FROM post_tags ptf
                  WHERE ptf.post_id = p.id AND ptf.tag = $2
              ){keyset}
            GROUP BY p.id
            ORDER BY p.score DESC, p.created_at DESC, p.id DESC
            LIMIT $3
            "#
        );

        let query = sqlx::query_as::<_, PostView>(&sql)
            .bind(viewer)
            .bind(tag)
            .bind(limit);

        match cursor {
            Some(cur) => {
                query
                    .bind(cur.score)
                    .bind(cur.created_at)
                    .bind(cur.id)
                    .fetch_all(&self.pool)
                    .await
            }
            None => query.fetch_all(&self.pool).await,
        }
    }

    /// Re-read the sort key behind a pagination key. None when the post
    /// no longer exists; the caller then restarts from the first page.
    pub async fn resolve_cursor(&self, key: Uuid) -> Result<Option<PostCursor>, sqlx::Error> {
        let row = sqlx::query_as::<_, (i32, DateTime<Utc>)>(
            r#"SELECT score, created_at FROM posts WHERE id = $1"#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(score, created_at)| PostCursor {
            score,
            created_at,
            id: key,
        }))
    }

    /// True when the post exists and is not deleted.
    pub async fn post_exists(&self, post_id: Uuid) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM posts WHERE id = $1 AND is_deleted = FALSE
            )
            "#,
        )
        .bind(post_id)
        .fetch_one(&self.pool)
        .await
    }

    /// A guarded update matched nothing; tell missing post apart from a
    /// foreign one.
    async fn classify_update_miss(&self, post_id: Uuid) -> Result<PostUpdateOutcome, sqlx::Error> {
        let exists = self.post_exists(post_id).await?;
        Ok(if exists {
            PostUpdateOutcome::NotAuthor
        } else {
            PostUpdateOutcome::PostMissing
        })
    }
}
