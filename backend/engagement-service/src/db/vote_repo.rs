/// Vote ledger repository
///
/// One row per (target_kind, target_id, user_id); row absence means
/// "no vote". Counter columns on posts/comments are adjusted by the
/// `votes_sync_counters` trigger inside the same transaction, so a read
/// that starts after `cast_vote` returns already sees the new counts.
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::models::{VoteDirection, VoteTarget};

/// Result of a vote write after all preconditions ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteWriteOutcome {
    /// Vote row inserted, or a same-direction repeat (no visible change).
    Applied,
    /// A vote in the opposite direction already exists.
    DirectionConflict,
    /// Target missing, deleted, or not under the given post.
    TargetMissing,
    /// The voter authored the target.
    SelfVote,
}

#[derive(Clone)]
pub struct VoteRepository {
    pool: PgPool,
}

impl VoteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record an up- or downvote.
    ///
    /// Precondition order is fixed: target existence, then self-vote,
    /// then the transition check. The transition check is a conditional
    /// upsert, so two racing writers for the same (voter, target) key
    /// serialize on the row and at most one of two opposite directions
    /// wins.
    pub async fn cast_vote(
        &self,
        voter: Uuid,
        target: VoteTarget,
        direction: VoteDirection,
    ) -> Result<VoteWriteOutcome, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let author_id = match target_author(&mut tx, target).await? {
            Some(id) => id,
            None => return Ok(VoteWriteOutcome::TargetMissing),
        };
        if author_id == voter {
            return Ok(VoteWriteOutcome::SelfVote);
        }

        // The DO UPDATE arm only matches when the stored direction equals
        // the new one, which makes a repeat vote a no-op update that still
        // returns a row. A direction change matches nothing and returns no
        // row; the caller must unvote first.
        let applied = sqlx::query_scalar::<_, i16>(
            r#"
            INSERT INTO votes (target_kind, target_id, user_id, vote_value)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (target_kind, target_id, user_id) DO UPDATE
                SET vote_value = EXCLUDED.vote_value
                WHERE votes.vote_value = EXCLUDED.vote_value
            RETURNING vote_value
            "#,
        )
        .bind(target.kind())
        .bind(target.target_id())
        .bind(voter)
        .bind(direction.value())
        .fetch_optional(&mut *tx)
        .await?;

        if applied.is_none() {
            return Ok(VoteWriteOutcome::DirectionConflict);
        }

        tx.commit().await?;
        Ok(VoteWriteOutcome::Applied)
    }

    /// Withdraw whatever vote the voter holds on the target.
    ///
    /// Deleting a missing row is a success; unvote is idempotent from
    /// every state. Target and self-vote preconditions still apply.
    pub async fn remove_vote(
        &self,
        voter: Uuid,
        target: VoteTarget,
    ) -> Result<VoteWriteOutcome, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let author_id = match target_author(&mut tx, target).await? {
            Some(id) => id,
            None => return Ok(VoteWriteOutcome::TargetMissing),
        };
        if author_id == voter {
            return Ok(VoteWriteOutcome::SelfVote);
        }

        sqlx::query(
            r#"
            DELETE FROM votes
            WHERE target_kind = $1 AND target_id = $2 AND user_id = $3
            "#,
        )
        .bind(target.kind())
        .bind(target.target_id())
        .bind(voter)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(VoteWriteOutcome::Applied)
    }
}

/// Author of a live target, or None when the target (or, for comments,
/// its post) is missing or deleted.
async fn target_author(
    tx: &mut Transaction<'_, Postgres>,
    target: VoteTarget,
) -> Result<Option<Uuid>, sqlx::Error> {
    match target {
        VoteTarget::Post { post_id } => {
            sqlx::query_scalar::<_, Uuid>(
                r#"
                SELECT author_id FROM posts
                WHERE id = $1 AND is_deleted = FALSE
                "#,
            )
            .bind(post_id)
            .fetch_optional(&mut **tx)
            .await
        }
        VoteTarget::Comment {
            post_id,
            comment_id,
        } => {
            sqlx::query_scalar::<_, Uuid>(
                r#"
                SELECT c.author_id
                FROM comments c
                JOIN posts p ON p.id = c.post_id
                WHERE c.id = $1 AND c.post_id = $2
                  AND c.is_deleted = FALSE AND p.is_deleted = FALSE
                "#,
            )
            .bind(comment_id)
            .bind(post_id)
            .fetch_optional(&mut **tx)
            .await
        }
    }
}
