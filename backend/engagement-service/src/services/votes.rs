/// Vote service
///
/// Thin orchestration over the vote ledger: run the write, record the
/// outcome, and translate precondition failures into client errors.
use tracing::{debug, warn};
use uuid::Uuid;

use crate::db::{VoteRepository, VoteWriteOutcome};
use crate::error::{AppError, Result};
use crate::metrics::writes::VOTE_WRITE_TOTAL;
use crate::models::{VoteDirection, VoteTarget};

#[derive(Clone)]
pub struct VoteService {
    votes: VoteRepository,
}

impl VoteService {
    pub fn new(votes: VoteRepository) -> Self {
        Self { votes }
    }

    /// Cast an up- or downvote. Repeating the same direction succeeds
    /// without changing anything; the opposite direction is a conflict
    /// until the current vote is withdrawn.
    pub async fn cast(
        &self,
        voter: Uuid,
        target: VoteTarget,
        direction: VoteDirection,
    ) -> Result<()> {
        let outcome = self.votes.cast_vote(voter, target, direction).await?;
        VOTE_WRITE_TOTAL
            .with_label_values(&[target.kind_str(), direction.as_str(), outcome_label(outcome)])
            .inc();

        match outcome_error(outcome, target) {
            None => {
                debug!(
                    user_id = %voter,
                    target = target.kind_str(),
                    direction = direction.as_str(),
                    "vote applied"
                );
                Ok(())
            }
            Some(err) => {
                warn!(
                    user_id = %voter,
                    target = target.kind_str(),
                    direction = direction.as_str(),
                    outcome = outcome_label(outcome),
                    "vote rejected"
                );
                Err(err)
            }
        }
    }

    /// Withdraw whatever vote the voter holds. Succeeds even when no
    /// vote exists.
    pub async fn withdraw(&self, voter: Uuid, target: VoteTarget) -> Result<()> {
        let outcome = self.votes.remove_vote(voter, target).await?;
        VOTE_WRITE_TOTAL
            .with_label_values(&[target.kind_str(), "unvote", outcome_label(outcome)])
            .inc();

        match outcome_error(outcome, target) {
            None => {
                debug!(user_id = %voter, target = target.kind_str(), "vote withdrawn");
                Ok(())
            }
            Some(err) => {
                warn!(
                    user_id = %voter,
                    target = target.kind_str(),
                    outcome = outcome_label(outcome),
                    "unvote rejected"
                );
                Err(err)
            }
        }
    }
}

fn outcome_label(outcome: VoteWriteOutcome) -> &'static str {
    match outcome {
        VoteWriteOutcome::Applied => "applied",
        VoteWriteOutcome::DirectionConflict => "direction_conflict",
        VoteWriteOutcome::TargetMissing => "target_missing",
        VoteWriteOutcome::SelfVote => "self_vote",
    }
}

/// Client-facing error for a vote outcome, None on success.
fn outcome_error(outcome: VoteWriteOutcome, target: VoteTarget) -> Option<AppError> {
    match outcome {
        VoteWriteOutcome::Applied => None,
        VoteWriteOutcome::TargetMissing => Some(AppError::NotFound(match target {
            VoteTarget::Post { .. } => "Post not found".to_string(),
            VoteTarget::Comment { .. } => "Comment not found".to_string(),
        })),
        VoteWriteOutcome::SelfVote => Some(AppError::Conflict(format!(
            "Cannot vote on your own {}",
            target.kind_str()
        ))),
        VoteWriteOutcome::DirectionConflict => Some(AppError::Conflict(
            "Withdraw the existing vote before voting the other way".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post_target() -> VoteTarget {
        VoteTarget::Post {
            post_id: Uuid::new_v4(),
        }
    }

    fn comment_target() -> VoteTarget {
        VoteTarget::Comment {
            post_id: Uuid::new_v4(),
            comment_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn applied_outcome_is_not_an_error() {
        assert!(outcome_error(VoteWriteOutcome::Applied, post_target()).is_none());
    }

    #[test]
    fn missing_target_maps_to_not_found_per_kind() {
        let err = outcome_error(VoteWriteOutcome::TargetMissing, post_target()).unwrap();
        assert!(matches!(err, AppError::NotFound(msg) if msg == "Post not found"));

        let err = outcome_error(VoteWriteOutcome::TargetMissing, comment_target()).unwrap();
        assert!(matches!(err, AppError::NotFound(msg) if msg == "Comment not found"));
    }

    #[test]
    fn self_vote_maps_to_conflict() {
        let err = outcome_error(VoteWriteOutcome::SelfVote, post_target()).unwrap();
        assert!(matches!(err, AppError::Conflict(msg) if msg.contains("your own post")));
    }

    #[test]
    fn direction_change_maps_to_conflict() {
        let err = outcome_error(VoteWriteOutcome::DirectionConflict, comment_target()).unwrap();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn outcome_labels_are_stable() {
        assert_eq!(outcome_label(VoteWriteOutcome::Applied), "applied");
        assert_eq!(
            outcome_label(VoteWriteOutcome::DirectionConflict),
            "direction_conflict"
        );
        assert_eq!(outcome_label(VoteWriteOutcome::TargetMissing), "target_missing");
        assert_eq!(outcome_label(VoteWriteOutcome::SelfVote), "self_vote");
    }
}
