use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, IntCounterVec};

lazy_static! {
    /// Vote write attempts by target kind (post/comment), action
    /// (up/down/unvote) and outcome (applied, direction_conflict,
    /// target_missing, self_vote).
    pub static ref VOTE_WRITE_TOTAL: IntCounterVec = register_int_counter_vec!(
        "vote_write_total",
        "Vote write attempts segmented by target kind, action and outcome",
        &["target", "action", "outcome"]
    )
    .expect("failed to register vote_write_total");

    /// Comment write attempts by operation (add, moderate_delete,
    /// delete_own) and outcome.
    pub static ref COMMENT_WRITE_TOTAL: IntCounterVec = register_int_counter_vec!(
        "comment_write_total",
        "Comment write attempts segmented by operation and outcome",
        &["operation", "outcome"]
    )
    .expect("failed to register comment_write_total");
}
