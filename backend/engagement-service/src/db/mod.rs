/// Database repositories for engagement-service
///
/// Each repository owns the SQL for one aggregate and returns typed
/// outcomes instead of raw row counts, so the service layer can map
/// precondition failures to HTTP errors without re-querying.
pub mod comment_repo;
pub mod post_repo;
pub mod vote_repo;

pub use comment_repo::{
    CommentCursor, CommentDeleteOutcome, CommentInsertOutcome, CommentRepository,
    MAX_COMMENT_DEPTH,
};
pub use post_repo::{PostCursor, PostRepository, PostUpdateOutcome};
pub use vote_repo::{VoteRepository, VoteWriteOutcome};
