/// Service layer for engagement-service
///
/// Services own the request-level rules (limit bounds, tag shape,
/// outcome to error mapping) and orchestrate the repositories. They
/// hold no SQL.
pub mod comments;
pub mod posts;
pub mod votes;

pub use comments::CommentService;
pub use posts::PostService;
pub use votes::VoteService;

use uuid::Uuid;

use crate::error::{AppError, Result};

/// Resolve an optional page limit against its documented bounds. An
/// omitted value takes the default; an explicit out-of-range value,
/// zero included, is rejected.
pub(crate) fn bounded_limit(
    value: Option<i32>,
    default: i64,
    min: i64,
    max: i64,
    field: &str,
) -> Result<i64> {
    match value {
        None => Ok(default),
        Some(v) => {
            let v = i64::from(v);
            if (min..=max).contains(&v) {
                Ok(v)
            } else {
                Err(AppError::Validation(format!(
                    "{field} must be between {min} and {max}"
                )))
            }
        }
    }
}

/// Pagination key for the next page: the id of the last returned item,
/// emitted only when the page came back full. A short page is the last
/// one and carries no key.
pub(crate) fn next_page_key<T>(items: &[T], limit: i64, id_of: impl Fn(&T) -> Uuid) -> Option<Uuid> {
    if items.len() as i64 == limit {
        items.last().map(id_of)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn omitted_limit_takes_default() {
        assert_eq!(bounded_limit(None, 25, 1, 50, "limit").unwrap(), 25);
    }

    #[test]
    fn explicit_zero_is_rejected_when_the_floor_is_one() {
        let err = bounded_limit(Some(0), 25, 1, 50, "limit").unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("limit")));
    }

    #[test]
    fn bounds_are_inclusive() {
        assert_eq!(bounded_limit(Some(1), 25, 1, 50, "limit").unwrap(), 1);
        assert_eq!(bounded_limit(Some(50), 25, 1, 50, "limit").unwrap(), 50);
        assert!(bounded_limit(Some(51), 25, 1, 50, "limit").is_err());
        assert!(bounded_limit(Some(-1), 25, 1, 50, "limit").is_err());
    }

    #[test]
    fn zero_is_legal_when_the_floor_allows_it() {
        let v = bounded_limit(Some(0), 3, 0, 10, "direct_replies_per_comment").unwrap();
        assert_eq!(v, 0);
    }

    #[test]
    fn full_page_emits_the_last_id_as_next_key() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let items = vec![a, b];
        assert_eq!(next_page_key(&items, 2, |id| *id), Some(b));
    }

    #[test]
    fn short_page_emits_no_next_key() {
        let items = vec![Uuid::new_v4()];
        assert_eq!(next_page_key(&items, 2, |id| *id), None);
        let empty: Vec<Uuid> = Vec::new();
        assert_eq!(next_page_key(&empty, 2, |id| *id), None);
    }
}
