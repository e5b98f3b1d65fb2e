/// Engagement Service Library
///
/// Vote and comment aggregation engine: anonymous-feed posts, threaded
/// comments, and the per-(voter, target) vote ledger with
/// trigger-maintained counters.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers
/// - `models`: Viewer projections, vote types, request/response DTOs
/// - `services`: Business logic layer
/// - `db`: Database access layer and repositories
/// - `middleware`: Gateway identity-header middleware and extractor
/// - `validators`: Content and tag field validators
/// - `error`: Error types and handling
/// - `config`: Configuration management
/// - `metrics`: Observability and metrics collection
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod services;
pub mod validators;

pub use config::Config;
pub use error::{AppError, Result};
