/// HTTP handlers for engagement endpoints
///
/// This module contains handlers for:
/// - Posts: create, read, delete, tag-filtered listing, comment toggles
/// - Comments: add, both delete flavors, threaded listings
/// - Votes: cast and withdraw on posts and comments
///
/// Handlers stay thin: extract the caller, hand off to the service
/// layer, serialize the result.
use actix_web::web;

pub mod comments;
pub mod posts;
pub mod votes;

/// Route table under `/api/v1`. Literal segments (`disable`, `enable`)
/// are registered before `{comment_id}` so they are not swallowed by
/// the parameterized pattern.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/posts")
            .service(
                web::resource("")
                    .route(web::post().to(posts::create_post))
                    .route(web::get().to(posts::get_posts)),
            )
            .service(
                web::resource("/{post_id}")
                    .route(web::get().to(posts::get_post))
                    .route(web::delete().to(posts::delete_post)),
            )
            .route("/{post_id}/upvote", web::post().to(votes::upvote_post))
            .route("/{post_id}/downvote", web::post().to(votes::downvote_post))
            .route("/{post_id}/unvote", web::post().to(votes::unvote_post))
            .service(
                web::resource("/{post_id}/comments")
                    .route(web::post().to(comments::add_comment))
                    .route(web::get().to(comments::get_comments)),
            )
            .route(
                "/{post_id}/comments/disable",
                web::post().to(posts::disable_comments),
            )
            .route(
                "/{post_id}/comments/enable",
                web::post().to(posts::enable_comments),
            )
            .route(
                "/{post_id}/comments/{comment_id}",
                web::delete().to(comments::delete_comment),
            )
            .route(
                "/{post_id}/my-comments/{comment_id}",
                web::delete().to(comments::delete_my_comment),
            )
            .route(
                "/{post_id}/comments/{comment_id}/replies",
                web::get().to(comments::get_replies),
            )
            .route(
                "/{post_id}/comments/{comment_id}/upvote",
                web::post().to(votes::upvote_comment),
            )
            .route(
                "/{post_id}/comments/{comment_id}/downvote",
                web::post().to(votes::downvote_comment),
            )
            .route(
                "/{post_id}/comments/{comment_id}/unvote",
                web::post().to(votes::unvote_comment),
            ),
    );
}
