/// Comment handlers - HTTP endpoints for comment operations
use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::error::Result;
use crate::middleware::UserId;
use crate::models::{AddCommentRequest, GetCommentsQuery, GetRepliesQuery};
use crate::services::CommentService;

/// Add a comment, top level or as a reply
pub async fn add_comment(
    service: web::Data<CommentService>,
    user: UserId,
    post_id: web::Path<Uuid>,
    req: web::Json<AddCommentRequest>,
) -> Result<HttpResponse> {
    let resp = service
        .add_comment(user.0, *post_id, req.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(resp))
}

/// Paginated top-level comments with inline reply previews
pub async fn get_comments(
    service: web::Data<CommentService>,
    user: UserId,
    post_id: web::Path<Uuid>,
    query: web::Query<GetCommentsQuery>,
) -> Result<HttpResponse> {
    let resp = service
        .get_comments(user.0, *post_id, query.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(resp))
}

/// Paginated direct replies of one comment
pub async fn get_replies(
    service: web::Data<CommentService>,
    user: UserId,
    path: web::Path<(Uuid, Uuid)>,
    query: web::Query<GetRepliesQuery>,
) -> Result<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let resp = service
        .get_replies(user.0, post_id, comment_id, query.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(resp))
}

/// Post-author moderation delete
pub async fn delete_comment(
    service: web::Data<CommentService>,
    user: UserId,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    service
        .delete_comment_as_post_author(user.0, post_id, comment_id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Comment-author delete of their own comment
pub async fn delete_my_comment(
    service: web::Data<CommentService>,
    user: UserId,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    service
        .delete_own_comment(user.0, post_id, comment_id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
