/// Vote handlers - HTTP endpoints for casting and withdrawing votes
use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::error::Result;
use crate::middleware::UserId;
use crate::models::{VoteDirection, VoteTarget};
use crate::services::VoteService;

pub async fn upvote_post(
    service: web::Data<VoteService>,
    user: UserId,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    cast(service, user, VoteTarget::Post { post_id: *post_id }, VoteDirection::Up).await
}

pub async fn downvote_post(
    service: web::Data<VoteService>,
    user: UserId,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    cast(service, user, VoteTarget::Post { post_id: *post_id }, VoteDirection::Down).await
}

pub async fn unvote_post(
    service: web::Data<VoteService>,
    user: UserId,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    service
        .withdraw(user.0, VoteTarget::Post { post_id: *post_id })
        .await?;
    Ok(HttpResponse::Ok().finish())
}

pub async fn upvote_comment(
    service: web::Data<VoteService>,
    user: UserId,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse> {
    cast(service, user, comment_target(path), VoteDirection::Up).await
}

pub async fn downvote_comment(
    service: web::Data<VoteService>,
    user: UserId,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse> {
    cast(service, user, comment_target(path), VoteDirection::Down).await
}

pub async fn unvote_comment(
    service: web::Data<VoteService>,
    user: UserId,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse> {
    service.withdraw(user.0, comment_target(path)).await?;
    Ok(HttpResponse::Ok().finish())
}

async fn cast(
    service: web::Data<VoteService>,
    user: UserId,
    target: VoteTarget,
    direction: VoteDirection,
) -> Result<HttpResponse> {
    service.cast(user.0, target, direction).await?;
    Ok(HttpResponse::Ok().finish())
}

fn comment_target(path: web::Path<(Uuid, Uuid)>) -> VoteTarget {
    let (post_id, comment_id) = path.into_inner();
    VoteTarget::Comment {
        post_id,
        comment_id,
    }
}
