/// Post handlers - HTTP endpoints for post operations
use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::error::Result;
use crate::middleware::UserId;
use crate::models::{CreatePostRequest, DisableCommentsRequest, GetPostsQuery};
use crate::services::PostService;

/// Create a post with its tag set
pub async fn create_post(
    service: web::Data<PostService>,
    user: UserId,
    req: web::Json<CreatePostRequest>,
) -> Result<HttpResponse> {
    let resp = service.create_post(user.0, req.into_inner()).await?;
    Ok(HttpResponse::Created().json(resp))
}

/// Tag-filtered post listing
pub async fn get_posts(
    service: web::Data<PostService>,
    user: UserId,
    query: web::Query<GetPostsQuery>,
) -> Result<HttpResponse> {
    let resp = service.get_posts(user.0, query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(resp))
}

/// Single post with the viewer projection
pub async fn get_post(
    service: web::Data<PostService>,
    user: UserId,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let post = service.get_post(user.0, *post_id).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// Author-only soft delete
pub async fn delete_post(
    service: web::Data<PostService>,
    user: UserId,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    service.delete_post(user.0, *post_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Turn comments off, optionally deleting the existing ones
pub async fn disable_comments(
    service: web::Data<PostService>,
    user: UserId,
    post_id: web::Path<Uuid>,
    req: web::Json<DisableCommentsRequest>,
) -> Result<HttpResponse> {
    service
        .disable_comments(user.0, *post_id, req.delete_existing)
        .await?;
    Ok(HttpResponse::Ok().finish())
}

/// Turn comments back on
pub async fn enable_comments(
    service: web::Data<PostService>,
    user: UserId,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    service.enable_comments(user.0, *post_id).await?;
    Ok(HttpResponse::Ok().finish())
}
