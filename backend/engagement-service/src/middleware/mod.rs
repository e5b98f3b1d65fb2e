/// HTTP middleware utilities for engagement-service
///
/// Identity is established at the API gateway, which authenticates the
/// session and forwards the caller as an `X-User-Id` header. This module
/// turns that header into a typed `UserId` extension for handlers.
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{error::ErrorUnauthorized, Error, FromRequest, HttpMessage, HttpRequest};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;
use uuid::Uuid;

/// Header set by the gateway after session validation.
pub const USER_ID_HEADER: &str = "X-User-Id";

/// Extracted user identifier stored in request extensions after auth.
#[derive(Debug, Clone)]
pub struct UserId(pub Uuid);

/// Actix middleware that resolves the calling user from the gateway header.
pub struct HeaderAuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for HeaderAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = HeaderAuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(HeaderAuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct HeaderAuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for HeaderAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();

        Box::pin(async move {
            let header = req
                .headers()
                .get(USER_ID_HEADER)
                .and_then(|h| h.to_str().ok())
                .ok_or_else(|| ErrorUnauthorized("Missing X-User-Id header"))?;

            let user_id = Uuid::parse_str(header)
                .map_err(|_| ErrorUnauthorized("Invalid user ID"))?;

            req.extensions_mut().insert(UserId(user_id));

            service.call(req).await
        })
    }
}

impl FromRequest for UserId {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<UserId>()
                .cloned()
                .ok_or_else(|| ErrorUnauthorized("User ID missing")),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, web, App, HttpResponse};

    async fn test_handler(user: UserId) -> actix_web::Result<HttpResponse> {
        Ok(HttpResponse::Ok().body(user.0.to_string()))
    }

    #[actix_web::test]
    async fn test_valid_header_allows_access() {
        let app = test::init_service(
            App::new()
                .wrap(HeaderAuthMiddleware)
                .route("/test", web::get().to(test_handler)),
        )
        .await;

        let user_id = Uuid::new_v4();
        let req = test::TestRequest::get()
            .uri("/test")
            .insert_header((USER_ID_HEADER, user_id.to_string()))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let body = test::read_body(resp).await;
        assert_eq!(body, user_id.to_string().as_bytes());
    }

    #[actix_web::test]
    async fn test_missing_header_rejected() {
        let app = test::init_service(
            App::new()
                .wrap(HeaderAuthMiddleware)
                .route("/test", web::get().to(test_handler)),
        )
        .await;

        let req = test::TestRequest::get().uri("/test").to_request();
        let resp = test::try_call_service(&app, req).await;

        match resp {
            Err(err) => {
                assert_eq!(err.error_response().status(), 401);
            }
            Ok(resp) => assert_eq!(resp.status(), 401),
        }
    }

    #[actix_web::test]
    async fn test_malformed_user_id_rejected() {
        let app = test::init_service(
            App::new()
                .wrap(HeaderAuthMiddleware)
                .route("/test", web::get().to(test_handler)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/test")
            .insert_header((USER_ID_HEADER, "not-a-uuid"))
            .to_request();

        let resp = test::try_call_service(&app, req).await;

        match resp {
            Err(err) => {
                assert_eq!(err.error_response().status(), 401);
            }
            Ok(resp) => assert_eq!(resp.status(), 401),
        }
    }
}
