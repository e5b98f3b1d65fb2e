/// Engagement Service Main Entry Point
///
/// Starts the HTTP server with:
/// - PostgreSQL connection pool (shared db-pool crate)
/// - Schema migrations applied at startup
/// - Gateway identity middleware on the versioned API scope
/// - Prometheus metrics and health endpoints outside it
use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer};
use db_pool::{create_pool, DbConfig};
use engagement_service::config::Config;
use engagement_service::db::{CommentRepository, PostRepository, VoteRepository};
use engagement_service::handlers;
use engagement_service::metrics::serve_metrics;
use engagement_service::middleware::HeaderAuthMiddleware;
use engagement_service::services::{CommentService, PostService, VoteService};
use std::io;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

async fn health(pool: web::Data<sqlx::PgPool>) -> HttpResponse {
    match sqlx::query("SELECT 1").fetch_one(pool.get_ref()).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": "engagement-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
        Err(e) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "unhealthy",
            "error": format!("PostgreSQL connection failed: {}", e),
            "service": "engagement-service"
        })),
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Starting engagement-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    let mut db_cfg = DbConfig::for_service("engagement-service");
    db_cfg.database_url = config.database.url.clone();
    // Env can size the pool above the platform tier, never below it
    if config.database.max_connections > db_cfg.max_connections {
        db_cfg.max_connections = config.database.max_connections;
    }
    db_cfg.log_config();

    let db_pool = match create_pool(db_cfg).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Database pool creation failed: {}", e);
            eprintln!("ERROR: Failed to create database pool: {}", e);
            std::process::exit(1);
        }
    };
    tracing::info!("Connected to database via db-pool crate");

    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("Migrations failed: {e}")))?;
    tracing::info!("Database migrations completed");

    let post_service = web::Data::new(PostService::new(PostRepository::new(db_pool.clone())));
    let comment_service = web::Data::new(CommentService::new(
        CommentRepository::new(db_pool.clone()),
        PostRepository::new(db_pool.clone()),
    ));
    let vote_service = web::Data::new(VoteService::new(VoteRepository::new(db_pool.clone())));
    let pool_data = web::Data::new(db_pool);

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Starting HTTP server at {}", bind_address);

    HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in config.cors.allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        App::new()
            .app_data(pool_data.clone())
            .app_data(post_service.clone())
            .app_data(comment_service.clone())
            .app_data(vote_service.clone())
            .wrap(cors)
            .wrap(tracing_actix_web::TracingLogger::default())
            .route("/metrics", web::get().to(serve_metrics))
            .route("/api/v1/health", web::get().to(health))
            .service(
                web::scope("/api/v1")
                    .wrap(HeaderAuthMiddleware)
                    .configure(handlers::configure_routes),
            )
    })
    .bind(&bind_address)?
    .run()
    .await
}
