//! BiblioApp Server - Library Management Backend

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use biblio_server::{
    api,
    config::AppConfig,
    repository::Repository,
    services::{reviews::ReviewsService, Services},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("biblio_server={},tower_http=debug", config.logging.level).into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting BiblioApp Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool. Catalog store connectivity is fatal:
    // no partial bring-up without the relational database.
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Connected to catalog store");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // Connect to the review store. Its absence is tolerated: the server
    // comes up with review features disabled.
    let reviews = if config.mongodb.enabled {
        match ReviewsService::connect(&config.mongodb).await {
            Ok(service) => {
                tracing::info!("Connected to review store");
                service
            }
            Err(e) => {
                tracing::warn!("Review store unreachable, review features disabled: {}", e);
                ReviewsService::disabled()
            }
        }
    } else {
        tracing::info!("Review store disabled by configuration");
        ReviewsService::disabled()
    };

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create repository and services
    let repository = Repository::new(pool);
    let services = Services::new(repository, reviews);

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(
        server_host.parse().expect("Invalid host address"),
        server_port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Authentication
        .route("/auth/login", post(api::auth::login))
        .route("/auth/register", post(api::auth::register))
        // Catalog
        .route("/books", get(api::books::search_books))
        .route("/books", post(api::books::create_book))
        .route("/books/:id", get(api::books::get_book))
        .route("/books/:id", put(api::books::update_book))
        .route("/books/:id", delete(api::books::delete_book))
        .route("/categories", get(api::books::list_categories))
        // Users
        .route("/users/:id", get(api::books::get_user))
        .route("/users/:id/loans", get(api::loans::user_loans))
        .route("/users/:id/loans/history", get(api::loans::user_loan_history))
        .route("/users/:id/comments", get(api::comments::user_comments))
        // Loans
        .route("/loans", post(api::loans::borrow))
        .route("/loans/:id/return", post(api::loans::return_loan))
        // Comments
        .route("/comments", post(api::comments::create_comment))
        .route("/comments/recent", get(api::comments::recent_comments))
        .route("/comments/search", get(api::comments::search_comments))
        .route("/comments/:id", get(api::comments::get_comment))
        .route("/comments/:id", put(api::comments::update_comment))
        .route("/comments/:id", delete(api::comments::delete_comment))
        .route("/books/:id/comments", get(api::comments::book_comments))
        .route("/books/:id/comments", delete(api::comments::delete_book_comments))
        .route("/books/:id/rating", get(api::comments::book_rating))
        // Statistics
        .route("/stats", get(api::stats::global_stats))
        .route("/stats/categories", get(api::stats::loans_by_category))
        .route("/stats/top-books", get(api::stats::top_books))
        .route("/stats/overdue", get(api::stats::overdue_users))
        .route("/stats/top-users", get(api::stats::top_users))
        .route("/stats/never-borrowed", get(api::stats::never_borrowed))
        .route("/stats/loan-durations", get(api::stats::loan_durations))
        .route("/stats/monthly", get(api::stats::monthly_activity))
        .route("/stats/reviews", get(api::stats::rating_per_book))
        .route("/stats/reviews/summary", get(api::stats::review_summary))
        .route("/stats/reviews/top-books", get(api::stats::top_rated_books))
        .route("/stats/reviews/monthly", get(api::stats::monthly_review_activity))
        .with_state(state);

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
