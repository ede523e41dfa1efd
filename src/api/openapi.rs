//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, comments, health, loans, stats};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "BiblioApp API",
        version = "0.1.0",
        description = "Library Management REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::register,
        // Books
        books::search_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        books::list_categories,
        books::get_user,
        // Loans
        loans::borrow,
        loans::return_loan,
        loans::user_loans,
        loans::user_loan_history,
        // Comments
        comments::create_comment,
        comments::get_comment,
        comments::update_comment,
        comments::delete_comment,
        comments::recent_comments,
        comments::search_comments,
        comments::book_comments,
        comments::delete_book_comments,
        comments::book_rating,
        comments::user_comments,
        // Stats
        stats::global_stats,
        stats::loans_by_category,
        stats::top_books,
        stats::overdue_users,
        stats::top_users,
        stats::never_borrowed,
        stats::loan_durations,
        stats::monthly_activity,
        stats::rating_per_book,
        stats::review_summary,
        stats::top_rated_books,
        stats::monthly_review_activity,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            crate::models::user::RegisterUser,
            crate::models::user::UserSummary,
            // Books
            crate::models::book::Book,
            crate::models::book::BookSummary,
            crate::models::book::BookInput,
            crate::models::book::BookSearch,
            crate::models::book::Availability,
            crate::models::category::Category,
            // Loans
            loans::BorrowRequest,
            crate::models::loan::Loan,
            crate::models::loan::LoanDetails,
            crate::models::loan::UserLoan,
            // Comments
            crate::models::comment::Comment,
            crate::models::comment::CommentInput,
            crate::models::comment::CommentUpdate,
            comments::DeletedCount,
            // Stats
            stats::GlobalStats,
            stats::CategoryLoanCount,
            stats::TopBook,
            stats::OverdueUser,
            stats::ActiveBorrower,
            stats::NeverBorrowedBook,
            stats::CategoryLoanDuration,
            stats::MonthlyLoanActivity,
            stats::BookRating,
            stats::ReviewStats,
            stats::MonthlyReviewActivity,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "books", description = "Catalog management"),
        (name = "users", description = "User profiles"),
        (name = "loans", description = "Loan lifecycle"),
        (name = "comments", description = "Reviews and ratings"),
        (name = "stats", description = "Statistics and reports")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
