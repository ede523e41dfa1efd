//! Statistics endpoints
//!
//! Read-only aggregate views: SQL reports over the catalog store and
//! aggregation pipelines over the review store.

use axum::{extract::Query, extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::AppResult,
    services::{
        reports::{DEFAULT_TOP_BOOKS, DEFAULT_TOP_USERS},
        reviews::{DEFAULT_MIN_REVIEWS, DEFAULT_TOP_RATED},
    },
};

/// Global library counters
#[derive(Serialize, ToSchema)]
pub struct GlobalStats {
    pub total_books: i64,
    pub available_books: i64,
    pub borrowed_books: i64,
    pub total_users: i64,
    pub total_loans: i64,
    pub active_loans: i64,
}

/// Loan count per category; zero-loan categories appear with 0
#[derive(Serialize, ToSchema)]
pub struct CategoryLoanCount {
    pub category_id: i32,
    pub category_name: String,
    pub total_loans: i64,
}

/// Most-borrowed book entry
#[derive(Serialize, ToSchema)]
pub struct TopBook {
    pub book_id: i32,
    pub title: String,
    pub author: String,
    pub loan_count: i64,
}

/// User with overdue active loans
#[derive(Serialize, ToSchema)]
pub struct OverdueUser {
    pub user_id: i32,
    pub username: String,
    pub email: String,
    pub overdue_count: i64,
}

/// Most-active borrower entry
#[derive(Serialize, ToSchema)]
pub struct ActiveBorrower {
    pub user_id: i32,
    pub username: String,
    pub email: String,
    pub total_loans: i64,
    pub active_loans: i64,
}

/// Book that has never been borrowed
#[derive(Serialize, ToSchema)]
pub struct NeverBorrowedBook {
    pub book_id: i32,
    pub title: String,
    pub author: String,
    pub category_name: Option<String>,
}

/// Average loan duration per category, in days (one decimal)
#[derive(Serialize, ToSchema)]
pub struct CategoryLoanDuration {
    pub category_name: String,
    pub avg_days: f64,
    pub loan_count: i64,
}

/// Loans per calendar month
#[derive(Serialize, ToSchema)]
pub struct MonthlyLoanActivity {
    /// Month label, `YYYY-MM`
    pub month: String,
    pub loan_count: i64,
}

/// Rating aggregate for one book
#[derive(Serialize, ToSchema)]
pub struct BookRating {
    pub book_id: i32,
    /// Mean rating, rounded to one decimal
    pub mean_rating: f64,
    pub review_count: i64,
    pub min_rating: i32,
    pub max_rating: i32,
}

/// Global comment statistics
#[derive(Serialize, ToSchema)]
pub struct ReviewStats {
    pub total_comments: i64,
    pub mean_rating: f64,
    pub min_rating: i32,
    pub max_rating: i32,
}

/// Comments per calendar month
#[derive(Serialize, ToSchema)]
pub struct MonthlyReviewActivity {
    /// Month label, `YYYY-MM`
    pub month: String,
    pub comment_count: i64,
    pub mean_rating: f64,
}

/// Row cap for leaderboard-style reports
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

/// Parameters for the top-rated-books report
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct TopRatedQuery {
    /// Minimum number of reviews for a book to qualify (default 2)
    pub min_reviews: Option<i64>,
    /// Maximum number of rows (default 5)
    pub limit: Option<i64>,
}

fn clamp_limit(limit: Option<i64>, default: i64) -> i64 {
    limit.unwrap_or(default).clamp(1, 1000)
}

/// Get global library statistics
#[utoipa::path(
    get,
    path = "/stats",
    tag = "stats",
    responses(
        (status = 200, description = "Global library counters", body = GlobalStats)
    )
)]
pub async fn global_stats(State(state): State<crate::AppState>) -> AppResult<Json<GlobalStats>> {
    Ok(Json(state.services.reports.global_stats().await?))
}

/// Loans per category
#[utoipa::path(
    get,
    path = "/stats/categories",
    tag = "stats",
    responses(
        (status = 200, description = "Loan counts per category", body = Vec<CategoryLoanCount>)
    )
)]
pub async fn loans_by_category(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<CategoryLoanCount>>> {
    Ok(Json(state.services.reports.loans_by_category().await?))
}

/// Most borrowed books
#[utoipa::path(
    get,
    path = "/stats/top-books",
    tag = "stats",
    params(LimitQuery),
    responses(
        (status = 200, description = "Most borrowed books", body = Vec<TopBook>)
    )
)]
pub async fn top_books(
    State(state): State<crate::AppState>,
    Query(query): Query<LimitQuery>,
) -> AppResult<Json<Vec<TopBook>>> {
    let limit = clamp_limit(query.limit, DEFAULT_TOP_BOOKS);
    Ok(Json(state.services.reports.top_books(limit).await?))
}

/// Users with overdue loans
#[utoipa::path(
    get,
    path = "/stats/overdue",
    tag = "stats",
    responses(
        (status = 200, description = "Users with overdue active loans", body = Vec<OverdueUser>)
    )
)]
pub async fn overdue_users(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<OverdueUser>>> {
    Ok(Json(state.services.reports.overdue_users().await?))
}

/// Most active borrowers
#[utoipa::path(
    get,
    path = "/stats/top-users",
    tag = "stats",
    params(LimitQuery),
    responses(
        (status = 200, description = "Most active borrowers", body = Vec<ActiveBorrower>)
    )
)]
pub async fn top_users(
    State(state): State<crate::AppState>,
    Query(query): Query<LimitQuery>,
) -> AppResult<Json<Vec<ActiveBorrower>>> {
    let limit = clamp_limit(query.limit, DEFAULT_TOP_USERS);
    Ok(Json(state.services.reports.top_users(limit).await?))
}

/// Books never borrowed
#[utoipa::path(
    get,
    path = "/stats/never-borrowed",
    tag = "stats",
    responses(
        (status = 200, description = "Books without any loan row", body = Vec<NeverBorrowedBook>)
    )
)]
pub async fn never_borrowed(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<NeverBorrowedBook>>> {
    Ok(Json(state.services.reports.never_borrowed().await?))
}

/// Average loan duration per category
#[utoipa::path(
    get,
    path = "/stats/loan-durations",
    tag = "stats",
    responses(
        (status = 200, description = "Average loan duration per category", body = Vec<CategoryLoanDuration>)
    )
)]
pub async fn loan_durations(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<CategoryLoanDuration>>> {
    Ok(Json(state.services.reports.loan_duration_by_category().await?))
}

/// Monthly loan activity (last 12 months)
#[utoipa::path(
    get,
    path = "/stats/monthly",
    tag = "stats",
    responses(
        (status = 200, description = "Loans per month, newest first", body = Vec<MonthlyLoanActivity>)
    )
)]
pub async fn monthly_activity(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<MonthlyLoanActivity>>> {
    Ok(Json(state.services.reports.monthly_activity().await?))
}

/// Average rating per book
#[utoipa::path(
    get,
    path = "/stats/reviews",
    tag = "stats",
    responses(
        (status = 200, description = "Rating aggregates per book", body = Vec<BookRating>),
        (status = 503, description = "Review store unavailable")
    )
)]
pub async fn rating_per_book(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<BookRating>>> {
    Ok(Json(state.services.reviews.rating_per_book().await?))
}

/// Global comment statistics
#[utoipa::path(
    get,
    path = "/stats/reviews/summary",
    tag = "stats",
    responses(
        (status = 200, description = "Global comment statistics", body = ReviewStats),
        (status = 503, description = "Review store unavailable")
    )
)]
pub async fn review_summary(State(state): State<crate::AppState>) -> AppResult<Json<ReviewStats>> {
    Ok(Json(state.services.reviews.global_stats().await?))
}

/// Top-rated books
#[utoipa::path(
    get,
    path = "/stats/reviews/top-books",
    tag = "stats",
    params(TopRatedQuery),
    responses(
        (status = 200, description = "Best-rated books with enough reviews", body = Vec<BookRating>),
        (status = 503, description = "Review store unavailable")
    )
)]
pub async fn top_rated_books(
    State(state): State<crate::AppState>,
    Query(query): Query<TopRatedQuery>,
) -> AppResult<Json<Vec<BookRating>>> {
    let min_reviews = query.min_reviews.unwrap_or(DEFAULT_MIN_REVIEWS).max(1);
    let limit = clamp_limit(query.limit, DEFAULT_TOP_RATED);
    Ok(Json(state.services.reviews.top_rated(min_reviews, limit).await?))
}

/// Monthly comment activity
#[utoipa::path(
    get,
    path = "/stats/reviews/monthly",
    tag = "stats",
    responses(
        (status = 200, description = "Comments per month, newest first", body = Vec<MonthlyReviewActivity>),
        (status = 503, description = "Review store unavailable")
    )
)]
pub async fn monthly_review_activity(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<MonthlyReviewActivity>>> {
    Ok(Json(state.services.reviews.monthly_activity().await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_default_and_clamp() {
        assert_eq!(clamp_limit(None, DEFAULT_TOP_BOOKS), 10);
        assert_eq!(clamp_limit(None, DEFAULT_TOP_USERS), 5);
        assert_eq!(clamp_limit(Some(0), 10), 1);
        assert_eq!(clamp_limit(Some(5000), 10), 1000);
        assert_eq!(clamp_limit(Some(25), 10), 25);
    }
}
