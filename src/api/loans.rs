//! Loan lifecycle endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::loan::{LoanDetails, UserLoan},
};

/// Borrow request
#[derive(Deserialize, ToSchema)]
pub struct BorrowRequest {
    /// Book to borrow
    pub book_id: i32,
    /// Borrowing user
    pub user_id: i32,
}

/// Borrow a book
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    request_body = BorrowRequest,
    responses(
        (status = 201, description = "Loan created", body = LoanDetails),
        (status = 404, description = "Book or user not found"),
        (status = 409, description = "Book already borrowed, or user already holds it")
    )
)]
pub async fn borrow(
    State(state): State<crate::AppState>,
    Json(request): Json<BorrowRequest>,
) -> AppResult<(StatusCode, Json<LoanDetails>)> {
    let loan = state
        .services
        .loans
        .borrow(request.book_id, request.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(loan)))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/loans/{id}/return",
    tag = "loans",
    params(("id" = i32, Path, description = "Loan ID")),
    responses(
        (status = 200, description = "Book returned", body = LoanDetails),
        (status = 404, description = "Loan not found"),
        (status = 409, description = "Already returned")
    )
)]
pub async fn return_loan(
    State(state): State<crate::AppState>,
    Path(loan_id): Path<i32>,
) -> AppResult<Json<LoanDetails>> {
    let loan = state.services.loans.return_loan(loan_id).await?;
    Ok(Json(loan))
}

/// Get a user's active loans
#[utoipa::path(
    get,
    path = "/users/{id}/loans",
    tag = "loans",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "Active loans, oldest first", body = Vec<UserLoan>),
        (status = 404, description = "User not found")
    )
)]
pub async fn user_loans(
    State(state): State<crate::AppState>,
    Path(user_id): Path<i32>,
) -> AppResult<Json<Vec<UserLoan>>> {
    Ok(Json(state.services.loans.active_loans(user_id).await?))
}

/// Get a user's full loan history
#[utoipa::path(
    get,
    path = "/users/{id}/loans/history",
    tag = "loans",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "All loans, newest first", body = Vec<UserLoan>),
        (status = 404, description = "User not found")
    )
)]
pub async fn user_loan_history(
    State(state): State<crate::AppState>,
    Path(user_id): Path<i32>,
) -> AppResult<Json<Vec<UserLoan>>> {
    Ok(Json(state.services.loans.history(user_id).await?))
}
