//! Comment (review) endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    api::stats::BookRating,
    error::AppResult,
    models::comment::{Comment, CommentInput, CommentUpdate},
};

/// Pagination for the recent-comments listing
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct RecentQuery {
    /// Maximum number of rows (default 10)
    pub limit: Option<i64>,
    /// Rows to skip (default 0)
    pub offset: Option<u64>,
}

/// Keyword search parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct CommentSearchQuery {
    pub keyword: String,
}

/// Bulk delete result
#[derive(Serialize, ToSchema)]
pub struct DeletedCount {
    pub deleted: u64,
}

/// Post a comment on a book
#[utoipa::path(
    post,
    path = "/comments",
    tag = "comments",
    request_body = CommentInput,
    responses(
        (status = 201, description = "Comment created", body = Comment),
        (status = 400, description = "Rating out of range or empty text"),
        (status = 503, description = "Review store unavailable")
    )
)]
pub async fn create_comment(
    State(state): State<crate::AppState>,
    Json(input): Json<CommentInput>,
) -> AppResult<(StatusCode, Json<Comment>)> {
    let comment = state.services.reviews.add(input).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// Get one comment
#[utoipa::path(
    get,
    path = "/comments/{id}",
    tag = "comments",
    params(("id" = String, Path, description = "Opaque comment ID")),
    responses(
        (status = 200, description = "The comment", body = Comment),
        (status = 404, description = "Comment not found"),
        (status = 503, description = "Review store unavailable")
    )
)]
pub async fn get_comment(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Comment>> {
    Ok(Json(state.services.reviews.get(&id).await?))
}

/// Edit a comment
#[utoipa::path(
    put,
    path = "/comments/{id}",
    tag = "comments",
    params(("id" = String, Path, description = "Opaque comment ID")),
    request_body = CommentUpdate,
    responses(
        (status = 200, description = "Comment updated", body = Comment),
        (status = 404, description = "Comment not found"),
        (status = 503, description = "Review store unavailable")
    )
)]
pub async fn update_comment(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
    Json(update): Json<CommentUpdate>,
) -> AppResult<Json<Comment>> {
    Ok(Json(state.services.reviews.update(&id, update).await?))
}

/// Delete a comment
#[utoipa::path(
    delete,
    path = "/comments/{id}",
    tag = "comments",
    params(("id" = String, Path, description = "Opaque comment ID")),
    responses(
        (status = 204, description = "Comment deleted"),
        (status = 404, description = "Comment not found"),
        (status = 503, description = "Review store unavailable")
    )
)]
pub async fn delete_comment(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.services.reviews.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Latest comments across all books
#[utoipa::path(
    get,
    path = "/comments/recent",
    tag = "comments",
    params(RecentQuery),
    responses(
        (status = 200, description = "Latest comments, newest first", body = Vec<Comment>),
        (status = 503, description = "Review store unavailable")
    )
)]
pub async fn recent_comments(
    State(state): State<crate::AppState>,
    Query(query): Query<RecentQuery>,
) -> AppResult<Json<Vec<Comment>>> {
    let limit = query.limit.unwrap_or(10).clamp(1, 100);
    let offset = query.offset.unwrap_or(0);
    Ok(Json(state.services.reviews.recent(limit, offset).await?))
}

/// Keyword search over comment text
#[utoipa::path(
    get,
    path = "/comments/search",
    tag = "comments",
    params(CommentSearchQuery),
    responses(
        (status = 200, description = "Matching comments, newest first", body = Vec<Comment>),
        (status = 503, description = "Review store unavailable")
    )
)]
pub async fn search_comments(
    State(state): State<crate::AppState>,
    Query(query): Query<CommentSearchQuery>,
) -> AppResult<Json<Vec<Comment>>> {
    Ok(Json(state.services.reviews.search(&query.keyword).await?))
}

/// Comments on a book
#[utoipa::path(
    get,
    path = "/books/{id}/comments",
    tag = "comments",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Comments on the book, newest first", body = Vec<Comment>),
        (status = 503, description = "Review store unavailable")
    )
)]
pub async fn book_comments(
    State(state): State<crate::AppState>,
    Path(book_id): Path<i32>,
) -> AppResult<Json<Vec<Comment>>> {
    Ok(Json(state.services.reviews.for_book(book_id).await?))
}

/// Delete every comment on a book (explicit admin call, not a cascade)
#[utoipa::path(
    delete,
    path = "/books/{id}/comments",
    tag = "comments",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Comments deleted", body = DeletedCount),
        (status = 503, description = "Review store unavailable")
    )
)]
pub async fn delete_book_comments(
    State(state): State<crate::AppState>,
    Path(book_id): Path<i32>,
) -> AppResult<Json<DeletedCount>> {
    let deleted = state.services.reviews.delete_for_book(book_id).await?;
    Ok(Json(DeletedCount { deleted }))
}

/// Rating summary for a book
#[utoipa::path(
    get,
    path = "/books/{id}/rating",
    tag = "comments",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Rating aggregate for the book", body = BookRating),
        (status = 404, description = "Book has no comments"),
        (status = 503, description = "Review store unavailable")
    )
)]
pub async fn book_rating(
    State(state): State<crate::AppState>,
    Path(book_id): Path<i32>,
) -> AppResult<Json<BookRating>> {
    let rating = state
        .services
        .reviews
        .rating_for_book(book_id)
        .await?
        .ok_or_else(|| {
            crate::error::AppError::NotFound(format!("Book {} has no comments", book_id))
        })?;
    Ok(Json(rating))
}

/// Comments by a user
#[utoipa::path(
    get,
    path = "/users/{id}/comments",
    tag = "comments",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "Comments by the user, newest first", body = Vec<Comment>),
        (status = 503, description = "Review store unavailable")
    )
)]
pub async fn user_comments(
    State(state): State<crate::AppState>,
    Path(user_id): Path<i32>,
) -> AppResult<Json<Vec<Comment>>> {
    Ok(Json(state.services.reviews.for_user(user_id).await?))
}
