//! Loans repository for database operations
//!
//! Borrow and return each run in a single transaction so the loan row and
//! the book availability flag cannot drift apart. The book row is locked
//! `FOR UPDATE` first, which serializes concurrent borrow attempts on the
//! same book.

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Availability, Book},
        loan::{due_date, Loan, UserLoan},
    },
};

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get loan by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>(
            "SELECT id, book_id, user_id, loan_date, due_date, returned_date FROM loans WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    /// Borrow a book: create the loan and flip the book to borrowed.
    ///
    /// Early returns drop the transaction, rolling back any partial write.
    pub async fn borrow(&self, book_id: i32, user_id: i32) -> AppResult<Loan> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>(
            "SELECT id, title, author, category_id, availability FROM books WHERE id = $1 FOR UPDATE",
        )
        .bind(book_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))?;

        if book.availability != Availability::Available {
            return Err(AppError::AlreadyBorrowed);
        }

        let already_holds: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM loans
                WHERE book_id = $1 AND user_id = $2 AND returned_date IS NULL
            )
            "#,
        )
        .bind(book_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        if already_holds {
            return Err(AppError::DuplicateActiveLoan);
        }

        let loan = sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO loans (book_id, user_id, loan_date, due_date)
            VALUES ($1, $2, $3, $4)
            RETURNING id, book_id, user_id, loan_date, due_date, returned_date
            "#,
        )
        .bind(book_id)
        .bind(user_id)
        .bind(now)
        .bind(due_date(now))
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE books SET availability = $1 WHERE id = $2")
            .bind(Availability::Borrowed)
            .bind(book_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(loan)
    }

    /// Return a loan: stamp the return date and flip the book back to
    /// available, in the same transaction.
    pub async fn return_loan(&self, loan_id: i32) -> AppResult<Loan> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let loan = sqlx::query_as::<_, Loan>(
            r#"
            SELECT id, book_id, user_id, loan_date, due_date, returned_date
            FROM loans WHERE id = $1 FOR UPDATE
            "#,
        )
        .bind(loan_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", loan_id)))?;

        if loan.returned_date.is_some() {
            return Err(AppError::AlreadyReturned);
        }

        let loan = sqlx::query_as::<_, Loan>(
            r#"
            UPDATE loans SET returned_date = $1
            WHERE id = $2
            RETURNING id, book_id, user_id, loan_date, due_date, returned_date
            "#,
        )
        .bind(now)
        .bind(loan_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE books SET availability = $1 WHERE id = $2")
            .bind(Availability::Available)
            .bind(loan.book_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(loan)
    }

    /// Active loans for a user, with book title/author, oldest first
    pub async fn active_for_user(&self, user_id: i32) -> AppResult<Vec<UserLoan>> {
        let loans = sqlx::query_as::<_, UserLoan>(
            r#"
            SELECT l.id, l.book_id, b.title, b.author,
                   l.loan_date, l.due_date, l.returned_date
            FROM loans l
            JOIN books b ON l.book_id = b.id
            WHERE l.user_id = $1 AND l.returned_date IS NULL
            ORDER BY l.loan_date ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(loans)
    }

    /// Full loan history for a user, newest first
    pub async fn history_for_user(&self, user_id: i32) -> AppResult<Vec<UserLoan>> {
        let loans = sqlx::query_as::<_, UserLoan>(
            r#"
            SELECT l.id, l.book_id, b.title, b.author,
                   l.loan_date, l.due_date, l.returned_date
            FROM loans l
            JOIN books b ON l.book_id = b.id
            WHERE l.user_id = $1
            ORDER BY l.loan_date DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(loans)
    }
}
