//! Reporting service
//!
//! Read-only aggregate views over the catalog store. Every operation is a
//! single composed query with a fixed shape; averages come back rounded to
//! one decimal for display.

use sqlx::Row;

use crate::{
    api::stats::{
        ActiveBorrower, CategoryLoanCount, CategoryLoanDuration, GlobalStats, MonthlyLoanActivity,
        NeverBorrowedBook, OverdueUser, TopBook,
    },
    error::AppResult,
    repository::Repository,
};

/// Default row cap for the top-borrowed-books report
pub const DEFAULT_TOP_BOOKS: i64 = 10;
/// Default row cap for the most-active-users report
pub const DEFAULT_TOP_USERS: i64 = 5;

#[derive(Clone)]
pub struct ReportsService {
    repository: Repository,
}

impl ReportsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Global library counters, one row of sub-query counts
    pub async fn global_stats(&self) -> AppResult<GlobalStats> {
        let row = sqlx::query(
            r#"
            SELECT
                (SELECT COUNT(*) FROM books) as total_books,
                (SELECT COUNT(*) FROM books WHERE availability = 'available') as available_books,
                (SELECT COUNT(*) FROM books WHERE availability = 'borrowed') as borrowed_books,
                (SELECT COUNT(*) FROM users) as total_users,
                (SELECT COUNT(*) FROM loans) as total_loans,
                (SELECT COUNT(*) FROM loans WHERE returned_date IS NULL) as active_loans
            "#,
        )
        .fetch_one(&self.repository.pool)
        .await?;

        Ok(GlobalStats {
            total_books: row.get("total_books"),
            available_books: row.get("available_books"),
            borrowed_books: row.get("borrowed_books"),
            total_users: row.get("total_users"),
            total_loans: row.get("total_loans"),
            active_loans: row.get("active_loans"),
        })
    }

    /// Loans per category. Outer joins keep zero-loan categories in the
    /// result with a count of 0.
    pub async fn loans_by_category(&self) -> AppResult<Vec<CategoryLoanCount>> {
        let rows = sqlx::query(
            r#"
            SELECT c.id as category_id, c.name as category_name,
                   COUNT(l.id) as total_loans
            FROM categories c
            LEFT JOIN books b ON b.category_id = c.id
            LEFT JOIN loans l ON l.book_id = b.id
            GROUP BY c.id, c.name
            ORDER BY total_loans DESC
            "#,
        )
        .fetch_all(&self.repository.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| CategoryLoanCount {
                category_id: row.get("category_id"),
                category_name: row.get("category_name"),
                total_loans: row.get("total_loans"),
            })
            .collect())
    }

    /// Most borrowed books, at least one loan each
    pub async fn top_books(&self, limit: i64) -> AppResult<Vec<TopBook>> {
        let rows = sqlx::query(
            r#"
            SELECT b.id as book_id, b.title, b.author, COUNT(l.id) as loan_count
            FROM books b
            LEFT JOIN loans l ON l.book_id = b.id
            GROUP BY b.id, b.title, b.author
            HAVING COUNT(l.id) > 0
            ORDER BY loan_count DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.repository.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| TopBook {
                book_id: row.get("book_id"),
                title: row.get("title"),
                author: row.get("author"),
                loan_count: row.get("loan_count"),
            })
            .collect())
    }

    /// Users holding loans that are active and past the loan period
    pub async fn overdue_users(&self) -> AppResult<Vec<OverdueUser>> {
        let rows = sqlx::query(
            r#"
            SELECT u.id as user_id, u.username, u.email,
                   COUNT(l.id) as overdue_count
            FROM users u
            JOIN loans l ON l.user_id = u.id
            WHERE l.returned_date IS NULL
              AND l.loan_date < NOW() - INTERVAL '14 days'
            GROUP BY u.id, u.username, u.email
            ORDER BY overdue_count DESC
            "#,
        )
        .fetch_all(&self.repository.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| OverdueUser {
                user_id: row.get("user_id"),
                username: row.get("username"),
                email: row.get("email"),
                overdue_count: row.get("overdue_count"),
            })
            .collect())
    }

    /// Most active borrowers (inner join: only users with loans appear)
    pub async fn top_users(&self, limit: i64) -> AppResult<Vec<ActiveBorrower>> {
        let rows = sqlx::query(
            r#"
            SELECT u.id as user_id, u.username, u.email,
                   COUNT(l.id) as total_loans,
                   COUNT(l.id) FILTER (WHERE l.returned_date IS NULL) as active_loans
            FROM users u
            JOIN loans l ON l.user_id = u.id
            GROUP BY u.id, u.username, u.email
            ORDER BY total_loans DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.repository.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| ActiveBorrower {
                user_id: row.get("user_id"),
                username: row.get("username"),
                email: row.get("email"),
                total_loans: row.get("total_loans"),
                active_loans: row.get("active_loans"),
            })
            .collect())
    }

    /// Books with no loan row at all (anti-join), ordered by title.
    /// A fully-returned book still has loan rows and is excluded.
    pub async fn never_borrowed(&self) -> AppResult<Vec<NeverBorrowedBook>> {
        let rows = sqlx::query(
            r#"
            SELECT b.id as book_id, b.title, b.author, c.name as category_name
            FROM books b
            LEFT JOIN loans l ON l.book_id = b.id
            LEFT JOIN categories c ON b.category_id = c.id
            WHERE l.id IS NULL
            ORDER BY b.title ASC
            "#,
        )
        .fetch_all(&self.repository.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| NeverBorrowedBook {
                book_id: row.get("book_id"),
                title: row.get("title"),
                author: row.get("author"),
                category_name: row.get("category_name"),
            })
            .collect())
    }

    /// Average loan duration in days per category. An unreturned loan's end
    /// is coalesced to now, so running loans contribute their current
    /// duration instead of throwing on the NULL return date.
    pub async fn loan_duration_by_category(&self) -> AppResult<Vec<CategoryLoanDuration>> {
        let rows = sqlx::query(
            r#"
            SELECT c.name as category_name,
                   CAST(ROUND(CAST(AVG(
                       EXTRACT(EPOCH FROM (COALESCE(l.returned_date, NOW()) - l.loan_date)) / 86400.0
                   ) AS numeric), 1) AS double precision) as avg_days,
                   COUNT(l.id) as loan_count
            FROM categories c
            JOIN books b ON b.category_id = c.id
            JOIN loans l ON l.book_id = b.id
            GROUP BY c.id, c.name
            HAVING COUNT(l.id) >= 1
            ORDER BY avg_days DESC
            "#,
        )
        .fetch_all(&self.repository.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| CategoryLoanDuration {
                category_name: row.get("category_name"),
                avg_days: row.get("avg_days"),
                loan_count: row.get("loan_count"),
            })
            .collect())
    }

    /// Loan counts per calendar month over the last 12 months, newest first
    pub async fn monthly_activity(&self) -> AppResult<Vec<MonthlyLoanActivity>> {
        let rows = sqlx::query(
            r#"
            SELECT TO_CHAR(loan_date, 'YYYY-MM') as month, COUNT(*) as loan_count
            FROM loans
            WHERE loan_date >= NOW() - INTERVAL '12 months'
            GROUP BY TO_CHAR(loan_date, 'YYYY-MM')
            ORDER BY month DESC
            "#,
        )
        .fetch_all(&self.repository.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| MonthlyLoanActivity {
                month: row.get("month"),
                loan_count: row.get("loan_count"),
            })
            .collect())
    }
}
