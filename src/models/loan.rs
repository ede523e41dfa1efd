//! Loan (borrow) model and related types

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::book::Book;
use super::user::UserSummary;

/// Loan period applied to every new loan. The due date is fixed at creation
/// and never recomputed.
pub const LOAN_PERIOD_DAYS: i64 = 14;

/// Due date for a loan issued at `loan_date`
pub fn due_date(loan_date: DateTime<Utc>) -> DateTime<Utc> {
    loan_date + Duration::days(LOAN_PERIOD_DAYS)
}

/// Loan model from database. Rows are append-only: `returned_date` is set
/// once by the return operation and never cleared.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Loan {
    pub id: i32,
    pub book_id: i32,
    pub user_id: i32,
    pub loan_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub returned_date: Option<DateTime<Utc>>,
}

impl Loan {
    pub fn is_active(&self) -> bool {
        self.returned_date.is_none()
    }
}

/// Loan with denormalized book/user snapshots for immediate display
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoanDetails {
    pub id: i32,
    pub loan_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub returned_date: Option<DateTime<Utc>>,
    pub book: Book,
    pub user: UserSummary,
}

/// Loan row for a user's loan listings, with book title/author joined in
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct UserLoan {
    pub id: i32,
    pub book_id: i32,
    pub title: String,
    pub author: String,
    pub loan_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub returned_date: Option<DateTime<Utc>>,
}

impl UserLoan {
    /// An active loan past its due date is overdue
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.returned_date.is_none() && self.due_date < now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn due_date_is_fourteen_days_after_loan_date() {
        let loan_date = Utc::now();
        let due = due_date(loan_date);
        assert_eq!(due - loan_date, Duration::days(14));
    }

    #[test]
    fn loan_without_return_date_is_active() {
        let now = Utc::now();
        let loan = Loan {
            id: 1,
            book_id: 1,
            user_id: 7,
            loan_date: now,
            due_date: due_date(now),
            returned_date: None,
        };
        assert!(loan.is_active());
    }

    #[test]
    fn overdue_requires_active_and_past_due() {
        let now = Utc::now();
        let mut loan = UserLoan {
            id: 1,
            book_id: 1,
            title: "Le Petit Prince".to_string(),
            author: "Antoine de Saint-Exupéry".to_string(),
            loan_date: now - Duration::days(20),
            due_date: now - Duration::days(6),
            returned_date: None,
        };
        assert!(loan.is_overdue(now));

        loan.returned_date = Some(now - Duration::days(1));
        assert!(!loan.is_overdue(now));
    }
}
