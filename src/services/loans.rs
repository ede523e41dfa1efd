//! Loan lifecycle service

use crate::{
    error::AppResult,
    models::loan::{LoanDetails, UserLoan},
    repository::Repository,
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
}

impl LoansService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Borrow a book for a user.
    ///
    /// The repository enforces the lifecycle rules (book exists and is
    /// available, no duplicate active loan) inside one transaction; this
    /// layer verifies the user and assembles the denormalized snapshot.
    pub async fn borrow(&self, book_id: i32, user_id: i32) -> AppResult<LoanDetails> {
        let user = self.repository.users.get_by_id(user_id).await?;
        let loan = self.repository.loans.borrow(book_id, user_id).await?;
        let book = self.repository.books.get_by_id(loan.book_id).await?;

        Ok(LoanDetails {
            id: loan.id,
            loan_date: loan.loan_date,
            due_date: loan.due_date,
            returned_date: loan.returned_date,
            book,
            user: user.into(),
        })
    }

    /// Return a borrowed book
    pub async fn return_loan(&self, loan_id: i32) -> AppResult<LoanDetails> {
        let loan = self.repository.loans.return_loan(loan_id).await?;
        let book = self.repository.books.get_by_id(loan.book_id).await?;
        let user = self.repository.users.get_by_id(loan.user_id).await?;

        Ok(LoanDetails {
            id: loan.id,
            loan_date: loan.loan_date,
            due_date: loan.due_date,
            returned_date: loan.returned_date,
            book,
            user: user.into(),
        })
    }

    /// Active loans for a user
    pub async fn active_loans(&self, user_id: i32) -> AppResult<Vec<UserLoan>> {
        // Verify user exists
        self.repository.users.get_by_id(user_id).await?;
        self.repository.loans.active_for_user(user_id).await
    }

    /// Full loan history for a user
    pub async fn history(&self, user_id: i32) -> AppResult<Vec<UserLoan>> {
        self.repository.users.get_by_id(user_id).await?;
        self.repository.loans.history_for_user(user_id).await
    }
}
