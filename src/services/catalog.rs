//! Catalog management service

use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        book::{Book, BookInput, BookSearch, BookSummary},
        category::Category,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Get a single book
    pub async fn get_book(&self, id: i32) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    /// Search books; with no filters this lists the whole catalog
    pub async fn search_books(&self, search: &BookSearch) -> AppResult<Vec<BookSummary>> {
        self.repository.books.search(search).await
    }

    /// Add a book to the catalog
    pub async fn create_book(&self, input: BookInput) -> AppResult<Book> {
        input.validate()?;
        self.repository.books.create(&input).await
    }

    /// Update a book's title/author/category
    pub async fn update_book(&self, id: i32, input: BookInput) -> AppResult<Book> {
        input.validate()?;
        self.repository.books.update(id, &input).await
    }

    /// Remove a book from the catalog
    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.repository.books.delete(id).await
    }

    /// List categories (reference data for filters and reports)
    pub async fn list_categories(&self) -> AppResult<Vec<Category>> {
        self.repository.categories.list().await
    }
}
