//! Books repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookInput, BookSearch, BookSummary},
};

/// Build the WHERE conditions for a book search. Filters are AND-composed
/// and only emitted when the corresponding field is set; text filters bind
/// as case-insensitive substring patterns.
fn search_conditions(search: &BookSearch) -> Vec<String> {
    let mut conditions = Vec::new();
    let mut n = 0;
    if search.title.is_some() {
        n += 1;
        conditions.push(format!("b.title ILIKE ${}", n));
    }
    if search.author.is_some() {
        n += 1;
        conditions.push(format!("b.author ILIKE ${}", n));
    }
    if search.category_id.is_some() {
        n += 1;
        conditions.push(format!("b.category_id = ${}", n));
    }
    if search.availability.is_some() {
        n += 1;
        conditions.push(format!("b.availability = ${}", n));
    }
    conditions
}

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            "SELECT id, title, author, category_id, availability FROM books WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Search books with optional filters, ordered by title
    pub async fn search(&self, search: &BookSearch) -> AppResult<Vec<BookSummary>> {
        let conditions = search_conditions(search);
        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let sql = format!(
            r#"
            SELECT b.id, b.title, b.author, b.availability, c.name as category_name
            FROM books b
            LEFT JOIN categories c ON b.category_id = c.id
            {}
            ORDER BY b.title ASC
            "#,
            where_clause
        );

        let mut query = sqlx::query_as::<_, BookSummary>(&sql);
        if let Some(ref title) = search.title {
            query = query.bind(format!("%{}%", title));
        }
        if let Some(ref author) = search.author {
            query = query.bind(format!("%{}%", author));
        }
        if let Some(category_id) = search.category_id {
            query = query.bind(category_id);
        }
        if let Some(availability) = search.availability {
            query = query.bind(availability);
        }

        Ok(query.fetch_all(&self.pool).await?)
    }

    /// Create a new book. New books start out available.
    pub async fn create(&self, input: &BookInput) -> AppResult<Book> {
        let book = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author, category_id)
            VALUES ($1, $2, $3)
            RETURNING id, title, author, category_id, availability
            "#,
        )
        .bind(&input.title)
        .bind(&input.author)
        .bind(input.category_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(book)
    }

    /// Update title/author/category of a book
    pub async fn update(&self, id: i32, input: &BookInput) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = $1, author = $2, category_id = $3
            WHERE id = $4
            RETURNING id, title, author, category_id, availability
            "#,
        )
        .bind(&input.title)
        .bind(&input.author)
        .bind(input.category_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Delete a book from the catalog. Loan rows are never deleted, so a
    /// book with any loan history cannot be removed.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let has_loans: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM loans WHERE book_id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        if has_loans {
            return Err(AppError::Validation(format!(
                "Book {} has loan history and cannot be deleted",
                id
            )));
        }

        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::book::Availability;

    #[test]
    fn no_filters_produce_no_conditions() {
        assert!(search_conditions(&BookSearch::default()).is_empty());
    }

    #[test]
    fn each_filter_is_emitted_only_when_set() {
        let search = BookSearch {
            title: Some("prince".to_string()),
            author: None,
            category_id: Some(3),
            availability: None,
        };
        let conditions = search_conditions(&search);
        assert_eq!(
            conditions,
            vec!["b.title ILIKE $1".to_string(), "b.category_id = $2".to_string()]
        );
    }

    #[test]
    fn all_filters_compose_with_sequential_placeholders() {
        let search = BookSearch {
            title: Some("prince".to_string()),
            author: Some("saint".to_string()),
            category_id: Some(1),
            availability: Some(Availability::Available),
        };
        let conditions = search_conditions(&search);
        assert_eq!(conditions.len(), 4);
        assert_eq!(conditions[3], "b.availability = $4");
    }
}
