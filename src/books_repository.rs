pub use in_memory_books_repository::InMemoryBooksRepository;
pub use postgres_books_repository::{PostgresBooksRepository, PostgresBooksRepositoryConfig};

use crate::api::{Book, BookId, ReviewRating, ValidationError};
use crate::id_allocator::IdAllocator;

mod in_memory_books_repository;
mod postgres_books_repository;

#[derive(Debug, thiserror::Error)]
pub enum BooksRepositoryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Book {0} not found")]
    NotFound(BookId),

    #[error("Multiple rows returned for book {0}")]
    MultipleRows(BookId),

    #[error("Failed to map row to book: {0}")]
    RowMapping(#[source] tokio_postgres::Error),

    #[error("Database failure {0}")]
    DatabaseFailure(#[from] tokio_postgres::Error),
}

#[async_trait::async_trait]
pub trait BooksRepository: Send + Sync {
    /// Inserts a book built from title and rating, returns the number of rows affected
    async fn add(&self, title: String, rating: ReviewRating) -> Result<u64, BooksRepositoryError>;
    /// Retrieves a single book by id
    async fn find_by_id(&self, id: BookId) -> Result<Book, BooksRepositoryError>;
    /// Lists all books in insertion order
    async fn find_all(&self) -> Result<Vec<Book>, BooksRepositoryError>;
}

/// Builds the book to insert. The title is checked before an id is reserved,
/// a rejected call must not advance the sequence.
pub(crate) fn build_book(
    ids: &dyn IdAllocator,
    title: String,
    rating: ReviewRating,
) -> Result<Book, ValidationError> {
    if title.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    Book::new(ids.next_id(), title, rating.points())
}
