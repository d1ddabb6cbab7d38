use std::sync::Arc;

use crate::api::{Book, BookId, ReviewRating};
use crate::books_repository::{build_book, BooksRepository, BooksRepositoryError};
use crate::id_allocator::{IdAllocator, SequenceIdAllocator};

pub struct InMemoryBooksRepository {
    id_allocator: Arc<dyn IdAllocator>,
    books: parking_lot::RwLock<Vec<Book>>,
}

impl InMemoryBooksRepository {
    pub fn new(id_allocator: Arc<dyn IdAllocator>) -> Self {
        Self {
            id_allocator,
            books: Default::default(),
        }
    }
}

impl Default for InMemoryBooksRepository {
    fn default() -> Self {
        Self::new(Arc::new(SequenceIdAllocator::starting_at(100)))
    }
}

#[async_trait::async_trait]
impl BooksRepository for InMemoryBooksRepository {
    async fn add(
        &self,
        title: String,
        rating: ReviewRating,
    ) -> Result<u64, BooksRepositoryError> {
        let book = build_book(self.id_allocator.as_ref(), title, rating)?;
        self.books.write().push(book);
        Ok(1)
    }

    async fn find_by_id(&self, id: BookId) -> Result<Book, BooksRepositoryError> {
        let books = self.books.read();
        let mut matches = books.iter().filter(|book| book.id() == id);
        match (matches.next(), matches.next()) {
            (None, _) => Err(BooksRepositoryError::NotFound(id)),
            (Some(book), None) => Ok(book.clone()),
            (Some(_), Some(_)) => Err(BooksRepositoryError::MultipleRows(id)),
        }
    }

    async fn find_all(&self) -> Result<Vec<Book>, BooksRepositoryError> {
        Ok(self.books.read().clone())
    }
}
