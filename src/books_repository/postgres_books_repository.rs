use std::sync::Arc;

use anyhow::Context;
use tokio_postgres::{Client, NoTls, Row, Statement};

use crate::api::{Book, BookId, ReviewRating};
use crate::books_repository::{build_book, BooksRepository, BooksRepositoryError};
use crate::id_allocator::IdAllocator;

const INSERT_QUERY: &str = "insert into books values($1, $2, $3)";
const SELECT_BY_ID_QUERY: &str = "select * from books where id = $1";
const SELECT_ALL_QUERY: &str = "select * from books";

pub struct PostgresBooksRepository {
    client: Client,
    id_allocator: Arc<dyn IdAllocator>,
}

pub struct PostgresBooksRepositoryConfig {
    pub hostname: String,
    pub username: String,
    pub password: String,
}

impl PostgresBooksRepository {
    pub async fn init(
        config: PostgresBooksRepositoryConfig,
        id_allocator: Arc<dyn IdAllocator>,
    ) -> anyhow::Result<Self> {
        let connection_str = format!(
            "postgresql://{}:{}@{}",
            config.username, config.password, config.hostname
        );
        tracing::info!("Postgres connection_str: {}", connection_str);
        let (client, connection) = tokio_postgres::connect(&connection_str, NoTls)
            .await
            .context("Failed to start postgres")?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                eprintln!("connection error: {}", e);
            }
        });

        client
            .batch_execute(
                "
        CREATE TABLE IF NOT EXISTS books (
            id              INTEGER PRIMARY KEY,
            title           TEXT NOT NULL,
            points          INTEGER NOT NULL
            )
        ",
            )
            .await
            .context("Failed to setup table")?;
        Ok(Self {
            client,
            id_allocator,
        })
    }
}

fn map_book_row(row: &Row) -> Result<Book, BooksRepositoryError> {
    let id: BookId = row.try_get("id").map_err(BooksRepositoryError::RowMapping)?;
    let title: String = row
        .try_get("title")
        .map_err(BooksRepositoryError::RowMapping)?;
    let points: i32 = row
        .try_get("points")
        .map_err(BooksRepositoryError::RowMapping)?;
    Ok(Book::from_trusted_row(id, title, points))
}

#[async_trait::async_trait]
impl BooksRepository for PostgresBooksRepository {
    async fn add(
        &self,
        title: String,
        rating: ReviewRating,
    ) -> Result<u64, BooksRepositoryError> {
        let book = build_book(self.id_allocator.as_ref(), title, rating)?;

        let stmt: Statement = self.client.prepare(INSERT_QUERY).await?;
        let rows_affected = self
            .client
            .execute(&stmt, &[&book.id(), &book.title(), &book.points()])
            .await?;

        Ok(rows_affected)
    }

    async fn find_by_id(&self, id: BookId) -> Result<Book, BooksRepositoryError> {
        let stmt: Statement = self.client.prepare(SELECT_BY_ID_QUERY).await?;
        let rows = self.client.query(&stmt, &[&id]).await?;

        match rows.as_slice() {
            [] => Err(BooksRepositoryError::NotFound(id)),
            [row] => map_book_row(row),
            _ => Err(BooksRepositoryError::MultipleRows(id)),
        }
    }

    async fn find_all(&self) -> Result<Vec<Book>, BooksRepositoryError> {
        let stmt: Statement = self.client.prepare(SELECT_ALL_QUERY).await?;
        let rows = self.client.query(&stmt, &[]).await?;

        rows.iter().map(map_book_row).collect()
    }
}

#[cfg(test)]
mod postgres_books_repository_tests {
    use std::sync::Arc;

    use serial_test::file_serial;
    use testcontainers::core::IntoContainerPort;
    use testcontainers::runners::AsyncRunner;
    use testcontainers::{ContainerAsync, GenericImage, ImageExt};

    use crate::api::{Book, ReviewRating};
    use crate::books_repository::{BooksRepository, BooksRepositoryError};
    use crate::id_allocator::SequenceIdAllocator;

    async fn start_postgres_container_and_init_repo() -> (
        ContainerAsync<GenericImage>,
        crate::books_repository::PostgresBooksRepository,
    ) {
        let _pg_container = GenericImage::new("postgres", "latest")
            .with_mapped_port(5432, 5432.tcp())
            .with_env_var("POSTGRES_USER", "postgres")
            .with_env_var("POSTGRES_PASSWORD", "postgres")
            .start()
            .await
            .expect("Failed to start postgres");

        for _ in 0..10 {
            if let Ok(repo) = crate::books_repository::PostgresBooksRepository::init(
                crate::books_repository::PostgresBooksRepositoryConfig {
                    hostname: "127.0.0.1".to_string(),
                    username: "postgres".to_string(),
                    password: "postgres".to_string(),
                },
                Arc::new(SequenceIdAllocator::starting_at(100)),
            )
            .await
            {
                return (_pg_container, repo);
            }
            tokio::time::sleep(std::time::Duration::from_millis(300)).await;
        }
        panic!("Failed to setup postgres container")
    }

    #[tokio::test]
    #[file_serial(key, path => "./.pgtestslock")]
    /// Tests if add and find_by_id work correctly
    /// for the sake of not starting container multiple times it tests everything in one testcase
    async fn test_add_book_and_find_it() {
        let (_container, repo) = start_postgres_container_and_init_repo().await;

        let not_existing_book_id = 20000;
        let book_not_found = repo.find_by_id(not_existing_book_id).await;
        assert!(matches!(
            book_not_found,
            Err(BooksRepositoryError::NotFound(..))
        ));

        let rows_affected = repo
            .add("Effective Java Book".to_string(), ReviewRating::Excellent)
            .await
            .expect("Failed to add book");
        assert_eq!(rows_affected, 1);

        let book = repo.find_by_id(100).await.expect("Failed to find book");
        assert_eq!(
            book,
            Book::new(100, "Effective Java Book".to_string(), 2).unwrap()
        );
    }

    #[tokio::test]
    #[file_serial(key, path => "./.pgtestslock")]
    /// Tests if find_all works correctly
    /// for the sake of not starting container multiple times it tests everything in one testcase
    async fn test_add_books_and_list_them() {
        let (_container, repo) = start_postgres_container_and_init_repo().await;

        let list = repo.find_all().await.expect("Failed to list books");
        assert_eq!(list, vec![]);

        let rows_affected = repo
            .add("Effective Java Book".to_string(), ReviewRating::Excellent)
            .await
            .expect("Failed to add book");
        assert_eq!(rows_affected, 1);

        let rows_affected = repo
            .add("React 101".to_string(), ReviewRating::Good)
            .await
            .expect("Failed to add book");
        assert_eq!(rows_affected, 1);

        let mut list = repo.find_all().await.expect("Failed to list books");
        list.sort_by_key(|book| book.id());

        assert_eq!(
            list,
            vec![
                Book::new(100, "Effective Java Book".to_string(), 2).unwrap(),
                Book::new(101, "React 101".to_string(), 1).unwrap(),
            ]
        );
    }

    #[tokio::test]
    #[file_serial(key, path => "./.pgtestslock")]
    /// Tests that validation failures surface before any row is written
    async fn test_empty_title_writes_no_row() {
        let (_container, repo) = start_postgres_container_and_init_repo().await;

        let result = repo.add("".to_string(), ReviewRating::Good).await;
        assert!(matches!(
            result,
            Err(BooksRepositoryError::Validation(..))
        ));

        let list = repo.find_all().await.expect("Failed to list books");
        assert_eq!(list, vec![]);
    }
}
