use crate::{
    error::RepoResult,
    models::{Author, BlogPost, Entity},
};
use async_trait::async_trait;
use std::sync::Arc;

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PostgresRepository;

/// Repository Trait
///
/// Storage-agnostic CRUD contract shared by every entity. Handlers only ever see
/// `Arc<dyn ...>` trait objects, so Postgres and the in-memory store are
/// interchangeable (and tests substitute recording mocks).
///
/// **Send + Sync + async_trait** make the trait objects shareable across Axum's
/// asynchronous task boundaries.
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// Inserts when `entity.id()` is `None`, otherwise replaces the stored row with the
    /// same identity. Returns the stored representation, including any server-assigned
    /// fields. Replacing a row that does not exist is `RepositoryError::Stale`.
    async fn save(&self, entity: T) -> RepoResult<T>;

    /// Every stored entity in storage order (ascending identity).
    async fn find_all(&self) -> RepoResult<Vec<T>>;

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<T>>;

    async fn exists_by_id(&self, id: i64) -> RepoResult<bool>;

    /// Removes the given, previously fetched entity. Not guarded against a concurrent
    /// delete of the same row: that surfaces as `RepositoryError::Stale`.
    async fn delete(&self, entity: T) -> RepoResult<()>;
}

/// Author storage. No queries beyond the base contract.
pub trait AuthorRepository: Repository<Author> {}

impl<R> AuthorRepository for R where R: Repository<Author> {}

/// Blog post storage.
#[async_trait]
pub trait BlogPostRepository: Repository<BlogPost> {
    /// Posts whose category equals `category` exactly, newest `date_posted` first.
    async fn find_by_category_order_by_date_posted_desc(
        &self,
        category: &str,
    ) -> RepoResult<Vec<BlogPost>>;
}

/// Shared handles placed in `AppState`.
pub type AuthorRepositoryState = Arc<dyn AuthorRepository>;
pub type BlogPostRepositoryState = Arc<dyn BlogPostRepository>;
