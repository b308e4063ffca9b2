use super::{BlogPostRepository, Repository};
use crate::{
    error::{RepoResult, RepositoryError},
    models::{Author, BlogPost, Entity},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

/// Column list shared by every post query. Expects `p` (or a CTE aliased `p`)
/// left-joined with `authors a`.
const POST_COLUMNS: &str = r#"
    p.id, p.category, p.title, p.content, p.date_posted,
    a.id AS author_id, a.first_name AS author_first_name,
    a.last_name AS author_last_name, a.email_address AS author_email_address
"#;

/// BlogPostRow
///
/// Flat result of `blog_posts LEFT JOIN authors`. Author columns are all NULL when the
/// post has no author (or the author was deleted).
#[derive(Debug, FromRow)]
struct BlogPostRow {
    id: i64,
    category: String,
    title: String,
    content: String,
    date_posted: DateTime<Utc>,
    author_id: Option<i64>,
    author_first_name: Option<String>,
    author_last_name: Option<String>,
    author_email_address: Option<String>,
}

impl From<BlogPostRow> for BlogPost {
    fn from(row: BlogPostRow) -> Self {
        let author = row.author_id.map(|id| Author {
            id: Some(id),
            first_name: row.author_first_name.unwrap_or_default(),
            last_name: row.author_last_name.unwrap_or_default(),
            email_address: row.author_email_address.unwrap_or_default(),
        });
        BlogPost {
            id: Some(row.id),
            category: row.category,
            title: row.title,
            content: row.content,
            date_posted: Some(row.date_posted),
            author,
        }
    }
}

/// PostgresRepository
///
/// Implementation of both repositories backed by PostgreSQL. Identities come from
/// `BIGSERIAL` columns and `date_posted` from the column default, so neither is ever
/// written by this code.
#[derive(Clone)]
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_posts(&self, filter: &str, category: Option<&str>) -> RepoResult<Vec<BlogPost>> {
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM blog_posts p LEFT JOIN authors a ON a.id = p.author_id {filter}"
        );
        let mut query = sqlx::query_as::<_, BlogPostRow>(&sql);
        if let Some(category) = category {
            query = query.bind(category);
        }
        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(BlogPost::from).collect())
    }
}

#[async_trait]
impl Repository<Author> for PostgresRepository {
    /// save
    ///
    /// INSERT ... RETURNING for new authors; UPDATE ... RETURNING for replacements.
    async fn save(&self, author: Author) -> RepoResult<Author> {
        match author.id {
            None => Ok(sqlx::query_as::<_, Author>(
                r#"INSERT INTO authors (first_name, last_name, email_address)
                   VALUES ($1, $2, $3)
                   RETURNING id, first_name, last_name, email_address"#,
            )
            .bind(&author.first_name)
            .bind(&author.last_name)
            .bind(&author.email_address)
            .fetch_one(&self.pool)
            .await?),
            Some(id) => sqlx::query_as::<_, Author>(
                r#"UPDATE authors
                   SET first_name = $2, last_name = $3, email_address = $4
                   WHERE id = $1
                   RETURNING id, first_name, last_name, email_address"#,
            )
            .bind(id)
            .bind(&author.first_name)
            .bind(&author.last_name)
            .bind(&author.email_address)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepositoryError::Stale {
                entity: Author::NAME,
                id,
            }),
        }
    }

    async fn find_all(&self) -> RepoResult<Vec<Author>> {
        Ok(sqlx::query_as::<_, Author>(
            "SELECT id, first_name, last_name, email_address FROM authors ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Author>> {
        Ok(sqlx::query_as::<_, Author>(
            "SELECT id, first_name, last_name, email_address FROM authors WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn exists_by_id(&self, id: i64) -> RepoResult<bool> {
        Ok(
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM authors WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?,
        )
    }

    /// delete
    ///
    /// Posts written by the author keep existing; `author_id` is nulled by the
    /// `ON DELETE SET NULL` foreign key.
    async fn delete(&self, author: Author) -> RepoResult<()> {
        let id = author.id().ok_or(RepositoryError::Unsaved(Author::NAME))?;
        let result = sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::Stale {
                entity: Author::NAME,
                id,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Repository<BlogPost> for PostgresRepository {
    /// save
    ///
    /// Uses a CTE so the written row comes back already joined with its author.
    /// `date_posted` is absent from both statements: the column default stamps it on
    /// insert and the update leaves it untouched.
    async fn save(&self, post: BlogPost) -> RepoResult<BlogPost> {
        let author_id = post.author.as_ref().and_then(|author| author.id);
        let row = match post.id {
            None => {
                let sql = format!(
                    r#"WITH p AS (
                           INSERT INTO blog_posts (category, title, content, author_id)
                           VALUES ($1, $2, $3, $4)
                           RETURNING *
                       )
                       SELECT {POST_COLUMNS} FROM p LEFT JOIN authors a ON a.id = p.author_id"#
                );
                sqlx::query_as::<_, BlogPostRow>(&sql)
                    .bind(&post.category)
                    .bind(&post.title)
                    .bind(&post.content)
                    .bind(author_id)
                    .fetch_one(&self.pool)
                    .await?
            }
            Some(id) => {
                let sql = format!(
                    r#"WITH p AS (
                           UPDATE blog_posts
                           SET category = $2, title = $3, content = $4, author_id = $5
                           WHERE id = $1
                           RETURNING *
                       )
                       SELECT {POST_COLUMNS} FROM p LEFT JOIN authors a ON a.id = p.author_id"#
                );
                sqlx::query_as::<_, BlogPostRow>(&sql)
                    .bind(id)
                    .bind(&post.category)
                    .bind(&post.title)
                    .bind(&post.content)
                    .bind(author_id)
                    .fetch_optional(&self.pool)
                    .await?
                    .ok_or(RepositoryError::Stale {
                        entity: BlogPost::NAME,
                        id,
                    })?
            }
        };
        Ok(row.into())
    }

    async fn find_all(&self) -> RepoResult<Vec<BlogPost>> {
        self.fetch_posts("ORDER BY p.id", None).await
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<BlogPost>> {
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM blog_posts p LEFT JOIN authors a ON a.id = p.author_id WHERE p.id = $1"
        );
        let row = sqlx::query_as::<_, BlogPostRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(BlogPost::from))
    }

    async fn exists_by_id(&self, id: i64) -> RepoResult<bool> {
        Ok(
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM blog_posts WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?,
        )
    }

    async fn delete(&self, post: BlogPost) -> RepoResult<()> {
        let id = post.id().ok_or(RepositoryError::Unsaved(BlogPost::NAME))?;
        let result = sqlx::query("DELETE FROM blog_posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::Stale {
                entity: BlogPost::NAME,
                id,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl BlogPostRepository for PostgresRepository {
    /// Backed by the `(category, date_posted DESC)` index.
    async fn find_by_category_order_by_date_posted_desc(
        &self,
        category: &str,
    ) -> RepoResult<Vec<BlogPost>> {
        self.fetch_posts(
            "WHERE p.category = $1 ORDER BY p.date_posted DESC, p.id DESC",
            Some(category),
        )
        .await
    }
}
