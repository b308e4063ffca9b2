use super::{BlogPostRepository, Repository};
use crate::{
    error::{RepoResult, RepositoryError},
    models::{Author, BlogPost, Entity},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A post as stored: the author is kept by reference, like the `author_id` column.
#[derive(Debug, Clone)]
struct StoredPost {
    id: i64,
    category: String,
    title: String,
    content: String,
    date_posted: DateTime<Utc>,
    author_id: Option<i64>,
}

#[derive(Debug, Default)]
struct Tables {
    authors: BTreeMap<i64, Author>,
    posts: BTreeMap<i64, StoredPost>,
    last_author_id: i64,
    last_post_id: i64,
}

impl Tables {
    fn hydrate(&self, stored: &StoredPost) -> BlogPost {
        BlogPost {
            id: Some(stored.id),
            category: stored.category.clone(),
            title: stored.title.clone(),
            content: stored.content.clone(),
            date_posted: Some(stored.date_posted),
            author: stored
                .author_id
                .and_then(|id| self.authors.get(&id).cloned()),
        }
    }

    /// Mirrors the foreign key on `blog_posts.author_id`.
    fn author_reference(&self, post: &BlogPost) -> RepoResult<Option<i64>> {
        match post.author.as_ref().and_then(|author| author.id) {
            Some(id) if !self.authors.contains_key(&id) => Err(RepositoryError::Constraint(
                format!("author {id} is not present in authors"),
            )),
            reference => Ok(reference),
        }
    }
}

/// InMemoryStore
///
/// Process-local storage implementing both repositories. Identities start at 1 and
/// are never reused. Used when no database is configured and in tests.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RepoResult<RwLockReadGuard<'_, Tables>> {
        self.tables.read().map_err(|_| RepositoryError::Poisoned)
    }

    fn write(&self) -> RepoResult<RwLockWriteGuard<'_, Tables>> {
        self.tables.write().map_err(|_| RepositoryError::Poisoned)
    }
}

#[async_trait]
impl Repository<Author> for InMemoryStore {
    /// save
    ///
    /// 1. New author: take the next identity.
    /// 2. Replacement: the identity must already be present, otherwise `Stale`.
    async fn save(&self, mut author: Author) -> RepoResult<Author> {
        let mut tables = self.write()?;
        let id = match author.id {
            Some(id) if tables.authors.contains_key(&id) => id,
            Some(id) => {
                return Err(RepositoryError::Stale {
                    entity: Author::NAME,
                    id,
                });
            }
            None => {
                tables.last_author_id += 1;
                tables.last_author_id
            }
        };
        author.id = Some(id);
        tables.authors.insert(id, author.clone());
        Ok(author)
    }

    async fn find_all(&self) -> RepoResult<Vec<Author>> {
        Ok(self.read()?.authors.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Author>> {
        Ok(self.read()?.authors.get(&id).cloned())
    }

    async fn exists_by_id(&self, id: i64) -> RepoResult<bool> {
        Ok(self.read()?.authors.contains_key(&id))
    }

    /// Removes the author and detaches their posts, which stay stored.
    async fn delete(&self, author: Author) -> RepoResult<()> {
        let id = author.id().ok_or(RepositoryError::Unsaved(Author::NAME))?;
        let mut tables = self.write()?;
        if tables.authors.remove(&id).is_none() {
            return Err(RepositoryError::Stale {
                entity: Author::NAME,
                id,
            });
        }
        // ON DELETE SET NULL
        for post in tables.posts.values_mut() {
            if post.author_id == Some(id) {
                post.author_id = None;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Repository<BlogPost> for InMemoryStore {
    /// save
    ///
    /// The author reference is checked like the foreign key would be. A new post is
    /// stamped with the current time; a replacement carries the stored stamp over.
    async fn save(&self, post: BlogPost) -> RepoResult<BlogPost> {
        let mut tables = self.write()?;
        let author_id = tables.author_reference(&post)?;

        let stored = match post.id {
            Some(id) => {
                let existing = tables.posts.get(&id).ok_or(RepositoryError::Stale {
                    entity: BlogPost::NAME,
                    id,
                })?;
                StoredPost {
                    id,
                    category: post.category,
                    title: post.title,
                    content: post.content,
                    date_posted: existing.date_posted,
                    author_id,
                }
            }
            None => {
                tables.last_post_id += 1;
                StoredPost {
                    id: tables.last_post_id,
                    category: post.category,
                    title: post.title,
                    content: post.content,
                    date_posted: Utc::now(),
                    author_id,
                }
            }
        };

        let saved = tables.hydrate(&stored);
        tables.posts.insert(stored.id, stored);
        Ok(saved)
    }

    async fn find_all(&self) -> RepoResult<Vec<BlogPost>> {
        let tables = self.read()?;
        Ok(tables.posts.values().map(|p| tables.hydrate(p)).collect())
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<BlogPost>> {
        let tables = self.read()?;
        Ok(tables.posts.get(&id).map(|p| tables.hydrate(p)))
    }

    async fn exists_by_id(&self, id: i64) -> RepoResult<bool> {
        Ok(self.read()?.posts.contains_key(&id))
    }

    async fn delete(&self, post: BlogPost) -> RepoResult<()> {
        let id = post.id().ok_or(RepositoryError::Unsaved(BlogPost::NAME))?;
        match self.write()?.posts.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepositoryError::Stale {
                entity: BlogPost::NAME,
                id,
            }),
        }
    }
}

#[async_trait]
impl BlogPostRepository for InMemoryStore {
    async fn find_by_category_order_by_date_posted_desc(
        &self,
        category: &str,
    ) -> RepoResult<Vec<BlogPost>> {
        let tables = self.read()?;
        let mut matching: Vec<&StoredPost> = tables
            .posts
            .values()
            .filter(|p| p.category == category)
            .collect();
        // Ties on the timestamp fall back to the later insert first.
        matching.sort_by(|a, b| b.date_posted.cmp(&a.date_posted).then(b.id.cmp(&a.id)));
        Ok(matching.into_iter().map(|p| tables.hydrate(p)).collect())
    }
}
