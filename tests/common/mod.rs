#![allow(dead_code)]

use async_trait::async_trait;
use blog_api::{
    AppConfig, AppState, RepositoryError,
    auth::Claims,
    error::RepoResult,
    models::{Author, BlogPost},
    repository::{BlogPostRepository, Repository},
};
use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

// --- Tokens & Config ---

pub const TEST_JWT_SECRET: &str = "test-secret-value-1234567890";

/// Signs a token whose expiry is `exp_offset` seconds from now (negative = expired).
pub fn create_token(subject: &str, exp_offset: i64, secret: &str) -> String {
    let now = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64;

    let claims = Claims {
        sub: subject.to_string(),
        iat: now as usize,
        exp: (now + exp_offset) as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

pub fn bearer() -> String {
    format!("Bearer {}", create_token("editor@blog", 3600, TEST_JWT_SECRET))
}

pub fn test_config() -> AppConfig {
    AppConfig {
        jwt_secret: TEST_JWT_SECRET.to_string(),
        ..AppConfig::default()
    }
}

// --- Fixtures ---

pub fn saved_author() -> Author {
    Author {
        id: Some(1),
        first_name: "Douglas".to_string(),
        last_name: "Adams".to_string(),
        email_address: "fourtyTwo@Milliways.com".to_string(),
    }
}

pub fn saved_post() -> BlogPost {
    BlogPost {
        id: Some(1),
        category: "category".to_string(),
        title: "title".to_string(),
        content: "content".to_string(),
        date_posted: Some(Utc::now()),
        author: Some(saved_author()),
    }
}

// --- Recording Mock Repositories ---

/// Canned answers plus a log of every call, so tests can assert which storage
/// operations a request caused (and that forbidden requests caused none).
#[derive(Default)]
pub struct MockAuthorRepo {
    pub find_result: Option<Author>,
    pub all_result: Vec<Author>,
    pub exists_result: bool,
    pub calls: Mutex<Vec<&'static str>>,
    pub saved: Mutex<Vec<Author>>,
    pub deleted: Mutex<Vec<Author>>,
}

impl MockAuthorRepo {
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, name: &str) -> usize {
        self.calls().iter().filter(|call| **call == name).count()
    }

    fn record(&self, name: &'static str) {
        self.calls.lock().unwrap().push(name);
    }
}

#[async_trait]
impl Repository<Author> for MockAuthorRepo {
    async fn save(&self, mut author: Author) -> RepoResult<Author> {
        self.record("save");
        self.saved.lock().unwrap().push(author.clone());
        author.id = author.id.or(Some(1));
        Ok(author)
    }
    async fn find_all(&self) -> RepoResult<Vec<Author>> {
        self.record("find_all");
        Ok(self.all_result.clone())
    }
    async fn find_by_id(&self, _id: i64) -> RepoResult<Option<Author>> {
        self.record("find_by_id");
        Ok(self.find_result.clone())
    }
    async fn exists_by_id(&self, _id: i64) -> RepoResult<bool> {
        self.record("exists_by_id");
        Ok(self.exists_result)
    }
    async fn delete(&self, author: Author) -> RepoResult<()> {
        self.record("delete");
        self.deleted.lock().unwrap().push(author);
        Ok(())
    }
}

#[derive(Default)]
pub struct MockPostRepo {
    pub find_result: Option<BlogPost>,
    pub all_result: Vec<BlogPost>,
    pub category_result: Vec<BlogPost>,
    pub exists_result: bool,
    pub fail_with_stale: bool,
    pub calls: Mutex<Vec<&'static str>>,
    pub saved: Mutex<Vec<BlogPost>>,
    pub deleted: Mutex<Vec<BlogPost>>,
    pub categories: Mutex<Vec<String>>,
}

impl MockPostRepo {
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, name: &str) -> usize {
        self.calls().iter().filter(|call| **call == name).count()
    }

    fn record(&self, name: &'static str) {
        self.calls.lock().unwrap().push(name);
    }
}

#[async_trait]
impl Repository<BlogPost> for MockPostRepo {
    async fn save(&self, mut post: BlogPost) -> RepoResult<BlogPost> {
        self.record("save");
        self.saved.lock().unwrap().push(post.clone());
        post.id = post.id.or(Some(1));
        post.date_posted = post.date_posted.or(Some(Utc::now()));
        Ok(post)
    }
    async fn find_all(&self) -> RepoResult<Vec<BlogPost>> {
        self.record("find_all");
        Ok(self.all_result.clone())
    }
    async fn find_by_id(&self, _id: i64) -> RepoResult<Option<BlogPost>> {
        self.record("find_by_id");
        Ok(self.find_result.clone())
    }
    async fn exists_by_id(&self, _id: i64) -> RepoResult<bool> {
        self.record("exists_by_id");
        Ok(self.exists_result)
    }
    async fn delete(&self, post: BlogPost) -> RepoResult<()> {
        self.record("delete");
        if self.fail_with_stale {
            return Err(RepositoryError::Stale {
                entity: "BlogPost",
                id: post.id.unwrap_or_default(),
            });
        }
        self.deleted.lock().unwrap().push(post);
        Ok(())
    }
}

#[async_trait]
impl BlogPostRepository for MockPostRepo {
    async fn find_by_category_order_by_date_posted_desc(
        &self,
        category: &str,
    ) -> RepoResult<Vec<BlogPost>> {
        self.record("find_by_category_order_by_date_posted_desc");
        self.categories.lock().unwrap().push(category.to_string());
        Ok(self.category_result.clone())
    }
}

/// AppState wired to the given mocks, keeping handles for later assertions.
pub fn mock_state(authors: Arc<MockAuthorRepo>, posts: Arc<MockPostRepo>) -> AppState {
    AppState {
        authors,
        posts,
        config: test_config(),
    }
}
