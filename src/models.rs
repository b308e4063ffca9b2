use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeMap;
use ts_rs::TS;
use utoipa::ToSchema;
use validator::Validate;

/// Entity
///
/// A persisted record whose identity is assigned by the storage layer.
/// `id()` is `None` until the record has been saved once.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Human-readable entity name used in storage errors and logs.
    const NAME: &'static str;

    fn id(&self) -> Option<i64>;
}

// --- Core Application Schemas (Mapped to Database) ---

/// Author
///
/// A blog author from the `authors` table. Every field is replaced wholesale on PUT.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Author {
    // Server-assigned, monotonic. Client values are ignored on create.
    pub id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    // Presence is checked, format is not.
    pub email_address: String,
}

impl Entity for Author {
    const NAME: &'static str = "Author";

    fn id(&self) -> Option<i64> {
        self.id
    }
}

/// BlogPost
///
/// An article from the `blog_posts` table. `date_posted` is stamped by the storage
/// layer on first save and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct BlogPost {
    pub id: Option<i64>,
    pub category: String,
    pub title: String,
    pub content: String,
    #[ts(type = "string | null")]
    pub date_posted: Option<DateTime<Utc>>,
    // Optional association. Loaded by joining `authors` on `author_id`.
    pub author: Option<Author>,
}

impl Entity for BlogPost {
    const NAME: &'static str = "BlogPost";

    fn id(&self) -> Option<i64> {
        self.id
    }
}

// --- Request Payloads (Input Schemas) ---

/// AuthorPayload
///
/// Input for POST /api/authors and PUT /api/authors/{id}. Fields are optional so a
/// missing value is reported as a field error rather than a parse failure.
/// Lengths are counted in characters.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AuthorPayload {
    // Ignored on create. Must match the path id on update.
    pub id: Option<i64>,
    #[validate(
        required(message = "must not be null"),
        length(min = 1, max = 80, message = "First name should be between 1 and 80 characters")
    )]
    pub first_name: Option<String>,
    #[validate(
        required(message = "must not be null"),
        length(min = 1, max = 80, message = "Last name should be between 1 and 80 characters")
    )]
    pub last_name: Option<String>,
    // Presence only, the format is not checked.
    #[validate(required(message = "must not be null"))]
    pub email_address: Option<String>,
}

/// AuthorRef
///
/// Reference to an existing author inside a blog post payload. Any other author
/// fields sent by the client are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AuthorRef {
    pub id: i64,
}

/// BlogPostPayload
///
/// Input for POST /api/articles and PUT /api/articles/{id}. A `datePosted` sent by
/// the client is not part of the schema and is dropped during deserialization.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct BlogPostPayload {
    pub id: Option<i64>,
    #[validate(
        required(message = "must not be null"),
        length(min = 1, max = 200, message = "Please enter a category name of up to 200 characters")
    )]
    pub category: Option<String>,
    #[validate(
        required(message = "must not be null"),
        length(min = 1, max = 200, message = "Please enter a title up to 200 characters in length")
    )]
    pub title: Option<String>,
    #[validate(
        required(message = "must not be null"),
        length(min = 1, max = 500000, message = "Content is required")
    )]
    pub content: Option<String>,
    // Resolved against storage by the handler, not here.
    pub author: Option<AuthorRef>,
}

// --- Error Schemas (Output) ---

/// ValidationErrorResponse
///
/// Body of a 400 caused by invalid input: one message per offending field.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ValidationErrorResponse {
    pub field_errors: BTreeMap<String, String>,
}

/// ErrorMessage
///
/// Body of a 400 that is not tied to a field (malformed JSON, missing query parameter).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ErrorMessage {
    pub message: String,
}
