//! Field-level input validation.
//!
//! The constraints themselves are declared on the payloads with `validator`
//! derives (see `models`). This module turns a failed report into the
//! `fieldErrors` map and converts a clean payload into the entity it describes.
//! Each payload is checked in full before anything touches storage, so a single
//! 400 response lists every violated constraint at once.

use std::collections::BTreeMap;
use std::fmt;

use validator::{Validate, ValidationErrors};

use crate::models::{Author, AuthorPayload, BlogPost, BlogPostPayload};

/// Message reported for a required field that is absent or null.
pub const MUST_NOT_BE_NULL: &str = "must not be null";

pub const FIRST_NAME_MESSAGE: &str = "First name should be between 1 and 80 characters";
pub const LAST_NAME_MESSAGE: &str = "Last name should be between 1 and 80 characters";
pub const CATEGORY_MESSAGE: &str = "Please enter a category name of up to 200 characters";
pub const TITLE_MESSAGE: &str = "Please enter a title up to 200 characters in length";
pub const CONTENT_MESSAGE: &str = "Content is required";

/// FieldErrors
///
/// Field name (as it appears in JSON) mapped to a human-readable violation message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a violation. The first message recorded for a field wins.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

impl From<ValidationErrors> for FieldErrors {
    /// One entry per field, keyed by its JSON name. A field with several failed
    /// rules reports the first one.
    fn from(report: ValidationErrors) -> Self {
        let mut errors = FieldErrors::new();
        for (field, failures) in report.field_errors() {
            if let Some(failure) = failures.first() {
                let message = failure
                    .message
                    .as_ref()
                    .map(|message| message.to_string())
                    .unwrap_or_else(|| failure.code.to_string());
                errors.insert(json_field_name(&field), message);
            }
        }
        errors
    }
}

/// `first_name` -> `firstName`. Names already in camelCase pass through.
fn json_field_name(field: &str) -> String {
    let mut name = String::with_capacity(field.len());
    let mut upper_next = false;
    for c in field.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            name.extend(c.to_uppercase());
            upper_next = false;
        } else {
            name.push(c);
        }
    }
    name
}

/// IntoEntity
///
/// Runs the payload's declared constraints and, when they all hold, builds the
/// entity it describes. The produced entity never carries a client-supplied
/// identity or timestamp.
pub trait IntoEntity {
    type Entity;

    fn into_entity(self) -> Result<Self::Entity, FieldErrors>;
}

impl IntoEntity for AuthorPayload {
    type Entity = Author;

    fn into_entity(self) -> Result<Author, FieldErrors> {
        self.into_entity()?;
        Ok(Author {
            id: None,
            first_name: self.first_name.unwrap_or_default(),
            last_name: self.last_name.unwrap_or_default(),
            email_address: self.email_address.unwrap_or_default(),
        })
    }
}

/// The author reference is not resolved here; see `handlers::posts`.
impl IntoEntity for BlogPostPayload {
    type Entity = BlogPost;

    fn into_entity(self) -> Result<BlogPost, FieldErrors> {
        self.into_entity()?;
        Ok(BlogPost {
            id: None,
            category: self.category.unwrap_or_default(),
            title: self.title.unwrap_or_default(),
            content: self.content.unwrap_or_default(),
            date_posted: None,
            author: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AuthorRef;

    fn author_payload(first: &str, last: &str, email: &str) -> AuthorPayload {
        AuthorPayload {
            id: Some(42),
            first_name: Some(first.to_string()),
            last_name: Some(last.to_string()),
            email_address: Some(email.to_string()),
        }
    }

    #[test]
    fn valid_author_drops_client_id() {
        let author = author_payload("Douglas", "Adams", "fourtyTwo@Milliways.com")
            .into_entity()
            .unwrap();
        assert_eq!(author.id, None);
        assert_eq!(author.first_name, "Douglas");
        assert_eq!(author.email_address, "fourtyTwo@Milliways.com");
    }

    #[test]
    fn empty_author_reports_every_missing_field() {
        let errors = AuthorPayload::default().into_entity().unwrap_err();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors.get("firstName"), Some(MUST_NOT_BE_NULL));
        assert_eq!(errors.get("lastName"), Some(MUST_NOT_BE_NULL));
        assert_eq!(errors.get("emailAddress"), Some(MUST_NOT_BE_NULL));
    }

    #[test]
    fn blank_author_names_report_size_messages() {
        let errors = author_payload("", "", "").into_entity().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("firstName"), Some(FIRST_NAME_MESSAGE));
        assert_eq!(errors.get("lastName"), Some(LAST_NAME_MESSAGE));
        // Email is presence-only.
        assert_eq!(errors.get("emailAddress"), None);
    }

    #[test]
    fn author_name_length_counts_characters() {
        let eighty = "é".repeat(80);
        assert!(author_payload(&eighty, "Adams", "a@b.c").into_entity().is_ok());

        let eighty_one = "x".repeat(81);
        let errors = author_payload(&eighty_one, "Adams", "a@b.c")
            .into_entity()
            .unwrap_err();
        assert_eq!(errors.get("firstName"), Some(FIRST_NAME_MESSAGE));
    }

    #[test]
    fn empty_post_reports_every_missing_field() {
        let errors = BlogPostPayload::default().into_entity().unwrap_err();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors.get("category"), Some(MUST_NOT_BE_NULL));
        assert_eq!(errors.get("title"), Some(MUST_NOT_BE_NULL));
        assert_eq!(errors.get("content"), Some(MUST_NOT_BE_NULL));
    }

    #[test]
    fn blank_post_fields_report_size_messages() {
        let payload = BlogPostPayload {
            id: None,
            category: Some(String::new()),
            title: Some(String::new()),
            content: Some(String::new()),
            author: Some(AuthorRef { id: 1 }),
        };
        let errors = payload.into_entity().unwrap_err();
        assert_eq!(errors.get("category"), Some(CATEGORY_MESSAGE));
        assert_eq!(errors.get("title"), Some(TITLE_MESSAGE));
        assert_eq!(errors.get("content"), Some(CONTENT_MESSAGE));
    }

    #[test]
    fn valid_post_has_no_identity_or_timestamp() {
        let payload = BlogPostPayload {
            id: Some(7),
            category: Some("tech".into()),
            title: Some("Hi".into()),
            content: Some("world".into()),
            author: None,
        };
        let post = payload.into_entity().unwrap();
        assert_eq!(post.id, None);
        assert_eq!(post.date_posted, None);
        assert_eq!(post.category, "tech");
    }

    #[test]
    fn first_message_for_a_field_is_kept() {
        let mut errors = FieldErrors::new();
        errors.insert("author", "first");
        errors.insert("author", "second");
        assert_eq!(errors.get("author"), Some("first"));
        assert_eq!(errors.to_string(), "author: first");
    }

    #[test]
    fn json_names_are_camel_case() {
        assert_eq!(json_field_name("email_address"), "emailAddress");
        assert_eq!(json_field_name("emailAddress"), "emailAddress");
        assert_eq!(json_field_name("title"), "title");
    }
}
