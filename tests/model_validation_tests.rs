use blog_api::{
    models::{Author, AuthorPayload, BlogPost, BlogPostPayload, ValidationErrorResponse},
    validation::{
        CATEGORY_MESSAGE, CONTENT_MESSAGE, FieldErrors, IntoEntity, LAST_NAME_MESSAGE,
        MUST_NOT_BE_NULL, TITLE_MESSAGE,
    },
};
use chrono::{TimeZone, Utc};
use serde_json::{Value, json};

// --- Wire Format ---

#[test]
fn test_author_json_uses_camel_case() {
    let author = Author {
        id: Some(3),
        first_name: "Douglas".to_string(),
        last_name: "Adams".to_string(),
        email_address: "fourtyTwo@Milliways.com".to_string(),
    };

    let value = serde_json::to_value(&author).unwrap();
    assert_eq!(
        value,
        json!({
            "id": 3,
            "firstName": "Douglas",
            "lastName": "Adams",
            "emailAddress": "fourtyTwo@Milliways.com"
        })
    );
}

#[test]
fn test_blog_post_date_is_rfc3339() {
    let post = BlogPost {
        id: Some(1),
        category: "c".to_string(),
        title: "t".to_string(),
        content: "body".to_string(),
        date_posted: Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap()),
        author: None,
    };

    let value = serde_json::to_value(&post).unwrap();
    assert_eq!(value["datePosted"], "2024-05-01T12:30:00Z");
    assert!(value["author"].is_null());
}

#[test]
fn test_post_payload_ignores_client_date_and_author_fields() {
    let payload: BlogPostPayload = serde_json::from_value(json!({
        "id": 9,
        "category": "c",
        "title": "t",
        "content": "body",
        "datePosted": "1999-12-31T23:59:59Z",
        "author": { "id": 4, "firstName": "ignored" }
    }))
    .unwrap();

    assert_eq!(payload.id, Some(9));
    assert_eq!(payload.author.map(|author| author.id), Some(4));

    let post = payload.into_entity().unwrap();
    assert_eq!(post.date_posted, None);
}

#[test]
fn test_null_fields_deserialize_as_missing() {
    let payload: AuthorPayload =
        serde_json::from_value(json!({ "firstName": null, "lastName": "Adams" })).unwrap();

    let errors = payload.into_entity().unwrap_err();
    assert_eq!(errors.get("firstName"), Some(MUST_NOT_BE_NULL));
    assert_eq!(errors.get("emailAddress"), Some(MUST_NOT_BE_NULL));
    assert_eq!(errors.get("lastName"), None);
}

#[test]
fn test_validation_error_body_shape() {
    let mut errors = FieldErrors::new();
    errors.insert("title", TITLE_MESSAGE);

    let body = ValidationErrorResponse {
        field_errors: errors.into_inner(),
    };
    let value: Value = serde_json::to_value(&body).unwrap();
    assert_eq!(value, json!({ "fieldErrors": { "title": TITLE_MESSAGE } }));
}

// --- Validation Boundaries ---

#[test]
fn test_author_name_boundary_is_80_characters() {
    let at_limit = AuthorPayload {
        id: None,
        first_name: Some("a".repeat(80)),
        last_name: Some("é".repeat(80)),
        email_address: Some("x@y.z".to_string()),
    };
    assert!(at_limit.into_entity().is_ok(), "limit is counted in characters");

    let over = AuthorPayload {
        id: None,
        first_name: Some("a".to_string()),
        last_name: Some("b".repeat(81)),
        email_address: Some("x@y.z".to_string()),
    };
    let errors = over.into_entity().unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.get("lastName"), Some(LAST_NAME_MESSAGE));
}

fn post_payload(category: String, title: String, content: String) -> BlogPostPayload {
    BlogPostPayload {
        id: None,
        category: Some(category),
        title: Some(title),
        content: Some(content),
        author: None,
    }
}

#[test]
fn test_category_boundary_is_200_characters() {
    let at_limit = post_payload("c".repeat(200), "t".into(), "body".into());
    assert!(at_limit.into_entity().is_ok());

    let multibyte = post_payload("ß".repeat(200), "t".into(), "body".into());
    assert!(multibyte.into_entity().is_ok(), "limit is counted in characters");

    let over = post_payload("c".repeat(201), "t".into(), "body".into());
    let errors = over.into_entity().unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.get("category"), Some(CATEGORY_MESSAGE));
}

#[test]
fn test_title_boundary_is_200_characters() {
    let at_limit = post_payload("c".into(), "t".repeat(200), "body".into());
    assert!(at_limit.into_entity().is_ok());

    let over = post_payload("c".into(), "t".repeat(201), "body".into());
    let errors = over.into_entity().unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.get("title"), Some(TITLE_MESSAGE));
}

#[test]
fn test_content_boundary_is_500_000_characters() {
    let at_limit = post_payload("c".into(), "t".into(), "中".repeat(500_000));
    let post = at_limit.into_entity().unwrap();
    assert_eq!(post.content.chars().count(), 500_000);

    let over = post_payload("c".into(), "t".into(), "x".repeat(500_001));
    let errors = over.into_entity().unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.get("content"), Some(CONTENT_MESSAGE));
}

#[test]
fn test_empty_content_is_rejected() {
    let payload = BlogPostPayload {
        id: None,
        category: Some("c".to_string()),
        title: Some("t".repeat(200)),
        content: Some(String::new()),
        author: None,
    };

    let errors = payload.into_entity().unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.get("content"), Some(CONTENT_MESSAGE));
}

#[test]
fn test_email_format_is_not_checked() {
    let payload = AuthorPayload {
        id: None,
        first_name: Some("A".to_string()),
        last_name: Some("B".to_string()),
        email_address: Some("not an email".to_string()),
    };
    assert!(payload.into_entity().is_ok());
}
