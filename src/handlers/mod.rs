//! HTTP controllers for the two resources.

use axum::http::{HeaderMap, HeaderValue, Uri, header};

use crate::error::ApiError;

pub mod authors;
pub mod posts;

/// Collection path of the author resource.
pub const AUTHORS_BASE: &str = "/api/authors";
/// Collection path of the blog post resource.
pub const ARTICLES_BASE: &str = "/api/articles";

/// resource_location
///
/// Absolute URL of a newly created resource, `{scheme}://{host}{collection}/{id}`.
/// Scheme and authority are taken from the inbound request so the header points
/// back at the same host and port the client used.
pub fn resource_location(
    uri: &Uri,
    headers: &HeaderMap,
    collection: &str,
    id: i64,
) -> Result<HeaderValue, ApiError> {
    let scheme = uri.scheme_str().unwrap_or("http");
    let authority = uri
        .authority()
        .map(|authority| authority.as_str())
        .or_else(|| headers.get(header::HOST).and_then(|host| host.to_str().ok()))
        .unwrap_or("localhost");

    HeaderValue::try_from(format!("{scheme}://{authority}{collection}/{id}"))
        .map_err(|_| ApiError::BadRequest("Host header is not a valid authority".to_string()))
}
