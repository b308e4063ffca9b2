use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};

use super::{AUTHORS_BASE, resource_location};
use crate::{
    AppState,
    auth::AuthUser,
    error::ApiError,
    models::{Author, AuthorPayload, ValidationErrorResponse},
    validation::IntoEntity,
};

/// create_author
///
/// Validates the payload, persists it and answers 201 with the stored author and a
/// `Location` header. A client-supplied `id` is ignored.
#[utoipa::path(
    post,
    path = "/api/authors",
    request_body = AuthorPayload,
    responses(
        (status = 201, description = "Created", body = Author),
        (status = 400, description = "Invalid input", body = ValidationErrorResponse),
        (status = 403, description = "Missing or invalid bearer token")
    ),
    security(("bearer" = []))
)]
pub async fn create_author(
    AuthUser { subject }: AuthUser,
    State(state): State<AppState>,
    uri: Uri,
    headers: HeaderMap,
    payload: Result<Json<AuthorPayload>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(payload) = payload?;
    let author = payload.into_entity()?;

    let saved = state.authors.save(author).await?;
    let id = saved.id.unwrap_or_default();
    tracing::info!(author_id = id, %subject, "author created");

    let location = resource_location(&uri, &headers, AUTHORS_BASE, id)?;
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(saved)).into_response())
}

/// get_authors
///
/// Every stored author, possibly an empty list.
#[utoipa::path(
    get,
    path = "/api/authors",
    responses((status = 200, description = "All authors", body = [Author]))
)]
pub async fn get_authors(State(state): State<AppState>) -> Result<Json<Vec<Author>>, ApiError> {
    Ok(Json(state.authors.find_all().await?))
}

/// get_author
///
/// A single author, wrapped in a one-element list.
#[utoipa::path(
    get,
    path = "/api/authors/{id}",
    params(("id" = i64, Path, description = "Author ID")),
    responses(
        (status = 200, description = "Found", body = [Author]),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_author(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Author>>, ApiError> {
    match state.authors.find_by_id(id).await? {
        Some(author) => Ok(Json(vec![author])),
        None => Err(ApiError::NotFound),
    }
}

/// update_author
///
/// Full replacement. The body `id` must equal the path id (409 otherwise, checked
/// before storage is consulted) and the author must already exist (404).
#[utoipa::path(
    put,
    path = "/api/authors/{id}",
    params(("id" = i64, Path, description = "Author ID")),
    request_body = AuthorPayload,
    responses(
        (status = 204, description = "Replaced"),
        (status = 400, description = "Invalid input", body = ValidationErrorResponse),
        (status = 403, description = "Missing or invalid bearer token"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Path and body id differ")
    ),
    security(("bearer" = []))
)]
pub async fn update_author(
    AuthUser { subject }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<AuthorPayload>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(payload) = payload?;
    let body_id = payload.id;
    let mut author = payload.into_entity()?;

    if body_id != Some(id) {
        return Err(ApiError::Conflict);
    }
    if !state.authors.exists_by_id(id).await? {
        return Err(ApiError::NotFound);
    }

    author.id = Some(id);
    state.authors.save(author).await?;
    tracing::info!(author_id = id, %subject, "author replaced");
    Ok(StatusCode::NO_CONTENT)
}

/// delete_author
///
/// Looks the author up first and deletes the fetched record.
#[utoipa::path(
    delete,
    path = "/api/authors/{id}",
    params(("id" = i64, Path, description = "Author ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Missing or invalid bearer token"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer" = []))
)]
pub async fn delete_author(
    AuthUser { subject }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let author = state.authors.find_by_id(id).await?.ok_or(ApiError::NotFound)?;
    state.authors.delete(author).await?;
    tracing::info!(author_id = id, %subject, "author deleted");
    Ok(StatusCode::NO_CONTENT)
}
