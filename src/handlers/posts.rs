use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderMap, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use super::{ARTICLES_BASE, resource_location};
use crate::{
    AppState,
    auth::AuthUser,
    error::ApiError,
    models::{AuthorRef, BlogPost, BlogPostPayload, ErrorMessage, ValidationErrorResponse},
    validation::{FieldErrors, IntoEntity},
};

/// CategoryQuery
///
/// Query string of GET /api/articles/category. `categoryName` is required; it is
/// optional here only so its absence can be answered with a 400 of our own.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CategoryQuery {
    /// Exact category to match.
    #[serde(rename = "categoryName")]
    pub category_name: Option<String>,
}

/// Resolves the optional author reference of a post draft. An unknown author is
/// reported together with any field errors the draft already carries.
async fn with_author(
    state: &AppState,
    draft: Result<BlogPost, FieldErrors>,
    author_ref: Option<AuthorRef>,
) -> Result<BlogPost, ApiError> {
    let author = match author_ref {
        Some(reference) => match state.authors.find_by_id(reference.id).await? {
            Some(author) => Some(author),
            None => {
                let mut errors = draft.err().unwrap_or_default();
                errors.insert("author", format!("Author {} does not exist", reference.id));
                return Err(ApiError::Validation(errors));
            }
        },
        None => None,
    };

    let mut post = draft?;
    post.author = author;
    Ok(post)
}

/// create_post
///
/// Validates and persists a new post. Storage assigns the id and `datePosted`.
#[utoipa::path(
    post,
    path = "/api/articles",
    request_body = BlogPostPayload,
    responses(
        (status = 201, description = "Created", body = BlogPost),
        (status = 400, description = "Invalid input", body = ValidationErrorResponse),
        (status = 403, description = "Missing or invalid bearer token")
    ),
    security(("bearer" = []))
)]
pub async fn create_post(
    AuthUser { subject }: AuthUser,
    State(state): State<AppState>,
    uri: Uri,
    headers: HeaderMap,
    payload: Result<Json<BlogPostPayload>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(payload) = payload?;
    let author_ref = payload.author;
    let post = with_author(&state, payload.into_entity(), author_ref).await?;

    let saved = state.posts.save(post).await?;
    let id = saved.id.unwrap_or_default();
    tracing::info!(post_id = id, category = %saved.category, %subject, "blog post created");

    let location = resource_location(&uri, &headers, ARTICLES_BASE, id)?;
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(saved)).into_response())
}

/// get_posts
///
/// Every stored post in storage order, possibly an empty list.
#[utoipa::path(
    get,
    path = "/api/articles",
    responses((status = 200, description = "All posts", body = [BlogPost]))
)]
pub async fn get_posts(State(state): State<AppState>) -> Result<Json<Vec<BlogPost>>, ApiError> {
    Ok(Json(state.posts.find_all().await?))
}

/// get_posts_by_category
///
/// Posts in one category, newest first.
#[utoipa::path(
    get,
    path = "/api/articles/category",
    params(CategoryQuery),
    responses(
        (status = 200, description = "Matching posts", body = [BlogPost]),
        (status = 400, description = "categoryName missing", body = ErrorMessage)
    )
)]
pub async fn get_posts_by_category(
    State(state): State<AppState>,
    query: Result<Query<CategoryQuery>, QueryRejection>,
) -> Result<Json<Vec<BlogPost>>, ApiError> {
    let Query(query) = query?;
    let category = query.category_name.ok_or_else(|| {
        ApiError::BadRequest("Required request parameter 'categoryName' is not present".to_string())
    })?;

    let posts = state
        .posts
        .find_by_category_order_by_date_posted_desc(&category)
        .await?;
    Ok(Json(posts))
}

/// get_post
///
/// A single post, wrapped in a one-element list.
#[utoipa::path(
    get,
    path = "/api/articles/{id}",
    params(("id" = i64, Path, description = "Blog post ID")),
    responses(
        (status = 200, description = "Found", body = [BlogPost]),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<BlogPost>>, ApiError> {
    match state.posts.find_by_id(id).await? {
        Some(post) => Ok(Json(vec![post])),
        None => Err(ApiError::NotFound),
    }
}

/// update_post
///
/// Full replacement of category, title, content and author. Runs field validation
/// (400), then the path/body id check (409), then author resolution (400), then the
/// existence check (404). `datePosted` keeps the value stamped at creation whatever
/// the body says.
#[utoipa::path(
    put,
    path = "/api/articles/{id}",
    params(("id" = i64, Path, description = "Blog post ID")),
    request_body = BlogPostPayload,
    responses(
        (status = 204, description = "Replaced"),
        (status = 400, description = "Invalid input", body = ValidationErrorResponse),
        (status = 403, description = "Missing or invalid bearer token"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Path and body id differ")
    ),
    security(("bearer" = []))
)]
pub async fn update_post(
    AuthUser { subject }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<BlogPostPayload>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(payload) = payload?;
    let (body_id, author_ref) = (payload.id, payload.author);
    let draft = payload.into_entity()?;

    // Identity is settled before storage is consulted for anything.
    if body_id != Some(id) {
        return Err(ApiError::Conflict);
    }
    let mut post = with_author(&state, Ok(draft), author_ref).await?;
    if !state.posts.exists_by_id(id).await? {
        return Err(ApiError::NotFound);
    }

    post.id = Some(id);
    state.posts.save(post).await?;
    tracing::info!(post_id = id, %subject, "blog post replaced");
    Ok(StatusCode::NO_CONTENT)
}

/// delete_post
///
/// Looks the post up first and deletes the fetched record.
#[utoipa::path(
    delete,
    path = "/api/articles/{id}",
    params(("id" = i64, Path, description = "Blog post ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Missing or invalid bearer token"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer" = []))
)]
pub async fn delete_post(
    AuthUser { subject }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let post = state.posts.find_by_id(id).await?.ok_or(ApiError::NotFound)?;
    state.posts.delete(post).await?;
    tracing::info!(post_id = id, %subject, "blog post deleted");
    Ok(StatusCode::NO_CONTENT)
}
