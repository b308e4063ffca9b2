use crate::{AppState, handlers::authors};
use axum::{Router, routing::get};

/// Author Router
///
/// Reads are public. POST, PUT and DELETE only reach their handlers once the
/// authorization gate has accepted the bearer token.
pub fn author_routes() -> Router<AppState> {
    Router::new()
        // GET /api/authors, POST /api/authors
        .route(
            "/api/authors",
            get(authors::get_authors).post(authors::create_author),
        )
        // GET, PUT, DELETE /api/authors/{id}
        .route(
            "/api/authors/{id}",
            get(authors::get_author)
                .put(authors::update_author)
                .delete(authors::delete_author),
        )
}
