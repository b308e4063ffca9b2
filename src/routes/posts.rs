use crate::{AppState, handlers::posts};
use axum::{Router, routing::get};

/// Blog Post Router
///
/// Same access rules as the author router. The static `/category` segment takes
/// precedence over the `{id}` capture.
pub fn post_routes() -> Router<AppState> {
    Router::new()
        // GET /api/articles, POST /api/articles
        .route("/api/articles", get(posts::get_posts).post(posts::create_post))
        // GET /api/articles/category?categoryName=...
        .route("/api/articles/category", get(posts::get_posts_by_category))
        // GET, PUT, DELETE /api/articles/{id}
        .route(
            "/api/articles/{id}",
            get(posts::get_post)
                .put(posts::update_post)
                .delete(posts::delete_post),
        )
}
