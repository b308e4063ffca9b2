use axum::{
    Router,
    extract::{DefaultBodyLimit, FromRef},
    http::{
        HeaderName,
        header::{ACCESS_CONTROL_REQUEST_HEADERS, ACCESS_CONTROL_REQUEST_METHOD, ORIGIN},
    },
    middleware,
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod routes;
pub mod validation;

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::{ApiError, RepositoryError};
pub use repository::{
    AuthorRepositoryState, BlogPostRepositoryState, InMemoryStore, PostgresRepository,
};

/// ApiDoc
///
/// OpenAPI document for every endpoint and schema, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::authors::create_author, handlers::authors::get_authors,
        handlers::authors::get_author, handlers::authors::update_author,
        handlers::authors::delete_author,
        handlers::posts::create_post, handlers::posts::get_posts,
        handlers::posts::get_posts_by_category, handlers::posts::get_post,
        handlers::posts::update_post, handlers::posts::delete_post,
    ),
    components(
        schemas(
            models::Author, models::BlogPost, models::AuthorPayload, models::AuthorRef,
            models::BlogPostPayload, models::ValidationErrorResponse, models::ErrorMessage,
        )
    ),
    modifiers(&BearerSecurity),
    tags(
        (name = "blog", description = "Blog authors and articles API")
    )
)]
struct ApiDoc;

/// Registers the `bearer` scheme referenced by the mutating endpoints.
struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// AppState
///
/// Shared, cheaply cloneable container for the repositories and configuration.
#[derive(Clone)]
pub struct AppState {
    /// Author storage: Postgres or the in-memory store.
    pub authors: AuthorRepositoryState,
    /// Blog post storage. Usually the same backing object as `authors`.
    pub posts: BlogPostRepositoryState,
    /// Configuration: the loaded, immutable environment configuration.
    pub config: AppConfig,
}

impl AppState {
    /// State backed by a single fresh in-memory store.
    pub fn in_memory(config: AppConfig) -> Self {
        let store = std::sync::Arc::new(InMemoryStore::new());
        Self {
            authors: store.clone(),
            posts: store,
            config,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

// Let handlers, the gate and the `AuthUser` extractor pull single components
// out of the shared state.

impl FromRef<AppState> for AuthorRepositoryState {
    fn from_ref(app_state: &AppState) -> AuthorRepositoryState {
        app_state.authors.clone()
    }
}

impl FromRef<AppState> for BlogPostRepositoryState {
    fn from_ref(app_state: &AppState) -> BlogPostRepositoryState {
        app_state.posts.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// Largest request body accepted on `/api` routes. Sized for 500,000 characters of
/// article content at 12 bytes each (a JSON-escaped surrogate pair) plus the
/// surrounding fields.
pub const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

/// create_router
///
/// Assembles the routes, puts the authorization gate in front of every `/api`
/// handler and wraps the whole service in request-id, tracing and CORS layers.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    // Cross-origin reads from the blog front end. `Vary` is emitted on every response.
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any)
        .vary([ORIGIN, ACCESS_CONTROL_REQUEST_METHOD, ACCESS_CONTROL_REQUEST_HEADERS]);

    // Header name constant for request correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Resource Routes
    // 2a. The gate runs as a route layer, so unmatched paths are still 404/405
    //     rather than 403.
    // 2b. axum's default 2 MiB cap would reject valid long articles.
    let api = routes::api_routes()
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::authorization_gate,
        ))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES));

    // 3. Base Router Assembly
    // Docs and the health probe are never gated.
    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(routes::health_routes())
        .merge(api)
        .with_state(state);

    // 4. Global Middleware Layers
    // Outermost first on the way in: CORS, then request id, trace span, id propagation.
    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span for one request, correlated by the `x-request-id` set above.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
