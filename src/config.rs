use std::env;

/// Fallback signing secret for local development only.
pub const LOCAL_JWT_SECRET: &str = "local-development-jwt-secret";

/// Address the HTTP server binds to when `BIND_ADDR` is unset.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// AppConfig
///
/// Holds the application's configuration. Immutable once loaded and shared with
/// handlers and the authorization gate through `FromRef`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Postgres connection string. `None` selects the in-memory store (local only).
    pub db_url: Option<String>,
    // Upper bound of the Postgres connection pool.
    pub db_max_connections: u32,
    // Socket address the server listens on.
    pub bind_addr: String,
    // Runtime environment marker. Controls logging format and fail-fast rules.
    pub env: Env,
    // HS256 secret used to verify bearer tokens on mutating requests.
    pub jwt_secret: String,
}

/// Env
///
/// Runtime context: relaxed defaults for local development, mandatory secrets in production.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// Local configuration without a database, used for test scaffolding.
    fn default() -> Self {
        Self {
            db_url: None,
            db_max_connections: 5,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            env: Env::Local,
            jwt_secret: LOCAL_JWT_SECRET.to_string(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables.
    ///
    /// # Panics
    /// Panics in production when `DATABASE_URL` or `JWT_SECRET` is missing, and in any
    /// environment when `DB_MAX_CONNECTIONS` is not a number. The service refuses to start
    /// with an incomplete configuration.
    pub fn load() -> Self {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let (db_url, jwt_secret) = match env {
            Env::Production => (
                Some(env::var("DATABASE_URL").expect("FATAL: DATABASE_URL required in prod")),
                env::var("JWT_SECRET").expect("FATAL: JWT_SECRET must be set in production."),
            ),
            Env::Local => (
                env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
                env::var("JWT_SECRET").unwrap_or_else(|_| LOCAL_JWT_SECRET.to_string()),
            ),
        };

        let db_max_connections = env::var("DB_MAX_CONNECTIONS")
            .map(|raw| {
                raw.parse()
                    .expect("FATAL: DB_MAX_CONNECTIONS must be a positive integer")
            })
            .unwrap_or(5);

        Self {
            db_url,
            db_max_connections,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            env,
            jwt_secret,
        }
    }
}
