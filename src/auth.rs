use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{HeaderMap, Method, header, request::Parts},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, Validation, decode, errors::ErrorKind};
use serde::{Deserialize, Serialize};

use crate::{config::AppConfig, error::ApiError};

/// Claims
///
/// Payload expected inside a bearer token. Tokens are issued elsewhere; this service
/// only verifies the HS256 signature and the expiry.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): who is making the change. Only used for logging.
    pub sub: String,
    /// Expiration Time (exp): the token is rejected after this instant.
    pub exp: usize,
    /// Issued At (iat).
    pub iat: usize,
}

/// AuthUser
///
/// The resolved identity behind a mutating request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub subject: String,
}

/// RequestClass
///
/// The authorization gate treats requests in two classes: reads are always
/// permitted, anything that can change state needs a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestClass {
    Read,
    Mutating,
}

impl RequestClass {
    pub fn of(method: &Method) -> Self {
        if method == Method::GET || method == Method::HEAD || method == Method::OPTIONS {
            RequestClass::Read
        } else {
            RequestClass::Mutating
        }
    }
}

/// verify_bearer
///
/// Extracts `Authorization: Bearer <jwt>` and validates it against `secret`.
/// Every failure collapses to `ApiError::Forbidden`; the reason is only logged.
///
/// The process involves:
/// 1. Header Extraction: the `Bearer ` scheme is required, anything else is absent.
/// 2. Token Validation: HS256 signature and a mandatory, unexpired `exp`.
/// 3. Identity: the `sub` claim becomes the `AuthUser` subject.
pub fn verify_bearer(headers: &HeaderMap, secret: &str) -> Result<AuthUser, ApiError> {
    // 1. Header Extraction
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| {
            tracing::debug!("missing bearer credential");
            ApiError::Forbidden
        })?;

    // 2. Token Validation
    // Validation::default() is HS256 with `exp` required.
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::default();
    validation.validate_exp = true;

    match decode::<Claims>(token, &decoding_key, &validation) {
        // 3. Identity
        Ok(data) => Ok(AuthUser {
            subject: data.claims.sub,
        }),
        Err(e) => {
            match e.kind() {
                ErrorKind::ExpiredSignature => tracing::debug!("bearer credential expired"),
                other => tracing::debug!(reason = ?other, "bearer credential rejected"),
            }
            Err(ApiError::Forbidden)
        }
    }
}

/// AuthUser Extractor Implementation
///
/// Reuses the identity stored by `authorization_gate` when present, otherwise
/// verifies the request's own bearer token. Rejection: 403.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // 1. Identity already resolved by the gate for this request.
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }
        // 2. Handler reached without the gate (direct router use): verify here.
        let config = AppConfig::from_ref(state);
        verify_bearer(&parts.headers, &config.jwt_secret)
    }
}

/// authorization_gate
///
/// Middleware run before every `/api` handler. Read requests pass straight through.
/// Mutating requests without a valid credential are answered with 403 here, so the
/// handler and the repositories are never reached.
pub async fn authorization_gate(
    State(config): State<AppConfig>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // 1. Classification
    // Reads are public and skip verification entirely.
    if RequestClass::of(request.method()) == RequestClass::Mutating {
        // 2. Credential Check
        // Short-circuits with 403; the handler and storage never run.
        let user = verify_bearer(request.headers(), &config.jwt_secret).inspect_err(|_| {
            tracing::info!(method = %request.method(), uri = %request.uri(), "write rejected: no valid credential");
        })?;

        // 3. Hand the identity to the handler's `AuthUser` extractor.
        request.extensions_mut().insert(user);
    }
    Ok(next.run(request).await)
}
