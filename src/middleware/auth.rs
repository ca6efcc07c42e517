//! API key authentication middleware.
//!
//! This middleware intercepts every protected request to:
//! 1. Extract the API key from the Authorization header
//! 2. Hash it and verify it against the configured key registry
//! 3. Inject authentication context into the request
//! 4. Reject unauthorized requests with HTTP 401

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};

use crate::{error::AppError, models::api_key::ApiKeyRegistry};

/// Authorization scheme expected before the key.
const API_KEY_SCHEME: &str = "Api-Key ";

/// Authentication context attached to authenticated requests.
///
/// Handlers extract it with `Extension<AuthContext>`.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Name of the API key that made the request
    pub key_name: String,
}

/// Pull the raw key out of `Authorization: Api-Key <key>`.
pub fn extract_api_key(headers: &HeaderMap) -> Result<&str, AppError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::InvalidApiKey)?;

    let key = auth_header
        .strip_prefix(API_KEY_SCHEME)
        .map(str::trim)
        .ok_or(AppError::InvalidApiKey)?;

    if key.is_empty() {
        return Err(AppError::InvalidApiKey);
    }
    Ok(key)
}

/// API key authentication middleware function.
///
/// # Flow
///
/// 1. Extract `Authorization: Api-Key <key>` header from request
/// 2. Hash the `<key>` using SHA-256 and look it up in the registry
/// 3. If found: inject `AuthContext` into request, call next handler
/// 4. If not found: return 401 Unauthorized error
pub async fn auth_middleware(
    State(registry): State<Arc<ApiKeyRegistry>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let raw_key = extract_api_key(request.headers())?;

    let api_key = match registry.verify(raw_key) {
        Some(key) => key,
        None => {
            tracing::warn!(
                method = %request.method(),
                path = %request.uri().path(),
                "rejected request with unknown API key"
            );
            return Err(AppError::InvalidApiKey);
        }
    };

    let auth_context = AuthContext {
        key_name: api_key.name.clone(),
    };
    tracing::debug!(api_key = %auth_context.key_name, "request authenticated");

    request.extensions_mut().insert(auth_context);

    Ok(next.run(request).await)
}
