//! Session authentication middleware.
//!
//! This middleware intercepts every protected request to:
//! 1. Extract the session token from the `session` cookie
//! 2. Hash it and resolve it through the session store
//! 3. Inject the tenant context into the request
//! 4. Redirect unauthenticated requests to the login page
//!
//! The resolved `hub_id` is the only source of tenant identity in the
//! system; handlers never read it from client input.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::COOKIE},
    middleware::Next,
    response::Response,
};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::AppError;
use crate::routes::AppState;

/// Name of the session cookie set by the authentication service.
const SESSION_COOKIE: &str = "session";

/// Tenant context attached to authenticated requests.
///
/// Inserted into the request's extension map; handlers extract it with
/// `Extension<SessionContext>`.
#[derive(Debug, Clone, Copy)]
pub struct SessionContext {
    /// Tenant every query and mutation in this request is scoped to.
    pub hub_id: Uuid,
}

/// Hash a session token for storage lookup.
///
/// Tokens are stored hashed, so a leaked sessions table cannot be
/// replayed directly.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Pull the session token out of the request's cookie header.
fn session_token(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        pair.trim()
            .strip_prefix(SESSION_COOKIE)
            .and_then(|rest| rest.strip_prefix('='))
            .map(str::to_string)
    })
}

/// Session authentication middleware function.
///
/// A missing or unknown token results in a redirect to `/login`
/// (via [`AppError::Unauthorized`]), never a 401/403 body.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = session_token(request.headers()).ok_or(AppError::Unauthorized)?;

    let hub_id = state
        .sessions
        .resolve(&hash_token(&token))
        .await?
        .ok_or(AppError::Unauthorized)?;

    request.extensions_mut().insert(SessionContext { hub_id });

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn token_is_read_from_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; session=tok123; lang=en"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("tok123"));
    }

    #[test]
    fn missing_cookie_yields_no_token() {
        assert_eq!(session_token(&HeaderMap::new()), None);

        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark"));
        assert_eq!(session_token(&headers), None);
    }

    #[test]
    fn token_hashing_is_stable() {
        assert_eq!(hash_token("tok"), hash_token("tok"));
        assert_ne!(hash_token("tok"), hash_token("tok2"));
        assert_eq!(hash_token("tok").len(), 64);
    }
}
