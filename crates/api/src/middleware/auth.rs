//! Session extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use jobs2go_core::error::CoreError;
use jobs2go_core::types::DbId;

use crate::auth::jwt::{validate_token, JwtConfig};
use crate::error::AppError;
use crate::state::AppState;

/// Cookie carrying the session token for browser clients.
pub const SESSION_COOKIE: &str = "session_token";

/// Message for every 401.
pub const UNAUTHORIZED: &str = "Unauthorized";

/// Authenticated user extracted from the session token.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user's internal database id (from `claims.sub`).
    pub user_id: DbId,
    /// The user's email, if the identity provider supplied one.
    pub email: Option<String>,
}

impl AuthUser {
    /// Resolve the session from request headers, if there is a valid one.
    pub fn from_headers(headers: &HeaderMap, config: &JwtConfig) -> Option<Self> {
        let token = bearer_token(headers).or_else(|| cookie_value(headers, SESSION_COOKIE))?;
        let claims = validate_token(token, config)
            .map_err(|e| tracing::debug!(error = %e, "Rejected session token"))
            .ok()?;
        Some(AuthUser {
            user_id: claims.sub,
            email: claims.email,
        })
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        AuthUser::from_headers(&parts.headers, &state.config.jwt)
            .ok_or_else(|| AppError::Core(CoreError::Unauthorized(UNAUTHORIZED.into())))
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;
    use crate::auth::jwt::generate_session_token;

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "middleware-test-secret".into(),
            session_expiry_mins: 5,
        }
    }

    #[test]
    fn reads_bearer_token() {
        let token = generate_session_token(3, Some("a@jobs2go.app"), &config()).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );

        let user = AuthUser::from_headers(&headers, &config()).unwrap();
        assert_eq!(user.user_id, 3);
        assert_eq!(user.email.as_deref(), Some("a@jobs2go.app"));
    }

    #[test]
    fn falls_back_to_session_cookie() {
        let token = generate_session_token(4, None, &config()).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("theme=dark; {SESSION_COOKIE}={token}")).unwrap(),
        );

        assert_eq!(AuthUser::from_headers(&headers, &config()).unwrap().user_id, 4);
    }

    #[test]
    fn garbage_token_is_no_session() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer nope"));
        assert!(AuthUser::from_headers(&headers, &config()).is_none());
        assert!(AuthUser::from_headers(&HeaderMap::new(), &config()).is_none());
    }
}
