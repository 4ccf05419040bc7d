//! Session authentication: login, logout, and the guarding middleware
//!
//! A successful login creates a server-side session and hands the
//! browser an opaque token in an HttpOnly cookie. Protected routes run
//! behind `session_middleware`, which resolves the token back to a
//! `SessionUser` extension or answers 401.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::session::{SessionUser, SESSION_TTL_SECS};
use crate::AppState;

/// Cookie carrying the session token
pub const SESSION_COOKIE: &str = "session_token";

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// POST /login
///
/// Form credentials in, session cookie out. Admin lands on the admin
/// panel, everyone else on the client workspace.
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Response, ApiError> {
    let Some(user) = state
        .store
        .authenticate(&form.username, &form.password)
        .await?
    else {
        warn!("Failed login attempt for '{}'", form.username);
        return Err(ApiError::Unauthorized(
            "Invalid username or password".to_string(),
        ));
    };

    let destination = if user.username == "admin" {
        "/admin"
    } else {
        "/client"
    };

    let token = state.sessions.create(SessionUser {
        id: user.id,
        username: user.username.clone(),
        email: user.email,
    });
    info!("User '{}' logged in", user.username);

    let cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, token, SESSION_TTL_SECS
    );

    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Redirect::to(destination),
    )
        .into_response())
}

/// GET /logout
///
/// Drops the server-side session and expires the cookie.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = session_token(&headers) {
        state.sessions.remove(&token);
    }

    let cookie = format!("{}=; Path=/; HttpOnly; Max-Age=0", SESSION_COOKIE);
    (
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Redirect::to("/"),
    )
        .into_response()
}

/// Session middleware
///
/// Resolves the session cookie to a user and inserts it as a request
/// extension for downstream handlers. Applied to protected routes only.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = session_token(request.headers())
        .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))?;

    let user = state
        .sessions
        .lookup(&token)
        .ok_or_else(|| ApiError::Unauthorized("Session expired or invalid".to_string()))?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Pull the session token out of the Cookie header, if present
fn session_token(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_token_extracted_from_cookie_header() {
        let headers = headers_with_cookie("session_token=abc123");
        assert_eq!(session_token(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn test_token_found_among_other_cookies() {
        let headers = headers_with_cookie("theme=dark; session_token=tok; lang=en");
        assert_eq!(session_token(&headers).as_deref(), Some("tok"));
    }

    #[test]
    fn test_no_cookie_header_yields_none() {
        assert!(session_token(&HeaderMap::new()).is_none());
    }

    #[test]
    fn test_unrelated_cookies_yield_none() {
        let headers = headers_with_cookie("theme=dark; lang=en");
        assert!(session_token(&headers).is_none());
    }
}
