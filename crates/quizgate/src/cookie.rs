//! The `session` cookie: reading it from requests and setting or clearing
//! it on responses.
//!
//! Attributes are fixed: `Path=/`, `HttpOnly`, `SameSite=Lax`, and no
//! `Domain`, so the browser scopes the cookie to whatever host it came
//! from. Both services sit behind one host in deployment, which is how the
//! quiz service gets to see a cookie the identity service set.

use std::time::Duration;

use axum::http::{HeaderMap, header};
use quizgate_token::SESSION_COOKIE;

/// Returns the session token from the request's `Cookie` headers.
///
/// An empty value counts as no token. If the cookie appears more than once
/// the first one wins.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value that stores `token` for `max_age`.
pub fn set_session_cookie(token: &str, max_age: Duration) -> String {
    format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        max_age.as_secs()
    )
}

/// `Set-Cookie` value that makes the browser drop the session cookie.
pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}
