//! Anti-forgery token handling.
//!
//! The API sets a `csrf_token` cookie on every response and expects it back
//! in the `X-CSRFToken` header on state-changing requests.

use reqwest::Method;

/// Cookie carrying the anti-forgery token.
pub const CSRF_COOKIE: &str = "csrf_token";

/// Request header the API reads the token from.
pub const CSRF_HEADER: &str = "X-CSRFToken";

/// Methods that must carry the token.
pub fn is_mutating(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

/// Find the token in a `Cookie` header value (`a=1; csrf_token=xyz`).
pub fn token_from_cookie_header(header: &str) -> Option<&str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == CSRF_COOKIE)
        .map(|(_, value)| value.trim_matches('"'))
        .filter(|value| !value.is_empty())
}
