use axum::http::HeaderMap;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::config::Config;

/// Name of the HttpOnly cookie holding the session token.
pub const SESSION_COOKIE: &str = "studio_session";

/// Build the session cookie for a freshly issued token.
#[must_use]
pub fn session_cookie(token: String, config: &Config) -> Cookie<'static> {
    let max_age = i64::try_from(config.session_ttl_secs).unwrap_or(i64::MAX / 2);
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure_cookies())
        .max_age(time::Duration::seconds(max_age))
        .build()
}

/// A cookie that, once added to a jar, instructs the browser to drop the session.
#[must_use]
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE).path("/").build()
}

/// Read the session token from the cookie, falling back to `Authorization: Bearer`.
#[must_use]
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(SESSION_COOKIE)
        && !cookie.value().is_empty()
    {
        return Some(cookie.value().to_string());
    }

    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
}
