//! Session cookie helpers

use axum::http::HeaderMap;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use garage_core::db::MAX_SESSION_TTL_HOURS;

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "garage_session";

/// Extract the session token from the request cookies
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Cookie starting a session
pub fn session_cookie(token: &str, ttl_hours: i64, secure: bool) -> Cookie<'static> {
    let mut cookie = base_cookie(token.to_string(), secure);
    cookie.set_max_age(time::Duration::hours(ttl_hours.clamp(0, MAX_SESSION_TTL_HOURS)));
    cookie
}

/// Cookie that removes the session cookie
pub fn clear_cookie(secure: bool) -> Cookie<'static> {
    let mut cookie = base_cookie(String::new(), secure);
    cookie.make_removal();
    cookie
}

fn base_cookie(value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .secure(secure)
        .build()
}
