//! Session identifier extraction.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::CookieJar;
use sb_session::SessionId;

use crate::state::AppState;

/// Reads the session identifier from the named cookie.
///
/// A missing, empty or malformed cookie yields `None`.
pub fn extract_session_id(jar: &CookieJar, cookie_name: &str) -> Option<SessionId> {
    jar.get(cookie_name)
        .and_then(|cookie| SessionId::parse(cookie.value()))
}

/// Session identifier presented by the client, if any.
///
/// Never rejects a request: an absent or unusable cookie is simply `None`.
#[derive(Debug, Clone)]
pub struct SessionCookie(pub Option<SessionId>);

impl FromRequestParts<AppState> for SessionCookie {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        Ok(Self(extract_session_id(&jar, state.cookie_name())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderMap, HeaderValue};

    fn jar(cookie: &'static str) -> CookieJar {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static(cookie));
        CookieJar::from_headers(&headers)
    }

    #[test]
    fn reads_named_cookie() {
        let jar = jar("theme=dark; shared_session_id=abc123");
        let id = extract_session_id(&jar, "shared_session_id").unwrap();
        assert_eq!(id.as_str(), "abc123");
    }

    #[test]
    fn missing_or_empty_cookie_is_none() {
        assert!(extract_session_id(&jar("theme=dark"), "shared_session_id").is_none());
        assert!(extract_session_id(&jar("shared_session_id="), "shared_session_id").is_none());
        assert!(extract_session_id(&CookieJar::new(), "shared_session_id").is_none());
    }

    #[test]
    fn honours_custom_cookie_name() {
        let jar = jar("sessionid=xyz789");
        assert!(extract_session_id(&jar, "shared_session_id").is_none());
        assert_eq!(
            extract_session_id(&jar, "sessionid").unwrap().as_str(),
            "xyz789"
        );
    }
}
