//! Captcha codes bound to a browser session cookie.

use axum::http::{header::COOKIE, HeaderMap};
use moka::future::Cache;
use std::time::{Duration, Instant};
use uuid::Uuid;

pub const CAPTCHA_COOKIE: &str = "captcha_session";

/// How long an issued code stays answerable.
pub const CAPTCHA_TTL: Duration = Duration::from_secs(10 * 60);

/// Session id carried by the request's `captcha_session` cookie, if valid.
pub fn session_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|part| part.trim().split_once('='))
        .find(|(name, _)| *name == CAPTCHA_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

/// `Set-Cookie` value binding the browser to `session`.
pub fn session_cookie(session: Uuid, secure: bool) -> String {
    let secure_flag = if secure { "; Secure" } else { "" };
    format!(
        "{}={}; Path=/; SameSite=Lax; HttpOnly; Max-Age={}{}",
        CAPTCHA_COOKIE,
        session,
        CAPTCHA_TTL.as_secs(),
        secure_flag
    )
}

#[derive(Debug, Clone)]
struct IssuedCode {
    code: String,
    issued_at: Instant,
}

#[derive(Clone)]
pub struct CaptchaSessions {
    codes: Cache<Uuid, IssuedCode>,
    ttl: Duration,
}

impl CaptchaSessions {
    pub fn new(ttl: Duration) -> Self {
        Self {
            codes: Cache::builder().time_to_live(ttl).build(),
            ttl,
        }
    }

    /// Remember `code` as the answer for `session`, replacing any earlier one.
    pub async fn store(&self, session: Uuid, code: String) {
        let issued = IssuedCode {
            code,
            issued_at: Instant::now(),
        };
        self.codes.insert(session, issued).await;
    }

    /// Check an answer. The stored code is consumed whatever the outcome.
    ///
    /// `remove` can hand back an entry whose TTL passed but which the cache
    /// has not evicted yet, so the age is checked here as well.
    pub async fn verify(&self, session: Uuid, answer: &str) -> bool {
        match self.codes.remove(&session).await {
            Some(issued) if issued.issued_at.elapsed() < self.ttl => {
                issued.code.eq_ignore_ascii_case(answer.trim())
            }
            Some(_) => {
                tracing::debug!(session = %session, "Captcha code expired");
                false
            }
            None => false,
        }
    }
}

impl Default for CaptchaSessions {
    fn default() -> Self {
        Self::new(CAPTCHA_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[tokio::test]
    async fn test_verify_is_case_insensitive_and_single_use() {
        let sessions = CaptchaSessions::default();
        let session = Uuid::new_v4();

        sessions.store(session, "AB3K".to_string()).await;
        assert!(sessions.verify(session, " ab3k ").await);
        assert!(!sessions.verify(session, "AB3K").await);
    }

    #[tokio::test]
    async fn test_wrong_answer_consumes_code() {
        let sessions = CaptchaSessions::default();
        let session = Uuid::new_v4();

        sessions.store(session, "XY7Z".to_string()).await;
        assert!(!sessions.verify(session, "nope").await);
        assert!(!sessions.verify(session, "XY7Z").await);
    }

    #[tokio::test]
    async fn test_codes_expire() {
        let sessions = CaptchaSessions::new(Duration::from_millis(50));
        let session = Uuid::new_v4();

        sessions.store(session, "QWER".to_string()).await;
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(!sessions.verify(session, "QWER").await);
    }

    #[tokio::test]
    async fn test_expired_code_is_consumed() {
        let sessions = CaptchaSessions::new(Duration::from_millis(50));
        let session = Uuid::new_v4();

        sessions.store(session, "QWER".to_string()).await;
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(!sessions.verify(session, "QWER").await);

        // A fresh code for the same session is answerable again.
        sessions.store(session, "ZXCV".to_string()).await;
        assert!(sessions.verify(session, "zxcv").await);
    }

    #[test]
    fn test_session_cookie_round_trip() {
        let session = Uuid::new_v4();
        let cookie = session_cookie(session, false);
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(!cookie.contains("Secure"));

        let mut headers = HeaderMap::new();
        let request_cookie = format!("theme=dark; {}={}", CAPTCHA_COOKIE, session);
        headers.insert(COOKIE, HeaderValue::from_str(&request_cookie).unwrap());
        assert_eq!(session_from_headers(&headers), Some(session));
    }

    #[test]
    fn test_garbage_session_cookie_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("captcha_session=not-a-uuid"));
        assert_eq!(session_from_headers(&headers), None);
        assert_eq!(session_from_headers(&HeaderMap::new()), None);
    }
}
