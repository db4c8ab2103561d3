use std::time::Duration;

use axum::http::{header, HeaderMap};
use chrono::{DateTime, Utc};
use moka::future::Cache;

pub const SESSION_COOKIE: &str = "regadmin_session";

/// The administrator behind an authenticated request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminContext {
    pub admin_id: i64,
    pub username: String,
    pub logged_in_at: DateTime<Utc>,
}

/// Server-side session table keyed by an opaque random token
#[derive(Clone)]
pub struct SessionStore {
    sessions: Cache<String, AdminContext>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Cache::builder().time_to_live(ttl).build(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn create(&self, context: AdminContext) -> String {
        let token = hex::encode(rand::random::<[u8; 32]>());
        self.sessions.insert(token.clone(), context).await;
        token
    }

    pub async fn get(&self, token: &str) -> Option<AdminContext> {
        self.sessions.get(token).await
    }

    pub async fn revoke(&self, token: &str) {
        self.sessions.invalidate(token).await;
    }

    /// `Set-Cookie` value for a fresh session
    pub fn cookie(&self, token: &str) -> String {
        format!(
            "{SESSION_COOKIE}={token}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
            self.ttl.as_secs()
        )
    }
}

/// `Set-Cookie` value that expires the session cookie
pub fn expired_cookie() -> String {
    format!("{SESSION_COOKIE}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0")
}

/// Session token from the request's `Cookie` header(s)
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn context() -> AdminContext {
        AdminContext {
            admin_id: 1,
            username: "root".into(),
            logged_in_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let store = SessionStore::new(Duration::from_secs(60));
        let token = store.create(context()).await;
        assert_eq!(token.len(), 64);
        assert_eq!(store.get(&token).await.map(|c| c.admin_id), Some(1));

        store.revoke(&token).await;
        assert!(store.get(&token).await.is_none());
    }

    #[test]
    fn test_cookie_attributes() {
        let store = SessionStore::new(Duration::from_secs(60));
        let cookie = store.cookie("abc");
        assert!(cookie.starts_with("regadmin_session=abc;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Max-Age=60"));
    }

    #[test]
    fn test_token_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; regadmin_session=f00d; lang=en"),
        );
        assert_eq!(token_from_headers(&headers).as_deref(), Some("f00d"));

        let mut empty = HeaderMap::new();
        empty.insert(header::COOKIE, HeaderValue::from_static("regadmin_session="));
        assert_eq!(token_from_headers(&empty), None);
    }
}
