use std::collections::HashMap;
use std::sync::Arc;

use axum::http::{header, HeaderMap};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::model::AdminSession;

type HmacSha256 = Hmac<Sha256>;

pub const SESSION_COOKIE: &str = "feedback_session";

/// Most sessions kept at once. Past this, creating a session evicts the oldest one.
pub const MAX_SESSIONS: usize = 1024;

/// Server-side sessions keyed by a random id. The id travels in a signed cookie; a cookie whose
/// signature does not match is treated as absent.
#[derive(Clone)]
pub struct SessionStore {
    secret: Arc<[u8]>,
    capacity: usize,
    sessions: Arc<RwLock<Sessions>>,
}

#[derive(Default)]
struct Sessions {
    entries: HashMap<Uuid, StoredSession>,
    next_seq: u64,
}

struct StoredSession {
    session: AdminSession,
    // Creation order, for eviction.
    seq: u64,
}

impl SessionStore {
    pub fn new(secret: &str) -> Self {
        Self::with_capacity(secret, MAX_SESSIONS)
    }

    pub fn with_capacity(secret: &str, capacity: usize) -> Self {
        Self {
            secret: Arc::from(secret.as_bytes()),
            capacity: capacity.max(1),
            sessions: Arc::new(RwLock::new(Sessions::default())),
        }
    }

    /// Stores `session` under a fresh id and returns the `Set-Cookie` value carrying it.
    pub async fn create(&self, session: AdminSession) -> String {
        let id = Uuid::new_v4();
        {
            let mut sessions = self.sessions.write().await;
            while sessions.entries.len() >= self.capacity {
                let oldest = sessions
                    .entries
                    .iter()
                    .min_by_key(|(_, stored)| stored.seq)
                    .map(|(id, _)| *id);
                match oldest {
                    Some(oldest) => {
                        sessions.entries.remove(&oldest);
                    }
                    None => break,
                }
            }
            let seq = sessions.next_seq;
            sessions.next_seq += 1;
            sessions.entries.insert(id, StoredSession { session, seq });
        }
        format!(
            "{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Strict",
            self.sign(id)
        )
    }

    pub async fn load(&self, headers: &HeaderMap) -> Option<AdminSession> {
        let id = self.session_id(headers)?;
        let sessions = self.sessions.read().await;
        sessions.entries.get(&id).map(|stored| stored.session)
    }

    /// Removes the request's session from the store, returning it if there was one.
    pub async fn take(&self, headers: &HeaderMap) -> Option<AdminSession> {
        let id = self.session_id(headers)?;
        let mut sessions = self.sessions.write().await;
        sessions.entries.remove(&id).map(|stored| stored.session)
    }

    pub fn expired_cookie() -> String {
        format!("{SESSION_COOKIE}=; Max-Age=0; Path=/; HttpOnly; SameSite=Strict")
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.sessions.read().await.entries.len()
    }

    #[cfg(test)]
    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn session_id(&self, headers: &HeaderMap) -> Option<Uuid> {
        let value = cookie_value(headers, SESSION_COOKIE)?;
        self.verify(&value)
    }

    fn sign(&self, id: Uuid) -> String {
        let mut mac = self.mac();
        mac.update(id.as_bytes());
        let sig = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        format!("{}.{}", id.simple(), sig)
    }

    fn verify(&self, value: &str) -> Option<Uuid> {
        let (id_part, sig_part) = value.split_once('.')?;
        let id = Uuid::try_parse(id_part).ok()?;
        let expected = URL_SAFE_NO_PAD.decode(sig_part).ok()?;

        let mut mac = self.mac();
        mac.update(id.as_bytes());
        mac.verify_slice(&expected).ok()?;
        Some(id)
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.secret).expect("HMAC can take key of any size")
    }
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    for cookie_header in headers.get_all(header::COOKIE) {
        if let Ok(cookie_str) = cookie_header.to_str() {
            for cookie in cookie_str.split(';') {
                let cookie = cookie.trim();
                if let Some(value) = cookie.strip_prefix(&prefix) {
                    return Some(value.to_string());
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    // Turns a Set-Cookie value into the Cookie header a browser would send back.
    fn request_headers(set_cookie: &str) -> HeaderMap {
        let pair = set_cookie.split(';').next().unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(pair).unwrap());
        headers
    }

    #[tokio::test]
    async fn test_create_and_load() {
        let store = SessionStore::new("signing-key");
        let cookie = store.create(AdminSession { admin: true }).await;
        assert!(cookie.starts_with("feedback_session="));
        assert!(cookie.contains("HttpOnly"));

        let session = store.load(&request_headers(&cookie)).await;
        assert_eq!(session, Some(AdminSession { admin: true }));
    }

    #[tokio::test]
    async fn test_missing_cookie() {
        let store = SessionStore::new("signing-key");
        store.create(AdminSession { admin: true }).await;

        assert_eq!(store.load(&HeaderMap::new()).await, None);
    }

    #[tokio::test]
    async fn test_cookie_among_others() {
        let store = SessionStore::new("signing-key");
        let cookie = store.create(AdminSession { admin: true }).await;
        let pair = cookie.split(';').next().unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("theme=dark; {pair}; lang=en")).unwrap(),
        );
        assert!(store.load(&headers).await.is_some());
    }

    #[tokio::test]
    async fn test_tampered_signature_rejected() {
        let store = SessionStore::new("signing-key");
        let cookie = store.create(AdminSession { admin: true }).await;
        let pair = cookie.split(';').next().unwrap();
        let (id, _sig) = pair.split_once('.').unwrap();

        let forged = format!("{id}.AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA");
        assert_eq!(store.load(&request_headers(&forged)).await, None);

        let unsigned = id.to_string();
        assert_eq!(store.load(&request_headers(&unsigned)).await, None);
    }

    #[tokio::test]
    async fn test_cookie_from_other_secret_rejected() {
        let other = SessionStore::new("other-key");
        let store = SessionStore::new("signing-key");
        let cookie = other.create(AdminSession { admin: true }).await;

        assert_eq!(store.load(&request_headers(&cookie)).await, None);
    }

    #[tokio::test]
    async fn test_take_removes_session() {
        let store = SessionStore::new("signing-key");
        let cookie = store.create(AdminSession { admin: true }).await;
        let headers = request_headers(&cookie);

        assert_eq!(store.take(&headers).await, Some(AdminSession { admin: true }));
        assert!(store.is_empty().await);
        assert_eq!(store.load(&headers).await, None);
        assert_eq!(store.take(&headers).await, None);
    }

    #[tokio::test]
    async fn test_sessions_are_per_client() {
        let store = SessionStore::new("signing-key");
        let first = store.create(AdminSession { admin: true }).await;
        let second = store.create(AdminSession { admin: true }).await;
        assert_ne!(first, second);
        assert_eq!(store.len().await, 2);

        store.take(&request_headers(&first)).await;
        assert!(store.load(&request_headers(&second)).await.is_some());
    }

    #[tokio::test]
    async fn test_oldest_session_evicted_at_capacity() {
        let store = SessionStore::with_capacity("signing-key", 2);
        let first = store.create(AdminSession { admin: true }).await;
        let second = store.create(AdminSession { admin: true }).await;
        let third = store.create(AdminSession { admin: true }).await;

        assert_eq!(store.len().await, 2);
        assert_eq!(store.load(&request_headers(&first)).await, None);
        assert!(store.load(&request_headers(&second)).await.is_some());
        assert!(store.load(&request_headers(&third)).await.is_some());
    }

    #[tokio::test]
    async fn test_store_stays_bounded() {
        let store = SessionStore::with_capacity("signing-key", 8);
        for _ in 0..99 {
            store.create(AdminSession { admin: true }).await;
        }
        let last = store.create(AdminSession { admin: true }).await;

        assert_eq!(store.len().await, 8);
        assert!(store.load(&request_headers(&last)).await.is_some());
    }

    #[test]
    fn test_expired_cookie() {
        let cookie = SessionStore::expired_cookie();
        assert!(cookie.starts_with("feedback_session=;"));
        assert!(cookie.contains("Max-Age=0"));
    }
}
