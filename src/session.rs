//! # Session storage
//!
//! Cookie accessors and session-scoped key/value caching. The cache is an
//! explicit object with an injected storage backend, constructed once per
//! page session and handed to collaborators; nothing reaches for an ambient
//! global.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use chrono::{DateTime, Duration, Utc};
use tracing::warn;

use crate::auth::UserDetails;

pub const AUTH_TOKEN_CACHE: &str = "auth_token_cache";
pub const USER_DETAILS_CACHE: &str = "user_details_cache";
pub const AUTH_BLOB: &str = "auth";

struct Cookie {
    name: String,
    value: String,
    expires: Option<DateTime<Utc>>,
    path: String,
}

impl Cookie {
    fn expired(&self, now: DateTime<Utc>) -> bool {
        self.expires.is_some_and(|at| at <= now)
    }
}

/// `name=value` cookie pairs with optional day-based expiry, `path=/`
/// scoping. Expired cookies are never returned.
#[derive(Default)]
pub struct CookieJar {
    cookies: Vec<Cookie>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `a=1; b=2` cookie header line.
    pub fn parse(header: &str) -> Self {
        let cookies = header
            .split(';')
            .filter_map(|pair| {
                let (name, value) = pair.trim().split_once('=')?;
                Some(Cookie {
                    name: name.to_string(),
                    value: value.to_string(),
                    expires: None,
                    path: "/".to_string(),
                })
            })
            .collect();

        Self { cookies }
    }

    pub fn set(&mut self, name: &str, value: &str, days: Option<i64>) {
        let expires = days.map(|days| Utc::now() + Duration::days(days));

        self.cookies.retain(|cookie| cookie.name != name);
        self.cookies.push(Cookie {
            name: name.to_string(),
            value: value.to_string(),
            expires,
            path: "/".to_string(),
        });
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        let now = Utc::now();

        self.cookies
            .iter()
            .find(|cookie| cookie.name == name && !cookie.expired(now))
            .map(|cookie| cookie.value.as_str())
    }

    /// Expire the cookie immediately and drop it from the jar, along with
    /// any other entry that has already lapsed.
    pub fn delete(&mut self, name: &str) {
        let now = Utc::now();
        self.cookies
            .retain(|cookie| cookie.name != name && !cookie.expired(now));
    }

    /// Serialize the live cookies back to a `a=1; b=2` header line.
    pub fn header(&self) -> String {
        let now = Utc::now();

        self.cookies
            .iter()
            .filter(|cookie| !cookie.expired(now))
            .map(|cookie| format!("{}={}", cookie.name, cookie.value))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// The full `Set-Cookie` form for one cookie.
    pub fn set_cookie_line(&self, name: &str) -> Option<String> {
        let cookie = self.cookies.iter().find(|cookie| cookie.name == name)?;

        let mut line = format!("{}={}", cookie.name, cookie.value);
        if let Some(expires) = cookie.expires {
            line.push_str(&format!("; expires={}", expires.to_rfc2822()));
        }
        line.push_str(&format!("; path={}", cookie.path));

        Some(line)
    }
}

/// Session-scoped key/value storage, cleared when the session ends.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.values.lock().unwrap().remove(key);
    }
}

/// Typed view over a [`SessionStore`] for the auth/profile entries.
#[derive(Clone)]
pub struct SessionCache {
    store: Arc<dyn SessionStore>,
}

impl SessionCache {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// The cached token in `Bearer <token>` form.
    pub fn auth_token(&self) -> Option<String> {
        self.store.get(AUTH_TOKEN_CACHE)
    }

    pub fn user_details(&self) -> Option<UserDetails> {
        let raw = self.store.get(USER_DETAILS_CACHE)?;

        match serde_json::from_str(&raw) {
            Ok(details) => Some(details),
            Err(e) => {
                warn!("Discarding unreadable {USER_DETAILS_CACHE} entry: {e}");
                None
            }
        }
    }

    /// Store both the bearer token and the full profile.
    pub fn set_auth(&self, details: &UserDetails) {
        self.store
            .set(AUTH_TOKEN_CACHE, &format!("Bearer {}", details.token));

        match serde_json::to_string(details) {
            Ok(raw) => self.store.set(USER_DETAILS_CACHE, &raw),
            Err(e) => warn!("Could not serialize user details: {e}"),
        }
    }

    pub fn auth_blob(&self) -> Option<String> {
        self.store.get(AUTH_BLOB).filter(|blob| !blob.is_empty())
    }

    pub fn set_auth_blob(&self, details: &UserDetails) {
        match serde_json::to_string(details) {
            Ok(raw) => self.store.set(AUTH_BLOB, &raw),
            Err(e) => warn!("Could not serialize auth blob: {e}"),
        }
    }

    pub fn clear(&self) {
        self.store.remove(AUTH_TOKEN_CACHE);
        self.store.remove(USER_DETAILS_CACHE);
        self.store.remove(AUTH_BLOB);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details() -> UserDetails {
        UserDetails {
            token: "abc123".to_string(),
            name: "sky".to_string(),
            email: "sky@example.com".to_string(),
            super_admin: false,
        }
    }

    #[test]
    fn test_cookie_round_trip() {
        let mut jar = CookieJar::new();
        jar.set("k", "v", Some(1));
        assert_eq!(jar.get("k"), Some("v"));

        jar.delete("k");
        assert_eq!(jar.get("k"), None);
    }

    #[test]
    fn test_delete_purges_entries() {
        let mut jar = CookieJar::new();
        for _ in 0..3 {
            jar.set("k", "v", Some(1));
            jar.delete("k");
        }

        assert_eq!(jar.get("k"), None);
        assert_eq!(jar.header(), "");
        assert_eq!(jar.set_cookie_line("k"), None);
    }

    #[test]
    fn test_cookie_without_expiry() {
        let mut jar = CookieJar::new();
        jar.set("session", "tok", None);
        assert_eq!(jar.get("session"), Some("tok"));
        assert_eq!(jar.header(), "session=tok");
    }

    #[test]
    fn test_cookie_overwrite() {
        let mut jar = CookieJar::new();
        jar.set("k", "old", None);
        jar.set("k", "new", Some(7));
        assert_eq!(jar.get("k"), Some("new"));
        assert_eq!(jar.header(), "k=new");
    }

    #[test]
    fn test_cookie_parse() {
        let jar = CookieJar::parse("a=1; b=2;c=3");
        assert_eq!(jar.get("a"), Some("1"));
        assert_eq!(jar.get("b"), Some("2"));
        assert_eq!(jar.get("c"), Some("3"));
        assert_eq!(jar.get("d"), None);
    }

    #[test]
    fn test_set_cookie_line() {
        let mut jar = CookieJar::new();
        jar.set("k", "v", None);
        assert_eq!(jar.set_cookie_line("k"), Some("k=v; path=/".to_string()));

        jar.set("e", "x", Some(1));
        let line = jar.set_cookie_line("e").unwrap();
        assert!(line.starts_with("e=x; expires="));
        assert!(line.ends_with("; path=/"));
    }

    #[test]
    fn test_session_cache_round_trip() {
        let cache = SessionCache::new(Arc::new(MemoryStore::new()));
        assert!(cache.auth_token().is_none());
        assert!(cache.user_details().is_none());

        cache.set_auth(&details());
        assert_eq!(cache.auth_token(), Some("Bearer abc123".to_string()));
        assert_eq!(cache.user_details().unwrap().name, "sky");

        cache.clear();
        assert!(cache.auth_token().is_none());
    }

    #[test]
    fn test_auth_blob_empty_is_absent() {
        let store = Arc::new(MemoryStore::new());
        let cache = SessionCache::new(store.clone());

        assert!(cache.auth_blob().is_none());
        store.set(AUTH_BLOB, "");
        assert!(cache.auth_blob().is_none());

        cache.set_auth_blob(&details());
        assert!(cache.auth_blob().is_some());
    }

    #[test]
    fn test_corrupt_user_details_discarded() {
        let store = Arc::new(MemoryStore::new());
        store.set(USER_DETAILS_CACHE, "not json");

        let cache = SessionCache::new(store);
        assert!(cache.user_details().is_none());
    }
}
