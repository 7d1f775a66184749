//! Persisted locale preference: a small get/set string port.
//!
//! The resolver only ever reads [`PREFERENCE_KEY`]. Writes happen when a
//! user explicitly picks a locale.

use std::collections::HashMap;

use axum::http::{header::COOKIE, HeaderMap, HeaderValue};

/// Storage key for the saved locale choice.
pub const PREFERENCE_KEY: &str = "app-locale";

/// One year.
const COOKIE_MAX_AGE_SECS: u64 = 60 * 60 * 24 * 365;

/// Durable key-value store with string semantics.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

/// In-process store, used outside a request context and in tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferenceStore {
    values: HashMap<String, String>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }
}

/// Cookie-backed store for a single HTTP exchange.
///
/// Reads come from the request's `Cookie` headers. Writes update the view and
/// queue a `Set-Cookie` value for the response.
#[derive(Debug, Clone, Default)]
pub struct CookiePreferenceStore {
    cookies: HashMap<String, String>,
    pending: Vec<String>,
}

impl CookiePreferenceStore {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut cookies = HashMap::new();

        for value in headers.get_all(COOKIE) {
            let Ok(value) = value.to_str() else {
                continue;
            };
            for pair in value.split(';') {
                if let Some((name, val)) = pair.trim().split_once('=') {
                    // First occurrence wins.
                    cookies
                        .entry(name.trim().to_string())
                        .or_insert_with(|| val.trim().trim_matches('"').to_string());
                }
            }
        }

        Self {
            cookies,
            pending: Vec::new(),
        }
    }

    /// `Set-Cookie` header values queued by [`PreferenceStore::set`].
    pub fn set_cookie_headers(&self) -> Vec<HeaderValue> {
        self.pending
            .iter()
            .filter_map(|cookie| HeaderValue::from_str(cookie).ok())
            .collect()
    }
}

impl PreferenceStore for CookiePreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        self.cookies.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.cookies.insert(key.to_string(), value.to_string());
        self.pending.push(format!(
            "{key}={value}; Path=/; Max-Age={COOKIE_MAX_AGE_SECS}; SameSite=Lax"
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryPreferenceStore::new();
        assert_eq!(store.get(PREFERENCE_KEY), None);

        store.set(PREFERENCE_KEY, "ko");
        assert_eq!(store.get(PREFERENCE_KEY), Some("ko".to_string()));

        store.set(PREFERENCE_KEY, "zh-Hant");
        assert_eq!(store.get(PREFERENCE_KEY), Some("zh-Hant".to_string()));
    }

    #[test]
    fn test_cookie_store_reads_preference() {
        let store = CookiePreferenceStore::from_headers(&headers_with_cookie(
            "session=abc; app-locale=zh-Hant; theme=dark",
        ));
        assert_eq!(store.get(PREFERENCE_KEY), Some("zh-Hant".to_string()));
        assert_eq!(store.get("theme"), Some("dark".to_string()));
    }

    #[test]
    fn test_cookie_store_keeps_value_verbatim() {
        let store = CookiePreferenceStore::from_headers(&headers_with_cookie("app-locale=ZH-hant"));
        assert_eq!(store.get(PREFERENCE_KEY), Some("ZH-hant".to_string()));
    }

    #[test]
    fn test_cookie_store_missing_header() {
        let store = CookiePreferenceStore::from_headers(&HeaderMap::new());
        assert_eq!(store.get(PREFERENCE_KEY), None);
        assert!(store.set_cookie_headers().is_empty());
    }

    #[test]
    fn test_cookie_store_ignores_malformed_pairs() {
        let store = CookiePreferenceStore::from_headers(&headers_with_cookie("garbage; app-locale=ko"));
        assert_eq!(store.get(PREFERENCE_KEY), Some("ko".to_string()));
        assert_eq!(store.get("garbage"), None);
    }

    #[test]
    fn test_cookie_store_set_queues_header() {
        let mut store = CookiePreferenceStore::default();
        store.set(PREFERENCE_KEY, "ko");

        assert_eq!(store.get(PREFERENCE_KEY), Some("ko".to_string()));
        let headers = store.set_cookie_headers();
        assert_eq!(headers.len(), 1);
        let cookie = headers[0].to_str().unwrap();
        assert!(cookie.starts_with("app-locale=ko;"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("SameSite=Lax"));
    }
}
