use std::fmt;
use std::sync::Arc;

use crate::utils::{Error, Result};

/// 24 hours.
pub const DEFAULT_TTL: i64 = 86400;
pub const DEFAULT_SEPARATOR: &str = ":";

/// Yields the current shared secret. Invoked once per issued credential.
pub type SecretFn = Arc<dyn Fn() -> Result<String> + Send + Sync>;

/// Decides whether a request's `key` parameter is authorized.
pub type KeyCheckFn = Arc<dyn Fn(Option<&str>) -> bool + Send + Sync>;

#[derive(Clone)]
pub enum SharedSecret {
    Static(String),
    /// Resolved at issuance time, for rotating secrets.
    Dynamic(SecretFn),
}

impl SharedSecret {
    pub fn dynamic<F>(provider: F) -> Self
    where
        F: Fn() -> Result<String> + Send + Sync + 'static,
    {
        SharedSecret::Dynamic(Arc::new(provider))
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SharedSecret::Static(_) => f.write_str("SharedSecret::Static(<redacted>)"),
            SharedSecret::Dynamic(_) => f.write_str("SharedSecret::Dynamic(<fn>)"),
        }
    }
}

impl From<&str> for SharedSecret {
    fn from(secret: &str) -> Self {
        SharedSecret::Static(secret.to_string())
    }
}

impl From<String> for SharedSecret {
    fn from(secret: String) -> Self {
        SharedSecret::Static(secret)
    }
}

#[derive(Clone)]
pub enum ApiKey {
    Single(String),
    AnyOf(Vec<String>),
    Check(KeyCheckFn),
}

impl ApiKey {
    pub fn check<F>(predicate: F) -> Self
    where
        F: Fn(Option<&str>) -> bool + Send + Sync + 'static,
    {
        ApiKey::Check(Arc::new(predicate))
    }

    fn into_check(self) -> KeyCheckFn {
        match self {
            ApiKey::Check(predicate) => predicate,
            ApiKey::AnyOf(keys) => Arc::new(move |key: Option<&str>| {
                key.map_or(false, |k| keys.iter().any(|valid| valid == k))
            }),
            ApiKey::Single(expected) => {
                Arc::new(move |key: Option<&str>| key == Some(expected.as_str()))
            }
        }
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiKey::Single(_) => f.write_str("ApiKey::Single(<redacted>)"),
            ApiKey::AnyOf(keys) => write!(f, "ApiKey::AnyOf(<{} keys>)", keys.len()),
            ApiKey::Check(_) => f.write_str("ApiKey::Check(<fn>)"),
        }
    }
}

impl From<&str> for ApiKey {
    fn from(key: &str) -> Self {
        ApiKey::Single(key.to_string())
    }
}

impl From<Vec<String>> for ApiKey {
    fn from(keys: Vec<String>) -> Self {
        ApiKey::AnyOf(keys)
    }
}

/// Raw construction-time options of the credentials handler.
#[derive(Debug, Clone, Default)]
pub struct TurnCredentialsOptions {
    pub shared_secret: Option<SharedSecret>,
    pub require_service_query: bool,
    pub separator: Option<String>,
    pub ttl: Option<i64>,
    pub uris: Option<Vec<String>>,
    pub api_key: Option<ApiKey>,
}

impl TurnCredentialsOptions {
    pub fn new(shared_secret: impl Into<SharedSecret>) -> Self {
        Self {
            shared_secret: Some(shared_secret.into()),
            ..Default::default()
        }
    }

    pub fn require_service_query(mut self, require: bool) -> Self {
        self.require_service_query = require;
        self
    }

    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = Some(separator.into());
        self
    }

    pub fn ttl(mut self, ttl: i64) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn uris(mut self, uris: Vec<String>) -> Self {
        self.uris = Some(uris);
        self
    }

    pub fn api_key(mut self, api_key: impl Into<ApiKey>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Applies defaults and turns the secret and api key options into callables.
    pub fn resolve(self) -> Result<ResolvedOptions> {
        let secret: SecretFn = match self.shared_secret {
            Some(SharedSecret::Dynamic(provider)) => provider,
            Some(SharedSecret::Static(secret)) if !secret.is_empty() => {
                Arc::new(move || Ok(secret.clone()))
            }
            _ => {
                return Err(Error::Config(
                    "No shared secret provided for TURN credentials REST API".to_string(),
                ))
            }
        };

        let separator = match self.separator {
            Some(separator) if !separator.is_empty() => separator,
            _ => DEFAULT_SEPARATOR.to_string(),
        };

        Ok(ResolvedOptions {
            secret,
            key_check: self.api_key.map(ApiKey::into_check),
            require_service_query: self.require_service_query,
            separator,
            ttl: self.ttl.unwrap_or(DEFAULT_TTL),
            uris: self.uris.unwrap_or_default(),
        })
    }
}

/// Options in the uniform form read on every request.
#[derive(Clone)]
pub struct ResolvedOptions {
    pub secret: SecretFn,
    /// `None` skips the authorization check entirely.
    pub key_check: Option<KeyCheckFn>,
    pub require_service_query: bool,
    pub separator: String,
    pub ttl: i64,
    pub uris: Vec<String>,
}

impl fmt::Debug for ResolvedOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedOptions")
            .field("key_check", &self.key_check.is_some())
            .field("require_service_query", &self.require_service_query)
            .field("separator", &self.separator)
            .field("ttl", &self.ttl)
            .field("uris", &self.uris)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn missing_secret_is_config_error() {
        let err = TurnCredentialsOptions::default().resolve().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn empty_secret_is_config_error() {
        let err = TurnCredentialsOptions::new("").resolve().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn defaults_applied() {
        let resolved = TurnCredentialsOptions::new("s3cret")
            .separator("")
            .resolve()
            .unwrap();

        assert_eq!(resolved.separator, ":");
        assert_eq!(resolved.ttl, DEFAULT_TTL);
        assert!(resolved.uris.is_empty());
        assert!(resolved.key_check.is_none());
        assert!(!resolved.require_service_query);
        assert_eq!((resolved.secret)().unwrap(), "s3cret");
    }

    #[test]
    fn negative_ttl_kept() {
        let resolved = TurnCredentialsOptions::new("s3cret").ttl(-5).resolve().unwrap();
        assert_eq!(resolved.ttl, -5);
    }

    #[test]
    fn dynamic_secret_called_each_time() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let resolved = TurnCredentialsOptions::new(SharedSecret::dynamic(move || {
            Ok(format!("secret-{}", counter.fetch_add(1, Ordering::SeqCst)))
        }))
        .resolve()
        .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!((resolved.secret)().unwrap(), "secret-0");
        assert_eq!((resolved.secret)().unwrap(), "secret-1");
    }

    #[test]
    fn single_key_check() {
        let check = TurnCredentialsOptions::new("s")
            .api_key("k1")
            .resolve()
            .unwrap()
            .key_check
            .unwrap();

        assert!(check(Some("k1")));
        assert!(!check(Some("k2")));
        assert!(!check(None));
    }

    #[test]
    fn key_set_check() {
        let check = TurnCredentialsOptions::new("s")
            .api_key(keys(&["a", "b"]))
            .resolve()
            .unwrap()
            .key_check
            .unwrap();

        assert!(check(Some("a")));
        assert!(check(Some("b")));
        assert!(!check(Some("c")));
        assert!(!check(None));
    }

    #[test]
    fn custom_key_check() {
        let check = TurnCredentialsOptions::new("s")
            .api_key(ApiKey::check(|key| key.map_or(false, |k| k.starts_with("team-"))))
            .resolve()
            .unwrap()
            .key_check
            .unwrap();

        assert!(check(Some("team-red")));
        assert!(!check(Some("red")));
    }

    #[test]
    fn debug_redacts_secrets() {
        let options = TurnCredentialsOptions::new("s3cret").api_key("k1");
        let printed = format!("{:?}", options);
        assert!(!printed.contains("s3cret"));
        assert!(!printed.contains("k1"));
    }
}
