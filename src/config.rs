use crate::turn::{ApiKey, SharedSecret, TurnCredentialsOptions};
use crate::utils::Error;
use log::warn;
use std::env;
use std::fs;
use std::path::PathBuf;

#[derive(Clone)]
pub struct ServerConfig {
    pub bind_address: String,
    pub http_port: u16,
    pub credentials_path: String,
    pub shared_secret: Option<String>,
    /// Re-read on every issuance; takes precedence over `shared_secret`.
    pub secret_file: Option<PathBuf>,
    pub require_service_query: bool,
    pub separator: Option<String>,
    pub ttl: Option<i64>,
    pub uris: Vec<String>,
    pub api_keys: Vec<String>,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            bind_address: lookup("HTTP_BIND_ADDRESS")
                .unwrap_or_else(|| "0.0.0.0".to_string()),
            http_port: lookup("HTTP_PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            credentials_path: lookup("CREDENTIALS_PATH")
                .unwrap_or_else(|| "credentials".to_string()),
            shared_secret: lookup("TURN_SHARED_SECRET"),
            secret_file: lookup("TURN_SECRET_FILE").map(PathBuf::from),
            require_service_query: lookup("TURN_REQUIRE_SERVICE_QUERY")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
            separator: lookup("TURN_SEPARATOR"),
            ttl: lookup("TURN_TTL").and_then(|v| parse_ttl(&v)),
            uris: lookup("TURN_URIS").map(|v| split_list(&v)).unwrap_or_default(),
            api_keys: lookup("TURN_API_KEYS").map(|v| split_list(&v)).unwrap_or_default(),
        }
    }

    pub fn credentials_options(&self) -> TurnCredentialsOptions {
        let shared_secret = match (&self.secret_file, &self.shared_secret) {
            (Some(path), _) => Some(file_secret(path.clone())),
            (None, Some(secret)) => Some(SharedSecret::Static(secret.clone())),
            (None, None) => None,
        };

        let api_key = match self.api_keys.as_slice() {
            [] => None,
            [key] => Some(ApiKey::Single(key.clone())),
            keys => Some(ApiKey::AnyOf(keys.to_vec())),
        };

        TurnCredentialsOptions {
            shared_secret,
            require_service_query: self.require_service_query,
            separator: self.separator.clone(),
            ttl: self.ttl,
            uris: Some(self.uris.clone()),
            api_key,
        }
    }
}

fn file_secret(path: PathBuf) -> SharedSecret {
    SharedSecret::dynamic(move || {
        let secret = fs::read_to_string(&path)?.trim().to_string();
        if secret.is_empty() {
            return Err(Error::Secret(format!("{} is empty", path.display())));
        }
        Ok(secret)
    })
}

/// An unparsable ttl falls back to the default.
fn parse_ttl(raw: &str) -> Option<i64> {
    match raw.trim().parse::<i64>() {
        Ok(ttl) => Some(ttl),
        Err(e) => {
            warn!("Ignoring invalid TURN_TTL {:?}: {}", raw, e);
            None
        }
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
