use log::debug;
use std::collections::HashMap;
use warp::http::StatusCode;

use crate::turn::credentials::TurnCredentials;
use crate::turn::options::{ResolvedOptions, TurnCredentialsOptions};
use crate::utils::{Error, Result};

/// The only `service` value accepted when the service query is required.
pub const TURN_SERVICE: &str = "turn";

/// Query parameters of a credentials request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialQuery {
    pub service: Option<String>,
    pub username: Option<String>,
    pub key: Option<String>,
}

impl From<HashMap<String, String>> for CredentialQuery {
    fn from(mut params: HashMap<String, String>) -> Self {
        CredentialQuery {
            service: params.remove("service"),
            username: params.remove("username"),
            key: params.remove("key"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialResponse {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: String,
}

impl CredentialResponse {
    fn json(credentials: &TurnCredentials) -> Result<Self> {
        Ok(CredentialResponse {
            status: StatusCode::OK,
            content_type: "application/json",
            body: serde_json::to_string(credentials)?,
        })
    }
}

#[derive(Debug)]
pub enum Outcome {
    Handled(CredentialResponse),
    /// The request is left for the next handler in the chain.
    NotHandled,
    Failed(Error),
}

/// Issues TURN REST credentials signed with a shared secret.
#[derive(Debug, Clone)]
pub struct TurnCredentialsHandler {
    options: ResolvedOptions,
}

impl TurnCredentialsHandler {
    pub fn new(options: TurnCredentialsOptions) -> Result<Self> {
        let options = options.resolve()?;
        debug!(
            "TURN credentials handler ready (ttl={}s, uris={}, api key check={})",
            options.ttl,
            options.uris.len(),
            options.key_check.is_some()
        );
        Ok(Self { options })
    }

    pub fn options(&self) -> &ResolvedOptions {
        &self.options
    }

    pub fn handle(&self, query: &CredentialQuery) -> Outcome {
        self.handle_at(query, chrono::Utc::now().timestamp())
    }

    /// Same as [`handle`](Self::handle) with the clock fixed at `now` (seconds since epoch).
    pub fn handle_at(&self, query: &CredentialQuery, now: i64) -> Outcome {
        if !self.accepts(query) {
            return Outcome::NotHandled;
        }

        match self.issue(query, now).and_then(|creds| CredentialResponse::json(&creds)) {
            Ok(response) => Outcome::Handled(response),
            Err(e) => Outcome::Failed(e),
        }
    }

    /// Service gate first, then the api key gate.
    fn accepts(&self, query: &CredentialQuery) -> bool {
        if self.options.require_service_query
            && query.service.as_deref() != Some(TURN_SERVICE)
        {
            debug!("Passing on request: service query is not '{}'", TURN_SERVICE);
            return false;
        }

        if let Some(check) = &self.options.key_check {
            if !check(query.key.as_deref()) {
                debug!("Passing on request: api key rejected");
                return false;
            }
        }

        true
    }

    fn issue(&self, query: &CredentialQuery, now: i64) -> Result<TurnCredentials> {
        let secret = (self.options.secret)()?;
        let creds = TurnCredentials::generate(
            now,
            self.options.ttl,
            &self.options.separator,
            query.username.as_deref(),
            &secret,
            &self.options.uris,
        )?;
        debug!("Issued TURN credentials for {}", creds.username);
        Ok(creds)
    }
}
