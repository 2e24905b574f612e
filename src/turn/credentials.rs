use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha1::Sha1;

use crate::utils::{Error, Result};

/// A short-lived TURN REST credential.
///
/// Field order is the serialised key order: `username, password, ttl, uris`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnCredentials {
    pub username: String,
    pub password: String,
    pub ttl: i64,
    pub uris: Vec<String>,
}

impl TurnCredentials {
    /// Builds credentials that expire `ttl` seconds after `now`.
    pub fn generate(
        now: i64,
        ttl: i64,
        separator: &str,
        username: Option<&str>,
        secret: &str,
        uris: &[String],
    ) -> Result<Self> {
        let expires = now.checked_add(ttl).ok_or_else(|| {
            Error::Expiry(format!(
                "ttl {}s overflows the expiry of a credential issued at {}",
                ttl, now
            ))
        })?;
        let username = turn_username(expires, separator, username);
        let password = turn_password(secret, &username);

        Ok(TurnCredentials {
            username,
            password,
            ttl,
            uris: uris.to_vec(),
        })
    }
}

/// `<expires>` or `<expires><separator><username>`; an empty username counts as absent.
pub fn turn_username(expires: i64, separator: &str, username: Option<&str>) -> String {
    match username {
        Some(name) if !name.is_empty() => format!("{}{}{}", expires, separator, name),
        _ => expires.to_string(),
    }
}

/// Base64 (standard, padded) HMAC-SHA1 of `username` keyed by `secret`.
pub fn turn_password(secret: &str, username: &str) -> String {
    // SAFETY: HMAC's new_from_slice always returns Ok - it handles any key length
    let mut mac = Hmac::<Sha1>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(username.as_bytes());
    STANDARD.encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_with_name() {
        assert_eq!(turn_username(1600, ":", Some("alice")), "1600:alice");
        assert_eq!(turn_username(1600, "|", Some("alice")), "1600|alice");
    }

    #[test]
    fn username_without_name_has_no_separator() {
        assert_eq!(turn_username(1600, ":", None), "1600");
        assert_eq!(turn_username(1600, ":", Some("")), "1600");
    }

    #[test]
    fn password_matches_known_digest() {
        assert_eq!(
            turn_password("s3cret", "1600:alice"),
            "YxC+nxqXg+YHLUm6U5r5bqiWs3k="
        );
        assert_eq!(
            turn_password("s3cret", "1600"),
            "hX+7Aj4PD4v87Lnw/JQ61b7r6UA="
        );
    }

    #[test]
    fn generate_echoes_ttl_not_expiry() {
        let uris = vec!["turn:turn.example.com:3478".to_string()];
        let creds =
            TurnCredentials::generate(1000, 600, ":", Some("alice"), "s3cret", &uris).unwrap();

        assert_eq!(creds.username, "1600:alice");
        assert_eq!(creds.password, "YxC+nxqXg+YHLUm6U5r5bqiWs3k=");
        assert_eq!(creds.ttl, 600);
        assert_eq!(creds.uris, uris);
    }

    #[test]
    fn overflowing_expiry_is_an_error() {
        let err = TurnCredentials::generate(1000, i64::MAX, ":", Some("alice"), "s3cret", &[])
            .unwrap_err();
        assert!(matches!(err, Error::Expiry(_)));

        let err = TurnCredentials::generate(-1000, i64::MIN, ":", None, "s3cret", &[]).unwrap_err();
        assert!(matches!(err, Error::Expiry(_)));
    }

    #[test]
    fn long_secret_is_hashed_not_rejected() {
        let secret = "k".repeat(200);
        assert_eq!(turn_password(&secret, "1600").len(), 28);
    }

    #[test]
    fn serialises_in_field_order() {
        let creds = TurnCredentials::generate(1000, 600, ":", None, "s3cret", &[]).unwrap();
        let json = serde_json::to_string(&creds).unwrap();
        assert_eq!(
            json,
            r#"{"username":"1600","password":"hX+7Aj4PD4v87Lnw/JQ61b7r6UA=","ttl":600,"uris":[]}"#
        );
    }
}
