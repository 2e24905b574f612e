use std::error::Error as StdError;
use std::fmt;
use std::net::AddrParseError;

#[derive(Debug)]
pub enum Error {
    /// The issuer cannot be built from the supplied options.
    Config(String),
    /// The shared secret provider failed to yield a secret.
    Secret(String),
    /// `now + ttl` does not fit the expiry timestamp.
    Expiry(String),
    Json(serde_json::Error),
    IO(std::io::Error),
    AddrParse(AddrParseError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Secret(e) => write!(f, "Shared secret error: {}", e),
            Error::Expiry(e) => write!(f, "Expiry error: {}", e),
            Error::Json(e) => write!(f, "JSON error: {}", e),
            Error::IO(e) => write!(f, "IO error: {}", e),
            Error::AddrParse(e) => write!(f, "Address parse error: {}", e),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Json(e) => Some(e),
            Error::IO(e) => Some(e),
            Error::AddrParse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::Json(error)
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::IO(error)
    }
}

impl From<AddrParseError> for Error {
    fn from(error: AddrParseError) -> Self {
        Error::AddrParse(error)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
