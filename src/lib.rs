pub mod config;
pub mod server;
pub mod turn;
pub mod utils;

// Re-export main types for convenience
pub use config::ServerConfig;
pub use turn::{CredentialQuery, Outcome, TurnCredentials, TurnCredentialsHandler, TurnCredentialsOptions};
