pub mod credentials;
pub mod handler;
pub mod options;

pub use credentials::{turn_password, turn_username, TurnCredentials};
pub use handler::{CredentialQuery, CredentialResponse, Outcome, TurnCredentialsHandler, TURN_SERVICE};
pub use options::{ApiKey, ResolvedOptions, SharedSecret, TurnCredentialsOptions, DEFAULT_TTL};
