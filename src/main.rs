use anyhow::{Context, Result};
use clap::{Arg, Command};
use log::info;
use std::sync::Arc;
use turn_credentials::{server, ServerConfig, TurnCredentialsHandler};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let matches = Command::new("turn-credentials")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Issues short-lived TURN REST credentials signed with a shared secret")
        .arg(
            Arg::new("bind")
                .long("bind")
                .takes_value(true)
                .help("Address to bind the HTTP listener to (HTTP_BIND_ADDRESS)"),
        )
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .takes_value(true)
                .help("HTTP port (HTTP_PORT)"),
        )
        .arg(
            Arg::new("path")
                .long("path")
                .takes_value(true)
                .help("Path the credentials endpoint is mounted at (CREDENTIALS_PATH)"),
        )
        .get_matches();

    let mut config = ServerConfig::from_env();
    if let Some(bind) = matches.value_of("bind") {
        config.bind_address = bind.to_string();
    }
    if let Some(port) = matches.value_of("port") {
        config.http_port = port
            .parse()
            .with_context(|| format!("invalid --port value: {}", port))?;
    }
    if let Some(path) = matches.value_of("path") {
        config.credentials_path = path.to_string();
    }

    let handler = TurnCredentialsHandler::new(config.credentials_options())
        .context("failed to configure TURN credentials handler")?;
    info!(
        "Issuing TURN credentials with ttl {}s for {} relay URI(s)",
        handler.options().ttl,
        handler.options().uris.len()
    );

    server::serve(Arc::new(handler), &config).await?;
    Ok(())
}
