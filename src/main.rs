//! OIDC Provider - Main entry point
//!
//! Command line front end for the OIDC login provider: prints login URLs,
//! exchanges authorization codes and resolves ID tokens into users.

use anyhow::Context;
use oidc_provider::config::{Command, Config};
use oidc_provider::{OidcProvider, Provider};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn setup_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{}", config.log_level())));

    // stdout carries command output only
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() {
    let config = Config::parse_args();

    setup_logging(&config);

    if let Err(e) = run(config).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> anyhow::Result<()> {
    let provider = OidcProvider::setup(config.provider_config())
        .await
        .context("OIDC provider setup failed")?;
    info!("OIDC Issuer: {}", provider.config().issuer_url);
    info!("Client ID: {}", provider.config().client_id);

    let ctx = CancellationToken::new();
    tokio::spawn({
        let ctx = ctx.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Received Ctrl+C, cancelling...");
                ctx.cancel();
            }
        }
    });

    match config.command {
        Command::LoginUrl { redirect_uri, state } => {
            let url = provider.login_url(&redirect_uri, &state)?;
            println!("{}", url);
        }
        Command::Exchange { redirect_uri, code } => {
            let id_token = provider.exchange_code(&ctx, &redirect_uri, &code).await?;
            println!("{}", id_token);
        }
        Command::User { token } => {
            let user = provider.get_user(&ctx, &token, "").await?;
            println!("{}", serde_json::to_string_pretty(&user)?);
        }
        Command::Login { redirect_uri, code } => {
            let id_token = provider.exchange_code(&ctx, &redirect_uri, &code).await?;
            let user = provider.get_user(&ctx, &id_token, "").await?;
            println!("{}", serde_json::to_string_pretty(&user)?);
        }
    }

    Ok(())
}
