//! API Server Entry Point
//!
//! Demo server for the auth layer, plus operator commands for the
//! credential file. Uses `anyhow` for startup errors, but request-level
//! errors should use `kernel::error::AppError`.

mod cli;
mod routes;
mod views;

use std::io::{self, BufRead, Write};
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::bail;
use auth::middleware::AuthMiddlewareState;
use auth::{CredentialStore, CredentialWatcher, YamlCredentialFile};
use clap::Parser;
use serde_json::json;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Command, ServerArgs};
use crate::views::HtmlViews;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,auth=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(cli.server).await,
        Command::Hash => hash(),
        Command::User { username } => show_user(&cli.server, &username).await,
    }
}

async fn serve(args: ServerArgs) -> anyhow::Result<()> {
    // Configuration and credential errors are fatal
    let codec = args.token_codec()?;
    let auth = AuthMiddlewareState::new(args.auth_config(), codec, Arc::new(HtmlViews))?;

    let store = CredentialStore::open(YamlCredentialFile::new(&args.users_yml)).await?;
    let _watcher = CredentialWatcher::spawn(store.clone(), args.watch_config());

    let app = routes::app(auth, store);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Hash one password read from stdin
fn hash() -> anyhow::Result<()> {
    eprint!("Password: ");
    io::stderr().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']);

    let hashed = platform::password::hash_password(password)?;
    println!("{hashed}");
    Ok(())
}

/// Print a user's record without the stored secret
async fn show_user(args: &ServerArgs, username: &str) -> anyhow::Result<()> {
    let store = CredentialStore::open(YamlCredentialFile::new(&args.users_yml)).await?;

    let Some(record) = store.get_user(username) else {
        bail!("No user {} in {}", username, store.origin());
    };

    let summary = json!({
        "username": record.username,
        "password": match &record.secret {
            Some(secret) if secret.is_hashed() => "hashed",
            Some(_) => "plaintext",
            None => "none",
        },
        "claims": record.claims,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
