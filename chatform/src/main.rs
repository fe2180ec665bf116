use anyhow::Result;
use axum::serve;
use clap::Parser;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tracing::info;
use tracing_subscriber::EnvFilter;

use chatform::api;
use chatform_core::{
    auth::{Hs256Tokens, TokenVerifier},
    store::Store,
};

#[derive(Parser)]
#[command(name = "chatform")]
#[command(about = "Conversational form-building backend")]
struct Cli {
    /// Listen address
    #[arg(long, default_value = "127.0.0.1:9000", env = "CHATFORM_ADDR")]
    addr: String,

    /// Data directory for the document store
    #[arg(long, default_value = "data", env = "CHATFORM_DATA_DIR")]
    data_dir: String,

    /// HS256 signing secret for bearer tokens
    #[arg(long, env = "CHATFORM_SECRET")]
    secret: String,

    /// Base URL embedded in shareable and fill links
    #[arg(
        long,
        default_value = "http://localhost:5173",
        env = "CHATFORM_FRONTEND_URL"
    )]
    frontend_url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let store = Store::open(&cli.data_dir)?;
    let tokens = Arc::new(Hs256Tokens::new(&cli.secret));
    let verifier: Arc<dyn TokenVerifier> = tokens.clone();

    let app = api::router(api::AppState {
        store: Arc::new(RwLock::new(store)),
        tokens,
        verifier,
        frontend_url: cli.frontend_url,
    });

    let listener = TcpListener::bind(&cli.addr).await?;
    info!(addr = %cli.addr, "listening");
    serve(listener, app.into_make_service()).await?;
    Ok(())
}
