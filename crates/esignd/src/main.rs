#![forbid(unsafe_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use esign_core::config::ProviderConfig;
use esign_engine::store::SignatureStore;
use esignd::router::build_router;
use esignd::state::AppState;

#[derive(Parser)]
#[command(
    name = "esignd",
    version,
    about = "E-signature integration daemon: envelope creation and provider notifications."
)]
struct Cli {
    /// Address to bind.
    #[arg(long, env = "ESIGND_BIND", default_value = "127.0.0.1:8628")]
    bind: SocketAddr,

    /// Directory holding signature state files.
    #[arg(long, env = "ESIGND_DATA_DIR", default_value = "./esign-data")]
    data_dir: PathBuf,

    // Provider overrides. These form the explicit configuration layer;
    // unset flags fall through to the ESIGN_* environment variables.
    #[arg(long)]
    root_url: Option<String>,
    #[arg(long)]
    username: Option<String>,
    #[arg(long)]
    password: Option<String>,
    #[arg(long)]
    integrator_key: Option<String>,
    #[arg(long)]
    account_id: Option<String>,
    #[arg(long)]
    app_token: Option<String>,
    /// Outbound call timeout, in seconds.
    #[arg(long)]
    timeout: Option<f64>,
}

impl Cli {
    fn explicit_layer(&self) -> ProviderConfig {
        ProviderConfig {
            root_url: self.root_url.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            integrator_key: self.integrator_key.clone(),
            account_id: self.account_id.clone(),
            app_token: self.app_token.clone(),
            timeout: self.timeout,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let config = ProviderConfig::resolve(&[&cli.explicit_layer(), &ProviderConfig::from_env()]);

    let store = SignatureStore::open(&cli.data_dir)
        .with_context(|| format!("cannot open store at {}", cli.data_dir.display()))?;
    let app = build_router(AppState::new(Arc::new(store), config));

    let listener = tokio::net::TcpListener::bind(cli.bind)
        .await
        .with_context(|| format!("cannot bind {}", cli.bind))?;
    tracing::info!(addr = %cli.bind, data_dir = %cli.data_dir.display(), "esignd listening");
    axum::serve(listener, app).await.context("server error")
}
