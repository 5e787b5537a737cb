//! ballot-server binary.
//!
//! Loads `.env`, then `config.toml` (or the path given with `--config`), the
//! legacy `PORT` / `COSMOS_*` variables and `BALLOT_*` environment variables, opens the configured vote store and
//! serves the JSON API over HTTP.
//!
//! ```sh
//! BALLOT_COSMOS_URI=https://acct.documents.azure.com:443/ \
//! BALLOT_COSMOS_KEY=... \
//!   cargo run -p ballot-server
//! ```

use std::path::PathBuf;

use anyhow::Context as _;
use ballot_server::{Backend, ServerConfig, serve};
use ballot_store_cosmos::CosmosStore;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Ballot vote service")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // A missing .env is fine.
  let dotenv = dotenvy::dotenv();

  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  if let Ok(path) = dotenv {
    tracing::debug!(path = %path.display(), "loaded environment file");
  }

  let cli = Cli::parse();

  let cfg = ServerConfig::load(&cli.config).context("failed to load configuration")?;

  let address = cfg.address();
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  match cfg.backend {
    Backend::Cosmos => {
      let store = CosmosStore::new(cfg.cosmos()?)
        .context("invalid Cosmos DB configuration")?;
      tracing::info!(
        database = store.database(),
        container = store.container(),
        "using Cosmos DB backend"
      );
      tracing::info!("Server running on http://{address}");
      serve(listener, store).await.context("server error")?;
    }
    Backend::Sqlite => {
      let store = cfg.open_sqlite().await?;
      tracing::info!(
        path = %cfg.sqlite_path().display(),
        collection = %cfg.cosmos_container,
        "using SQLite backend"
      );
      tracing::info!("Server running on http://{address}");
      serve(listener, store).await.context("server error")?;
    }
  }

  tracing::info!("Server stopped");
  Ok(())
}
