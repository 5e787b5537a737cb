//! Process wiring for the Ballot vote service: configuration, storage
//! backend selection, HTTP middleware and graceful shutdown.

use std::{
  collections::HashMap,
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use anyhow::Context as _;
use axum::Router;
use ballot_core::store::VoteStore;
use ballot_store_cosmos::CosmosConfig;
use ballot_store_sqlite::SqliteStore;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use tokio::{net::TcpListener, signal};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Prefix for environment overrides, e.g. `BALLOT_PORT`.
pub const ENV_PREFIX: &str = "BALLOT";

/// Unprefixed variable names read by earlier deployments, with the key each
/// one sets. `BALLOT_*` variables take precedence over these.
const LEGACY_ENV: &[(&str, &str)] = &[
  ("PORT", "port"),
  ("COSMOS_URI", "cosmos_uri"),
  ("COSMOS_KEY", "cosmos_key"),
  ("COSMOS_DB", "cosmos_database"),
  ("COSMOS_CONTAINER", "cosmos_container"),
];

// ─── Configuration ────────────────────────────────────────────────────────────

/// Which storage backend to serve from.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
  Cosmos,
  Sqlite,
}

/// Runtime server configuration.
///
/// Built once at startup from defaults, an optional TOML file, the legacy
/// unprefixed variables (`PORT`, `COSMOS_*`) and `BALLOT_*` environment
/// variables, then passed to the storage client. `cosmos_container` names
/// the vote collection for either backend.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:                String,
  pub port:                u16,
  pub backend:             Backend,
  pub cosmos_uri:          Option<String>,
  pub cosmos_key:          Option<String>,
  pub cosmos_database:     String,
  pub cosmos_container:    String,
  pub cosmos_timeout_secs: u64,
  pub cosmos_page_size:    u32,
  pub sqlite_path:         PathBuf,
}

impl ServerConfig {
  /// Load defaults, then `path` if it exists, then the environment.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    Self::layered(
      path,
      legacy_env(|name| std::env::var(name).ok()),
      Environment::with_prefix(ENV_PREFIX),
    )
  }

  fn layered(
    path: &Path,
    legacy: Environment,
    env: Environment,
  ) -> Result<Self, ConfigError> {
    Config::builder()
      .set_default("host", "0.0.0.0")?
      .set_default("port", 8080)?
      .set_default("backend", "cosmos")?
      .set_default("cosmos_database", "ballot")?
      .set_default("cosmos_container", "votes")?
      .set_default("cosmos_timeout_secs", 30)?
      .set_default("cosmos_page_size", 1000)?
      .set_default("sqlite_path", "ballot.db")?
      .add_source(File::from(path).required(false))
      .add_source(legacy)
      .add_source(env)
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  /// Cosmos DB client settings. Fails when the endpoint or key is unset.
  pub fn cosmos(&self) -> anyhow::Result<CosmosConfig> {
    let endpoint = self
      .cosmos_uri
      .clone()
      .filter(|s| !s.is_empty())
      .context("cosmos_uri is required for the cosmos backend")?;
    let key = self
      .cosmos_key
      .clone()
      .filter(|s| !s.is_empty())
      .context("cosmos_key is required for the cosmos backend")?;

    let mut cfg = CosmosConfig::new(
      endpoint,
      key,
      self.cosmos_database.clone(),
      self.cosmos_container.clone(),
    );
    cfg.timeout = Duration::from_secs(self.cosmos_timeout_secs);
    cfg.page_size = self.cosmos_page_size;
    Ok(cfg)
  }

  /// SQLite path with a leading `~` expanded.
  pub fn sqlite_path(&self) -> PathBuf { expand_tilde(&self.sqlite_path) }

  /// Open the SQLite store, keeping votes in the `cosmos_container`
  /// collection.
  pub async fn open_sqlite(&self) -> anyhow::Result<SqliteStore> {
    let path = self.sqlite_path();
    let store = SqliteStore::open(&path)
      .await
      .with_context(|| format!("failed to open store at {path:?}"))?;
    Ok(store.with_collection(self.cosmos_container.clone()))
  }
}

/// Map the legacy variable names onto config keys. `lookup` reads one
/// variable.
fn legacy_env(lookup: impl Fn(&str) -> Option<String>) -> Environment {
  let vars: HashMap<String, String> = LEGACY_ENV
    .iter()
    .filter_map(|(name, key)| lookup(name).map(|v| (key.to_string(), v)))
    .collect();
  Environment::default().source(Some(vars))
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Serving ──────────────────────────────────────────────────────────────────

/// The API router with request tracing and permissive CORS applied.
pub fn app<S>(store: Arc<S>) -> Router
where
  S: VoteStore + 'static,
{
  ballot_api::api_router(store)
    .layer(CorsLayer::permissive())
    .layer(TraceLayer::new_for_http())
}

/// Serve `store` on `listener` until Ctrl-C or SIGTERM.
pub async fn serve<S>(listener: TcpListener, store: S) -> std::io::Result<()>
where
  S: VoteStore + 'static,
{
  axum::serve(listener, app(Arc::new(store)))
    .with_graceful_shutdown(shutdown_signal())
    .await
}

async fn shutdown_signal() {
  let ctrl_c = async {
    match signal::ctrl_c().await {
      Ok(()) => tracing::info!("Received Ctrl+C, shutting down"),
      Err(e) => {
        tracing::error!(error = %e, "failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
      }
    }
  };

  #[cfg(unix)]
  let terminate = async {
    match signal::unix::signal(signal::unix::SignalKind::terminate()) {
      Ok(mut sig) => {
        sig.recv().await;
        tracing::info!("Received terminate signal, shutting down");
      }
      Err(e) => {
        tracing::error!(error = %e, "failed to install SIGTERM handler");
        std::future::pending::<()>().await;
      }
    }
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    _ = ctrl_c => {},
    _ = terminate => {},
  }
}

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use ballot_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  use super::*;

  fn env(pairs: &[(&str, &str)]) -> Environment {
    let map: HashMap<String, String> = pairs
      .iter()
      .map(|(k, v)| (k.to_string(), v.to_string()))
      .collect();
    Environment::with_prefix(ENV_PREFIX).source(Some(map))
  }

  fn legacy(pairs: &[(&str, &str)]) -> Environment {
    legacy_env(|name| {
      pairs
        .iter()
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.to_string())
    })
  }

  fn temp_file(name: &str, contents: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("ballot-server-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
  }

  #[test]
  fn defaults_apply_without_file_or_env() {
    let cfg = ServerConfig::layered(
      Path::new("does-not-exist.toml"),
      legacy(&[]),
      env(&[]),
    )
    .unwrap();
    assert_eq!(cfg.address(), "0.0.0.0:8080");
    assert_eq!(cfg.backend, Backend::Cosmos);
    assert_eq!(cfg.cosmos_database, "ballot");
    assert_eq!(cfg.cosmos_container, "votes");
    assert!(cfg.cosmos_uri.is_none());
    assert!(cfg.cosmos().is_err());
  }

  #[test]
  fn env_overrides_file() {
    let path = temp_file(
      "override.toml",
      "port = 9000\nbackend = \"sqlite\"\ncosmos_database = \"from-file\"\n",
    );
    let cfg = ServerConfig::layered(
      &path,
      legacy(&[]),
      env(&[("BALLOT_PORT", "9100"), ("BALLOT_COSMOS_CONTAINER", "tally")]),
    )
    .unwrap();
    assert_eq!(cfg.port, 9100);
    assert_eq!(cfg.backend, Backend::Sqlite);
    assert_eq!(cfg.cosmos_database, "from-file");
    assert_eq!(cfg.cosmos_container, "tally");
  }

  #[test]
  fn cosmos_settings_come_from_config() {
    let cfg = ServerConfig::layered(
      Path::new("does-not-exist.toml"),
      legacy(&[]),
      env(&[
        ("BALLOT_COSMOS_URI", "https://acct.documents.azure.com:443/"),
        ("BALLOT_COSMOS_KEY", "a2V5"),
        ("BALLOT_COSMOS_TIMEOUT_SECS", "5"),
      ]),
    )
    .unwrap();
    let cosmos = cfg.cosmos().unwrap();
    assert_eq!(cosmos.endpoint, "https://acct.documents.azure.com:443/");
    assert_eq!(cosmos.key, "a2V5");
    assert_eq!(cosmos.database, "ballot");
    assert_eq!(cosmos.timeout, Duration::from_secs(5));
    assert_eq!(cosmos.page_size, 1000);
  }

  #[test]
  fn legacy_names_fill_in_when_prefixed_ones_are_absent() {
    let cfg = ServerConfig::layered(
      Path::new("does-not-exist.toml"),
      legacy(&[
        ("PORT", "3000"),
        ("COSMOS_URI", "https://legacy.documents.azure.com:443/"),
        ("COSMOS_KEY", "a2V5"),
        ("COSMOS_DB", "VotingDB"),
        ("COSMOS_CONTAINER", "Votes"),
      ]),
      env(&[]),
    )
    .unwrap();
    assert_eq!(cfg.port, 3000);
    let cosmos = cfg.cosmos().unwrap();
    assert_eq!(cosmos.endpoint, "https://legacy.documents.azure.com:443/");
    assert_eq!(cosmos.key, "a2V5");
    assert_eq!(cosmos.database, "VotingDB");
    assert_eq!(cosmos.container, "Votes");
  }

  #[test]
  fn prefixed_names_win_over_legacy_and_legacy_over_file() {
    let path = temp_file("legacy.toml", "port = 9000\ncosmos_database = \"from-file\"\n");
    let cfg = ServerConfig::layered(
      &path,
      legacy(&[("PORT", "3000"), ("COSMOS_DB", "VotingDB"), ("COSMOS_CONTAINER", "Votes")]),
      env(&[("BALLOT_PORT", "9100"), ("BALLOT_COSMOS_CONTAINER", "tally")]),
    )
    .unwrap();
    assert_eq!(cfg.port, 9100);
    assert_eq!(cfg.cosmos_database, "VotingDB");
    assert_eq!(cfg.cosmos_container, "tally");
  }

  #[test]
  fn invalid_backend_is_rejected() {
    let err = ServerConfig::layered(
      Path::new("does-not-exist.toml"),
      legacy(&[]),
      env(&[("BALLOT_BACKEND", "postgres")]),
    );
    assert!(err.is_err());
  }

  #[test]
  fn tilde_is_expanded() {
    let home = std::env::var("HOME").unwrap_or_default();
    if home.is_empty() {
      return;
    }
    let expanded = expand_tilde(Path::new("~/ballot.db"));
    assert_eq!(expanded, PathBuf::from(home).join("ballot.db"));
    assert_eq!(expand_tilde(Path::new("/tmp/x.db")), PathBuf::from("/tmp/x.db"));
  }

  #[tokio::test]
  async fn sqlite_backend_uses_configured_container() {
    let cfg = ServerConfig::layered(
      Path::new("does-not-exist.toml"),
      legacy(&[]),
      env(&[
        ("BALLOT_BACKEND", "sqlite"),
        ("BALLOT_SQLITE_PATH", ":memory:"),
        ("BALLOT_COSMOS_CONTAINER", "tally"),
      ]),
    )
    .unwrap();
    assert_eq!(cfg.backend, Backend::Sqlite);
    let store = cfg.open_sqlite().await.unwrap();
    let coll = store.ensure_collection().await.unwrap();
    assert_eq!(coll.name(), "tally");
  }

  #[tokio::test]
  async fn app_answers_cors_preflight() {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let req = Request::builder()
      .method("OPTIONS")
      .uri("/vote")
      .header(header::ORIGIN, "https://example.com")
      .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
      .body(Body::empty())
      .unwrap();
    let resp = app(store).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
  }

  #[tokio::test]
  async fn app_serves_routes_through_middleware() {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let req = Request::builder()
      .method("POST")
      .uri("/vote")
      .header(header::CONTENT_TYPE, "application/json")
      .header(header::ORIGIN, "https://example.com")
      .body(Body::from(r#"{"voterId":"v1","candidateId":"A"}"#))
      .unwrap();
    let resp = app(store.clone()).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert!(resp.headers().contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));

    let req = Request::builder().uri("/results").body(Body::empty()).unwrap();
    let resp = app(store).oneshot(req).await.unwrap();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], br#"{"A":1}"#);
  }
}
