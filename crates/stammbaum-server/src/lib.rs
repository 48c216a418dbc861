//! HTTP server wiring for Stammbaum.
//!
//! Holds the runtime configuration, the store start-up loop, and the
//! top-level router that mounts the JSON API under `/api`.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use axum::Router;
use serde::Deserialize;
use stammbaum_api::{ApiConfig, api_router};
use stammbaum_store_sqlite::SqliteStore;
use tower_http::trace::TraceLayer;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `STAMMBAUM_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                   String,
  pub port:                   u16,
  pub store_path:             PathBuf,
  /// Largest accepted ancestor depth on the tree and chart endpoints.
  pub max_depth:              u32,
  pub startup_retry_delay_ms: u64,
  /// Give up opening the store after this many failures; 0 retries forever.
  pub startup_max_attempts:   u32,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                   "127.0.0.1".to_string(),
      port:                   8000,
      store_path:             PathBuf::from("stammbaum.db"),
      max_depth:              ApiConfig::default().max_depth,
      startup_retry_delay_ms: 1000,
      startup_max_attempts:   0,
    }
  }
}

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Start-up ────────────────────────────────────────────────────────────────

/// Open the store at `config.store_path`, retrying with a fixed delay until it
/// succeeds or `startup_max_attempts` is reached.
pub async fn open_store(config: &ServerConfig) -> stammbaum_store_sqlite::Result<SqliteStore> {
  let path = expand_tilde(&config.store_path);
  let delay = Duration::from_millis(config.startup_retry_delay_ms);
  let mut attempt = 0u32;

  loop {
    attempt += 1;
    match SqliteStore::open(&path).await {
      Ok(store) => {
        tracing::info!(path = %path.display(), attempt, "store ready");
        return Ok(store);
      }
      Err(e) if config.startup_max_attempts != 0 && attempt >= config.startup_max_attempts => {
        tracing::error!(path = %path.display(), attempt, error = %e, "giving up on store");
        return Err(e);
      }
      Err(e) => {
        tracing::warn!(path = %path.display(), attempt, error = %e, "store not ready, retrying");
        tokio::time::sleep(delay).await;
      }
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// The complete application: the API nested under `/api`, with request
/// tracing.
pub fn app(store: SqliteStore, config: &ServerConfig) -> Router {
  let api = api_router(Arc::new(store), ApiConfig { max_depth: config.max_depth });
  Router::new()
    .nest("/api", api)
    .layer(TraceLayer::new_for_http())
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use tower::ServiceExt as _;

  use super::*;

  #[test]
  fn config_file_overrides_defaults() {
    let cfg: ServerConfig = config::Config::builder()
      .add_source(config::File::from_str(
        "port = 9000\nmax_depth = 5\nstore_path = \"/tmp/family.db\"",
        config::FileFormat::Toml,
      ))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap();

    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.max_depth, 5);
    assert_eq!(cfg.store_path, PathBuf::from("/tmp/family.db"));
    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.startup_retry_delay_ms, 1000);
    assert_eq!(cfg.address(), "127.0.0.1:9000");
  }

  #[test]
  fn tilde_is_expanded_only_at_the_start() {
    let plain = PathBuf::from("data/stammbaum.db");
    assert_eq!(expand_tilde(&plain), plain);

    let nested = PathBuf::from("data/~/x.db");
    assert_eq!(expand_tilde(&nested), nested);
  }

  #[tokio::test]
  async fn open_store_gives_up_after_max_attempts() {
    let cfg = ServerConfig {
      store_path: PathBuf::from("/nonexistent-stammbaum-dir/sub/store.db"),
      startup_retry_delay_ms: 1,
      startup_max_attempts: 3,
      ..ServerConfig::default()
    };
    assert!(open_store(&cfg).await.is_err());
  }

  #[tokio::test]
  async fn api_is_mounted_under_prefix() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let app = app(store, &ServerConfig::default());

    let req = Request::builder().uri("/api/persons").body(Body::empty()).unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let req = Request::builder().uri("/persons").body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }
}
