//! orgchart-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! SQLite graph store, and serves the JSON API over HTTP.
//!
//! ```toml
//! store_path = "~/.local/share/orgchart/org.db"
//!
//! [[staffing.fixed_quota_units]]
//! department_id = "..."
//! quota = 50
//!
//! [[staffing.deputies]]
//! position_id = "..."
//! executive_position_id = "..."
//! unit_department_id = "..."
//! ```

mod settings;

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use orgchart_core::OrgChart;
use orgchart_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::settings::ServerConfig;

#[derive(Parser)]
#[command(author, version, about = "Organisation hierarchy and staffing server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let server_cfg = ServerConfig::load(&cli.config)?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  if server_cfg.staffing.is_empty() {
    tracing::info!("no staffing overrides configured");
  } else {
    tracing::info!(
      fixed_quota_units = server_cfg.staffing.fixed_quota_units.len(),
      deputies = server_cfg.staffing.deputies.len(),
      "staffing overrides loaded"
    );
  }

  let chart = OrgChart::new(Arc::new(store), server_cfg.staffing.clone());
  let app = orgchart_api::api_router(chart).layer(TraceLayer::new_for_http());
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
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
