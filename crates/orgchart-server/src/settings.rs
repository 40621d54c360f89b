//! Runtime configuration, layered from `config.toml` and `ORGCHART__*`
//! environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use orgchart_core::overrides::StaffingOverrides;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  pub store_path: PathBuf,
  /// Fixed-quota units and deputy rules; absent means no overrides.
  #[serde(default)]
  pub staffing:   StaffingOverrides,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 8080 }

impl ServerConfig {
  /// Read `path` (optional) and overlay the environment.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("ORGCHART").separator("__"))
      .build()
      .context("failed to read config file")?;

    settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

#[cfg(test)]
mod tests {
  use std::io::Write as _;

  use super::*;

  #[test]
  fn loads_staffing_overrides_from_toml() {
    let dir = std::env::temp_dir().join(format!("orgchart-config-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("config.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    write!(
      file,
      r#"
store_path = "org.db"
port = 9000

[[staffing.fixed_quota_units]]
department_id = "6f1c1f7e-3d4b-4a38-9d53-0d6c2b0f3a11"

[[staffing.deputies]]
position_id = "1a0e8f3c-5c1d-4f0e-8e0a-7b7c2d3e4f50"
executive_position_id = "2b1f9a4d-6d2e-4a1f-9f1b-8c8d3e4f5a61"
unit_department_id = "6f1c1f7e-3d4b-4a38-9d53-0d6c2b0f3a11"
"#
    )
    .unwrap();

    let cfg = ServerConfig::load(&path).unwrap();
    assert_eq!(cfg.address(), "127.0.0.1:9000");
    assert_eq!(cfg.staffing.fixed_quota_units.len(), 1);
    assert_eq!(cfg.staffing.fixed_quota_units[0].quota, 50);
    assert_eq!(cfg.staffing.deputies.len(), 1);

    std::fs::remove_dir_all(&dir).ok();
  }
}
