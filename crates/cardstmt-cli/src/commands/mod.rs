pub mod batch;
pub mod config;
pub mod detect;
pub mod parse;
pub mod profiles;

use std::path::{Path, PathBuf};

use cardstmt_core::CardstmtConfig;
use tracing::debug;

/// `<config dir>/cardstmt/config.json`
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cardstmt")
        .join("config.json")
}

/// Resolve the config file in use: the `--config` path, else the default location.
pub fn resolve_config_path(config_path: Option<&str>) -> PathBuf {
    config_path.map(PathBuf::from).unwrap_or_else(default_config_path)
}

/// Load configuration.
///
/// An explicit path must exist. Without one, the default location is used
/// when present and built-in defaults otherwise.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<CardstmtConfig> {
    if let Some(path) = config_path {
        return CardstmtConfig::from_file(Path::new(path))
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {}", path, e));
    }

    let path = default_config_path();
    if path.exists() {
        debug!("Loading config from {}", path.display());
        Ok(CardstmtConfig::from_file(&path)?)
    } else {
        Ok(CardstmtConfig::default())
    }
}
