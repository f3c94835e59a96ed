// 🔧 Application configuration (JSON)
//
// Every field has a default, so a partial file (or none at all) is valid.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::derivation::DEFAULT_VALUE_MULTIPLIER;
use crate::error::{PortfolioError, PortfolioResult};
use crate::settings::{CustomLists, ImportDefaults};

/// Env var consulted when no `--config` path is passed
pub const CONFIG_ENV_VAR: &str = "DOMAIN_PORTFOLIO_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    pub lists: CustomLists,
    pub import: ImportDefaults,
    pub value_multiplier: f64,

    /// tracing filter directive; RUST_LOG wins when set
    pub log_filter: Option<String>,

    /// Rolling log files (TUI mode only)
    pub log_dir: PathBuf,
    pub export_dir: PathBuf,
    pub server_addr: String,

    /// Start with the two demo domains instead of an empty portfolio
    pub seed_demo_data: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            lists: CustomLists::default(),
            import: ImportDefaults::default(),
            value_multiplier: DEFAULT_VALUE_MULTIPLIER,
            log_filter: None,
            log_dir: PathBuf::from("logs"),
            export_dir: PathBuf::from("."),
            server_addr: "127.0.0.1:3000".to_string(),
            seed_demo_data: true,
        }
    }
}

impl AppConfig {
    /// Explicit path first, then `DOMAIN_PORTFOLIO_CONFIG`, then defaults.
    pub fn load(path: Option<&Path>) -> PortfolioResult<AppConfig> {
        let resolved = match path {
            Some(p) => Some(p.to_path_buf()),
            None => std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from),
        };

        match resolved {
            Some(p) => Self::from_file(&p),
            None => Ok(AppConfig::default()),
        }
    }

    /// A missing file yields defaults; an unreadable or malformed one is an error.
    pub fn from_file(path: &Path) -> PortfolioResult<AppConfig> {
        if !path.exists() {
            debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(AppConfig::default());
        }

        let bytes = std::fs::read(path)
            .map_err(|e| PortfolioError::Config(format!("cannot read {}: {}", path.display(), e)))?;

        let config: AppConfig = serde_json::from_slice(&bytes)
            .map_err(|e| PortfolioError::Config(format!("invalid {}: {}", path.display(), e)))?;

        if !config.value_multiplier.is_finite() || config.value_multiplier < 0.0 {
            return Err(PortfolioError::Config(format!(
                "valueMultiplier must be a non-negative number, got {}",
                config.value_multiplier
            )));
        }

        debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> PortfolioResult<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| PortfolioError::Config(e.to_string()))?;

        std::fs::write(path, json)
            .map_err(|e| PortfolioError::Config(format!("cannot write {}: {}", path.display(), e)))
    }
}
