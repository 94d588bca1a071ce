use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::currency::{CurrencyCode, DisplaySettings, LocaleConfig};
use crate::errors::{FinanceError, Result};
use crate::storage::repository::DEFAULT_NAMESPACE;
use crate::utils::fs::{ensure_dir, replace_file};

const DEFAULT_DIR_NAME: &str = ".moneyflow";
const HOME_ENV: &str = "MONEYFLOW_HOME";
const CONFIG_DIR: &str = "config";
const CONFIG_FILE: &str = "config.json";

pub const DEFAULT_TREND_MONTHS: usize = 6;
pub const DEFAULT_TOP_CATEGORIES: usize = 3;
pub const DEFAULT_BACKUP_RETENTION: usize = 5;

/// Returns the application data directory, defaulting to `~/.moneyflow`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub locale: String,
    pub currency: String,
    pub key_namespace: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    pub trend_months: usize,
    pub top_categories: usize,
    pub backup_retention: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "en-US".into(),
            currency: "USD".into(),
            key_namespace: DEFAULT_NAMESPACE.into(),
            data_dir: None,
            trend_months: DEFAULT_TREND_MONTHS,
            top_categories: DEFAULT_TOP_CATEGORIES,
            backup_retention: DEFAULT_BACKUP_RETENTION,
        }
    }
}

impl Config {
    /// Where the record store lives: the override if set, else `base`.
    pub fn resolve_data_dir(&self, base: &Path) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| base.to_path_buf())
    }

    pub fn display_settings(&self) -> DisplaySettings {
        DisplaySettings {
            currency: CurrencyCode::new(self.currency.clone()),
            locale: LocaleConfig::for_tag(&self.locale),
        }
    }
}

pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        Self::with_base_dir(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        let config_root = base.join(CONFIG_DIR);
        ensure_dir(&config_root)?;
        Ok(Self {
            path: config_root.join(CONFIG_FILE),
            base,
        })
    }

    pub fn load(&self) -> Result<Config> {
        if !self.path.exists() {
            return Ok(Config::default());
        }
        let data = fs::read_to_string(&self.path)?;
        serde_json::from_str(&data).map_err(|err| {
            FinanceError::Config(format!("{}: {}", self.path.display(), err))
        })
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        let json = serde_json::to_string_pretty(config)?;
        replace_file(&self.path, &json)?;
        tracing::debug!(path = %self.path.display(), "configuration saved");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }
}
