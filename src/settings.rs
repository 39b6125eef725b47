use anyhow::anyhow;
use config::{Config, Environment, File};
use rusty_money::iso::{self, Currency};
use serde::{Deserialize, Serialize};

use crate::CLIENT_NAME;

const CONFIG_NAME: &str = "config.toml";
pub(crate) const DEFAULT_API_URL: &str = "http://localhost:8080";
pub(crate) const DEFAULT_CURRENCY: &str = "BRL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Base URL of the finance API, e.g. `http://localhost:8080`.
    pub api_url: String,
    /// Owner of every record submitted from this client.
    pub user_id: i64,
    /// ISO 4217 code used when printing amounts.
    pub currency: String,
}

impl Settings {
    /// Layers defaults, the config file and `FINPAL_*` environment variables,
    /// in that order. The default config file may be absent; an explicit one
    /// may not.
    pub fn new(config_path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut s = Config::builder()
            .set_default("api_url", DEFAULT_API_URL)?
            .set_default("user_id", 1)?
            .set_default("currency", DEFAULT_CURRENCY)?;

        if let Some(path) = config_path {
            s = s.add_source(File::with_name(path));
        } else {
            s = s.add_source(File::with_name(&default_config_path()).required(false));
        }

        s.add_source(Environment::with_prefix("FINPAL"))
            .build()?
            .try_deserialize()
    }

    pub fn currency(&self) -> anyhow::Result<&'static Currency> {
        iso::find(&self.currency.to_uppercase())
            .ok_or_else(|| anyhow!("unknown currency code {:?}", self.currency))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            user_id: 1,
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

pub(crate) fn default_config_path() -> String {
    dirs::config_dir()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| std::env::temp_dir()))
        .join(CLIENT_NAME)
        .join(CONFIG_NAME)
        .display()
        .to_string()
}
