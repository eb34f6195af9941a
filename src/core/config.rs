use crate::core::country::{Country, CountryTable};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_POMBER_URL: &str = "https://pomber.github.io";
pub const DEFAULT_WORLD_BANK_URL: &str = "https://api.worldbank.org";
pub const DEFAULT_TRADING_ECONOMICS_URL: &str = "https://api.tradingeconomics.com";
pub const DEFAULT_OECD_URL: &str = "https://api.db.nomics.world";
pub const TOKEN_ENV_VAR: &str = "TRADING_ECONOMICS_TOKEN";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PomberProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WorldBankProviderConfig {
    pub base_url: String,
}

/// Which Trading Economics indicator to request.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TradingEconomicsIndicator {
    /// GDP growth rate, used as-is.
    #[default]
    Growth,
    /// GDP level; growth is derived between consecutive periods.
    Level,
}

impl TradingEconomicsIndicator {
    pub fn path_segment(&self) -> &'static str {
        match self {
            TradingEconomicsIndicator::Growth => "gdp growth rate",
            TradingEconomicsIndicator::Level => "gdp",
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TradingEconomicsProviderConfig {
    #[serde(default = "default_trading_economics_url")]
    pub base_url: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub indicator: TradingEconomicsIndicator,
}

fn default_trading_economics_url() -> String {
    DEFAULT_TRADING_ECONOMICS_URL.to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OecdProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub pomber: Option<PomberProviderConfig>,
    pub world_bank: Option<WorldBankProviderConfig>,
    pub trading_economics: Option<TradingEconomicsProviderConfig>,
    pub oecd: Option<OecdProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            pomber: Some(PomberProviderConfig {
                base_url: DEFAULT_POMBER_URL.to_string(),
            }),
            world_bank: Some(WorldBankProviderConfig {
                base_url: DEFAULT_WORLD_BANK_URL.to_string(),
            }),
            trading_economics: Some(TradingEconomicsProviderConfig {
                base_url: DEFAULT_TRADING_ECONOMICS_URL.to_string(),
                token: None,
                indicator: TradingEconomicsIndicator::Growth,
            }),
            oecd: Some(OecdProviderConfig {
                base_url: DEFAULT_OECD_URL.to_string(),
            }),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_country")]
    pub default_country: String,
    /// Country whose primary GDP series is used when the requested country's
    /// primary series cannot be fetched. Unset means no such fallback.
    #[serde(default)]
    pub fallback_country: Option<String>,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub countries: Vec<Country>,
}

fn default_country() -> String {
    "US".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            default_country: default_country(),
            fallback_country: None,
            providers: ProvidersConfig::default(),
            countries: Vec::new(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using built-in defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("org", "covecon", "covecon")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn country_table(&self) -> CountryTable {
        CountryTable::with_overrides(&self.countries)
    }

    /// Access token for the secondary provider. The config value wins over
    /// the environment; blank values count as unset.
    pub fn trading_economics_token(&self) -> Option<String> {
        self.providers
            .trading_economics
            .as_ref()
            .and_then(|p| p.token.clone())
            .filter(|token| !token.trim().is_empty())
            .or_else(|| {
                std::env::var(TOKEN_ENV_VAR)
                    .ok()
                    .filter(|token| !token.trim().is_empty())
            })
    }
}
