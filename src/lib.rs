pub mod cli;
pub mod core;
pub mod providers;

use crate::core::config::{AppConfig, DEFAULT_POMBER_URL, DEFAULT_WORLD_BANK_URL};
use crate::core::series::ProviderKind;
use crate::core::simulator::SimulationParams;
use crate::core::{CountryTable, GdpChain, JoinOptions, SeriesJoiner};
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Series {
        country: Option<String>,
        provider: Option<ProviderKind>,
        tail: usize,
    },
    Overview {
        provider: Option<ProviderKind>,
    },
    Export {
        country: Option<String>,
        provider: Option<ProviderKind>,
        output: Option<PathBuf>,
    },
    Explore {
        provider: Option<ProviderKind>,
        tail: usize,
    },
    Simulate {
        params: SimulationParams,
        every: usize,
        csv: Option<PathBuf>,
    },
    Countries,
}

/// Wires providers from the configuration into a joiner.
pub fn build_joiner(config: &AppConfig, countries: Arc<CountryTable>) -> Result<SeriesJoiner> {
    let provider_configs = &config.providers;
    let client = providers::util::http_client()?;

    let pomber_url = provider_configs
        .pomber
        .as_ref()
        .map_or(DEFAULT_POMBER_URL, |p| &p.base_url);
    let cases = Arc::new(providers::PomberProvider::new(pomber_url, client.clone()));

    let world_bank_url = provider_configs
        .world_bank
        .as_ref()
        .map_or(DEFAULT_WORLD_BANK_URL, |p| &p.base_url);
    let mut chain = GdpChain::new(Arc::new(providers::WorldBankProvider::new(
        world_bank_url,
        client.clone(),
    )));

    if let Some(te) = &provider_configs.trading_economics {
        chain = chain.with_secondary(Arc::new(providers::TradingEconomicsProvider::new(
            &te.base_url,
            config.trading_economics_token(),
            te.indicator,
            client.clone(),
        )));
    }
    if let Some(oecd) = &provider_configs.oecd {
        chain = chain.with_secondary(Arc::new(providers::OecdTrackerProvider::new(
            &oecd.base_url,
            client.clone(),
        )));
    }

    let fallback = match &config.fallback_country {
        Some(key) => Some(countries.lookup(key)?.clone()),
        None => None,
    };
    chain = chain.with_fallback_country(fallback);

    Ok(SeriesJoiner::new(countries, cases, chain))
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("covecon starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let countries = Arc::new(config.country_table());
    let joiner = Arc::new(build_joiner(&config, Arc::clone(&countries))?);
    let options = |provider: Option<ProviderKind>| JoinOptions {
        preferred: provider,
    };

    match command {
        AppCommand::Series {
            country,
            provider,
            tail,
        } => {
            let country = country.unwrap_or_else(|| config.default_country.clone());
            cli::series::run(&joiner, &country, options(provider), tail).await
        }
        AppCommand::Overview { provider } => cli::overview::run(&joiner, options(provider)).await,
        AppCommand::Export {
            country,
            provider,
            output,
        } => {
            let country = country.unwrap_or_else(|| config.default_country.clone());
            cli::export::run(&joiner, &country, options(provider), output.as_deref()).await
        }
        AppCommand::Explore { provider, tail } => {
            cli::explore::run(Arc::clone(&joiner), options(provider), tail).await
        }
        AppCommand::Simulate { params, every, csv } => {
            cli::simulate::run(&params, every, csv.as_deref())
        }
        AppCommand::Countries => {
            cli::series::display_countries(&countries);
            Ok(())
        }
    }
}
