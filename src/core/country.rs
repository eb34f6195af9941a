//! Country to provider-code mapping.

use crate::core::error::{SeriesError, SeriesResult};
use crate::core::series::ProviderKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Country {
    pub key: String,
    pub label: String,
    /// Key used by the daily case feed, e.g. "Germany".
    pub case_key: String,
    pub iso2: String,
    pub iso3: String,
    #[serde(default)]
    pub trading_economics: Option<String>,
    #[serde(default)]
    pub oecd: Option<String>,
    #[serde(default = "default_preferred")]
    pub preferred: ProviderKind,
}

fn default_preferred() -> ProviderKind {
    ProviderKind::WorldBank
}

impl Country {
    fn builtin(key: &str, label: &str, case_key: &str, iso3: &str) -> Self {
        Country {
            key: key.to_string(),
            label: label.to_string(),
            case_key: case_key.to_string(),
            iso2: key.to_string(),
            iso3: iso3.to_string(),
            trading_economics: Some(label.to_lowercase()),
            oecd: Some(iso3.to_string()),
            preferred: ProviderKind::WorldBank,
        }
    }

    fn matches(&self, key: &str) -> bool {
        [&self.key, &self.iso2, &self.iso3, &self.case_key]
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(key))
    }
}

/// Immutable lookup table, built once from the configuration.
#[derive(Debug, Clone)]
pub struct CountryTable {
    countries: Vec<Country>,
}

impl CountryTable {
    pub fn builtin() -> Self {
        CountryTable {
            countries: vec![
                Country::builtin("US", "United States", "US", "USA"),
                Country::builtin("DE", "Germany", "Germany", "DEU"),
                Country::builtin("IT", "Italy", "Italy", "ITA"),
                Country::builtin("JP", "Japan", "Japan", "JPN"),
                Country::builtin("CA", "Canada", "Canada", "CAN"),
                Country::builtin("FR", "France", "France", "FRA"),
            ],
        }
    }

    /// Built-in entries with `overrides` applied. An override replaces the
    /// entry with the same key, otherwise it is appended.
    pub fn with_overrides(overrides: &[Country]) -> Self {
        let mut table = Self::builtin();
        for country in overrides {
            match table
                .countries
                .iter_mut()
                .find(|c| c.key.eq_ignore_ascii_case(&country.key))
            {
                Some(existing) => *existing = country.clone(),
                None => table.countries.push(country.clone()),
            }
        }
        table
    }

    /// Resolves a key, ISO code or case-feed name, ignoring case.
    pub fn lookup(&self, key: &str) -> SeriesResult<&Country> {
        let key = key.trim();
        self.countries
            .iter()
            .find(|c| c.matches(key))
            .ok_or_else(|| SeriesError::UnknownCountry(key.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Country> {
        self.countries.iter()
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }
}

impl Default for CountryTable {
    fn default() -> Self {
        Self::builtin()
    }
}
