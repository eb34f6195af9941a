//! Daily cumulative case counts from the pomber/covid19 timeseries feed.

use super::util::fetch_body;
use crate::core::country::Country;
use crate::core::error::{SeriesError, SeriesResult};
use crate::core::provider::CaseSeriesProvider;
use crate::core::series::{CaseObservation, CaseRecord, derive_case_series};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, instrument};

const PROVIDER: &str = "pomber";

#[derive(Debug, Deserialize)]
struct TimeseriesRow {
    date: String,
    confirmed: u64,
    #[serde(default)]
    deaths: Option<u64>,
    #[serde(default)]
    recovered: Option<u64>,
}

pub struct PomberProvider {
    base_url: String,
    client: reqwest::Client,
}

impl PomberProvider {
    pub fn new(base_url: &str, client: reqwest::Client) -> Self {
        PomberProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    fn parse_rows(rows: Vec<TimeseriesRow>) -> SeriesResult<Vec<CaseObservation>> {
        rows.into_iter()
            .map(|row| {
                let date = NaiveDate::parse_from_str(&row.date, "%Y-%m-%d").map_err(|e| {
                    SeriesError::malformed(PROVIDER, format!("bad date '{}': {e}", row.date))
                })?;
                Ok(CaseObservation {
                    date,
                    confirmed: row.confirmed,
                    deaths: row.deaths,
                    recovered: row.recovered,
                })
            })
            .collect()
    }
}

#[async_trait]
impl CaseSeriesProvider for PomberProvider {
    #[instrument(name = "PomberCaseFetch", skip(self, country), fields(country = %country.case_key))]
    async fn fetch_cases(&self, country: &Country) -> SeriesResult<Vec<CaseRecord>> {
        let url = format!("{}/covid19/timeseries.json", self.base_url);
        let body = fetch_body(&self.client, PROVIDER, &url).await?;

        let mut feed: HashMap<String, Vec<TimeseriesRow>> = serde_json::from_str(&body)
            .map_err(|e| SeriesError::malformed(PROVIDER, format!("Failed to parse timeseries: {e}")))?;

        let rows = feed
            .remove(&country.case_key)
            .filter(|rows| !rows.is_empty())
            .ok_or_else(|| {
                SeriesError::unavailable(
                    PROVIDER,
                    format!("No case series for country key: {}", country.case_key),
                )
            })?;

        debug!("Received {} case rows for {}", rows.len(), country.case_key);
        Ok(derive_case_series(Self::parse_rows(rows)?))
    }
}
