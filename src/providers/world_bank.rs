use super::util::fetch_body;
use crate::core::country::Country;
use crate::core::error::{SeriesError, SeriesResult};
use crate::core::provider::GdpSeriesProvider;
use crate::core::series::{GdpPoint, ProviderKind, period_end};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

const PROVIDER: &str = "worldbank";
const GDP_GROWTH_INDICATOR: &str = "NY.GDP.MKTP.KD.ZG";

#[derive(Debug, Deserialize)]
struct Observation {
    date: String,
    value: Option<f64>,
}

/// Annual GDP growth from the World Bank indicators API, keyed by ISO-3 code.
pub struct WorldBankProvider {
    base_url: String,
    client: reqwest::Client,
}

impl WorldBankProvider {
    pub fn new(base_url: &str, client: reqwest::Client) -> Self {
        WorldBankProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// The API answers with `[page_meta, observations]`, or with a single
    /// message object when the request is rejected.
    fn parse(body: &str) -> SeriesResult<Vec<GdpPoint>> {
        let mut parts: Vec<serde_json::Value> = serde_json::from_str(body)
            .map_err(|e| SeriesError::malformed(PROVIDER, format!("Failed to parse JSON: {e}")))?;

        if parts.len() < 2 || parts[1].is_null() {
            return Err(SeriesError::malformed(PROVIDER, "missing observations array"));
        }
        let observations: Vec<Observation> = serde_json::from_value(parts.swap_remove(1))
            .map_err(|e| SeriesError::malformed(PROVIDER, format!("Bad observations: {e}")))?;

        Ok(observations
            .into_iter()
            .filter_map(|obs| {
                let growth = obs.value?;
                let date = period_end(&obs.date)?;
                Some(GdpPoint {
                    date,
                    growth_percent: growth,
                    source_provider: ProviderKind::WorldBank,
                })
            })
            .collect())
    }
}

#[async_trait]
impl GdpSeriesProvider for WorldBankProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::WorldBank
    }

    fn check_available(&self, country: &Country) -> Result<(), String> {
        if country.iso3.trim().is_empty() {
            return Err(format!("no ISO-3 code for {}", country.key));
        }
        Ok(())
    }

    #[instrument(name = "WorldBankGdpFetch", skip(self, country), fields(iso3 = %country.iso3))]
    async fn fetch_gdp(&self, country: &Country) -> SeriesResult<Vec<GdpPoint>> {
        let url = format!(
            "{}/v2/country/{}/indicator/{}?format=json&per_page=100",
            self.base_url, country.iso3, GDP_GROWTH_INDICATOR
        );
        let body = fetch_body(&self.client, PROVIDER, &url).await?;

        let points = Self::parse(&body)?;
        debug!("Parsed {} GDP points for {}", points.len(), country.iso3);
        if points.is_empty() {
            return Err(SeriesError::unavailable(
                PROVIDER,
                format!("No GDP growth values for {}", country.iso3),
            ));
        }
        Ok(points)
    }
}
