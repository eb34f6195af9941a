//! Fetches a country's case and GDP series and aligns them by date.

use crate::core::country::{Country, CountryTable};
use crate::core::error::SeriesResult;
use crate::core::fallback::{GdpChain, GdpFetch};
use crate::core::provider::CaseSeriesProvider;
use crate::core::series::{CaseRecord, JoinedRecord, ProviderKind, join};
use std::sync::Arc;
use tracing::{debug, instrument};

#[derive(Debug, Clone, Copy, Default)]
pub struct JoinOptions {
    /// Overrides the country's configured preferred GDP provider.
    pub preferred: Option<ProviderKind>,
}

#[derive(Debug, Clone)]
pub struct JoinedSeries {
    pub country: Country,
    pub case_series: Vec<CaseRecord>,
    pub gdp: GdpFetch,
    pub joined_series: Vec<JoinedRecord>,
}

pub struct SeriesJoiner {
    countries: Arc<CountryTable>,
    cases: Arc<dyn CaseSeriesProvider>,
    gdp: GdpChain,
}

impl SeriesJoiner {
    pub fn new(
        countries: Arc<CountryTable>,
        cases: Arc<dyn CaseSeriesProvider>,
        gdp: GdpChain,
    ) -> Self {
        SeriesJoiner {
            countries,
            cases,
            gdp,
        }
    }

    pub fn countries(&self) -> &CountryTable {
        &self.countries
    }

    /// Resolves the country, fetches both series concurrently and joins them.
    ///
    /// The case fetch and the GDP chain are independent; either failing fails
    /// the whole call.
    #[instrument(name = "JoinedSeries", skip(self, options), fields(country = %country_key))]
    pub async fn get_joined_series(
        &self,
        country_key: &str,
        options: JoinOptions,
    ) -> SeriesResult<JoinedSeries> {
        let country = self.countries.lookup(country_key)?.clone();
        let preferred = options.preferred.unwrap_or(country.preferred);

        let (case_series, gdp) = tokio::try_join!(
            self.cases.fetch_cases(&country),
            self.gdp.fetch(&country, preferred)
        )?;

        let joined_series = join(&case_series, &gdp.points);
        debug!(
            cases = case_series.len(),
            gdp_points = gdp.points.len(),
            gdp_provider = %gdp.provider,
            "Joined series"
        );

        Ok(JoinedSeries {
            country,
            case_series,
            gdp,
            joined_series,
        })
    }
}
