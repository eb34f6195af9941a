//! Provider abstractions for case and GDP series

use crate::core::country::Country;
use crate::core::error::SeriesResult;
use crate::core::series::{CaseRecord, GdpPoint, ProviderKind};
use async_trait::async_trait;

#[async_trait]
pub trait CaseSeriesProvider: Send + Sync {
    /// Daily series for the country with deltas already derived.
    async fn fetch_cases(&self, country: &Country) -> SeriesResult<Vec<CaseRecord>>;
}

#[async_trait]
pub trait GdpSeriesProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Whether this provider can serve `country` at all. `Err` carries the
    /// reason it must be skipped, e.g. a missing token or country code.
    fn check_available(&self, country: &Country) -> Result<(), String>;

    /// GDP growth points in any order. An empty series is an error.
    async fn fetch_gdp(&self, country: &Country) -> SeriesResult<Vec<GdpPoint>>;
}
