//! OECD weekly GDP tracker, served through the DB.nomics series API.

use super::util::fetch_body;
use crate::core::country::Country;
use crate::core::error::{SeriesError, SeriesResult};
use crate::core::provider::GdpSeriesProvider;
use crate::core::series::{GdpPoint, ProviderKind, period_end};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

const PROVIDER: &str = "oecd";
const DATASET: &str = "OECD/GDP_GROWTH";

#[derive(Debug, Deserialize)]
struct SeriesResponse {
    series: SeriesPage,
}

#[derive(Debug, Deserialize)]
struct SeriesPage {
    docs: Vec<SeriesDoc>,
}

#[derive(Debug, Deserialize)]
struct SeriesDoc {
    period: Vec<String>,
    /// Numbers, or the string "NA" for missing observations.
    value: Vec<serde_json::Value>,
}

pub struct OecdTrackerProvider {
    base_url: String,
    client: reqwest::Client,
}

impl OecdTrackerProvider {
    pub fn new(base_url: &str, client: reqwest::Client) -> Self {
        OecdTrackerProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    fn parse(body: &str) -> SeriesResult<Vec<GdpPoint>> {
        let response: SeriesResponse = serde_json::from_str(body)
            .map_err(|e| SeriesError::malformed(PROVIDER, format!("Failed to parse JSON: {e}")))?;
        let doc = response
            .series
            .docs
            .into_iter()
            .next()
            .ok_or_else(|| SeriesError::malformed(PROVIDER, "series has no documents"))?;

        if doc.period.len() != doc.value.len() {
            return Err(SeriesError::malformed(
                PROVIDER,
                format!(
                    "{} periods but {} values",
                    doc.period.len(),
                    doc.value.len()
                ),
            ));
        }

        Ok(doc
            .period
            .iter()
            .zip(doc.value.iter())
            .filter_map(|(period, value)| {
                Some(GdpPoint {
                    date: period_end(period)?,
                    growth_percent: value.as_f64()?,
                    source_provider: ProviderKind::Oecd,
                })
            })
            .collect())
    }
}

#[async_trait]
impl GdpSeriesProvider for OecdTrackerProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Oecd
    }

    fn check_available(&self, country: &Country) -> Result<(), String> {
        match country.oecd {
            Some(_) => Ok(()),
            None => Err(format!("no OECD tracker code for {}", country.key)),
        }
    }

    #[instrument(name = "OecdGdpFetch", skip(self, country), fields(country = %country.key))]
    async fn fetch_gdp(&self, country: &Country) -> SeriesResult<Vec<GdpPoint>> {
        let code = country.oecd.as_deref().ok_or_else(|| {
            SeriesError::unavailable(PROVIDER, format!("no tracker code for {}", country.key))
        })?;
        let url = format!(
            "{}/v22/series/{}/{}?observations=1&format=json",
            self.base_url, DATASET, code
        );
        let body = fetch_body(&self.client, PROVIDER, &url).await?;

        let points = Self::parse(&body)?;
        debug!("Parsed {} tracker points for {}", points.len(), code);
        if points.is_empty() {
            return Err(SeriesError::unavailable(
                PROVIDER,
                format!("No tracker values for {code}"),
            ));
        }
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::util::http_client;
    use crate::core::country::CountryTable;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MOCK_JSON: &str = r#"{
        "series": {
            "docs": [{
                "dataset_code": "GDP_GROWTH",
                "series_code": "ITA",
                "period": ["2020-03-29", "2020-04-05", "2020-04-12", "2020-04-19"],
                "value": [-20.1, "NA", -27.4, -26.0]
            }]
        }
    }"#;

    fn italy() -> Country {
        CountryTable::builtin().lookup("IT").unwrap().clone()
    }

    async fn create_mock_server(body: &str, status_code: u16) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v22/series/OECD/GDP_GROWTH/ITA"))
            .and(query_param("observations", "1"))
            .respond_with(ResponseTemplate::new(status_code).set_body_string(body))
            .mount(&mock_server)
            .await;
        mock_server
    }

    #[tokio::test]
    async fn test_fetch_skips_missing_values() {
        let mock_server = create_mock_server(MOCK_JSON, 200).await;
        let provider = OecdTrackerProvider::new(&mock_server.uri(), http_client().unwrap());

        let points = provider.fetch_gdp(&italy()).await.unwrap();
        let dates: Vec<String> = points.iter().map(|p| p.date.to_string()).collect();
        assert_eq!(dates, vec!["2020-03-29", "2020-04-12", "2020-04-19"]);
        assert_eq!(points[1].growth_percent, -27.4);
        assert!(points.iter().all(|p| p.source_provider == ProviderKind::Oecd));
    }

    #[tokio::test]
    async fn test_no_documents_is_malformed() {
        let mock_server = create_mock_server(r#"{"series": {"docs": []}}"#, 200).await;
        let provider = OecdTrackerProvider::new(&mock_server.uri(), http_client().unwrap());

        let err = provider.fetch_gdp(&italy()).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Malformed response from oecd: series has no documents"
        );
    }

    #[tokio::test]
    async fn test_mismatched_lengths_is_malformed() {
        let body = r#"{"series": {"docs": [{"period": ["2020-03-29"], "value": []}]}}"#;
        let mock_server = create_mock_server(body, 200).await;
        let provider = OecdTrackerProvider::new(&mock_server.uri(), http_client().unwrap());

        let err = provider.fetch_gdp(&italy()).await.unwrap_err();
        assert!(matches!(err, SeriesError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn test_not_found_is_unavailable() {
        let mock_server = create_mock_server("", 404).await;
        let provider = OecdTrackerProvider::new(&mock_server.uri(), http_client().unwrap());

        let err = provider.fetch_gdp(&italy()).await.unwrap_err();
        assert!(matches!(err, SeriesError::UpstreamUnavailable { .. }));
    }

    #[test]
    fn test_availability_requires_code() {
        let provider = OecdTrackerProvider::new("http://localhost", http_client().unwrap());
        assert!(provider.check_available(&italy()).is_ok());

        let mut unmapped = italy();
        unmapped.oecd = None;
        assert_eq!(
            provider.check_available(&unmapped).unwrap_err(),
            "no OECD tracker code for IT"
        );
    }
}
