use super::util::fetch_body;
use crate::core::config::TradingEconomicsIndicator;
use crate::core::country::Country;
use crate::core::error::{SeriesError, SeriesResult};
use crate::core::provider::GdpSeriesProvider;
use crate::core::series::{GdpPoint, ProviderKind, growth_from_levels, period_end};
use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, instrument};

const PROVIDER: &str = "tradingeconomics";

#[derive(Debug, Deserialize)]
struct HistoricalRow {
    #[serde(rename = "DateTime")]
    date_time: String,
    #[serde(rename = "Value")]
    value: Option<f64>,
}

/// Token-gated historical indicator feed, keyed by lower-case country name.
pub struct TradingEconomicsProvider {
    base_url: String,
    token: Option<String>,
    indicator: TradingEconomicsIndicator,
    client: reqwest::Client,
}

impl TradingEconomicsProvider {
    pub fn new(
        base_url: &str,
        token: Option<String>,
        indicator: TradingEconomicsIndicator,
        client: reqwest::Client,
    ) -> Self {
        TradingEconomicsProvider {
            base_url: base_url.to_string(),
            token,
            indicator,
            client,
        }
    }

    fn url(&self, name: &str, token: &str) -> SeriesResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| SeriesError::unavailable(PROVIDER, format!("Invalid base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| SeriesError::unavailable(PROVIDER, "Base URL cannot have a path"))?
            .pop_if_empty()
            .extend(["historical", "country", name, "indicator", self.indicator.path_segment()]);
        url.query_pairs_mut()
            .append_pair("c", token)
            .append_pair("f", "json");
        Ok(url)
    }

    fn to_points(&self, rows: Vec<HistoricalRow>) -> Vec<GdpPoint> {
        // Null values stay in place so level gaps are not bridged.
        let observations: Vec<_> = rows
            .into_iter()
            .filter_map(|row| Some((period_end(&row.date_time)?, row.value)))
            .collect();

        match self.indicator {
            TradingEconomicsIndicator::Growth => observations
                .into_iter()
                .filter_map(|(date, growth)| {
                    Some(GdpPoint {
                        date,
                        growth_percent: growth?,
                        source_provider: ProviderKind::TradingEconomics,
                    })
                })
                .collect(),
            TradingEconomicsIndicator::Level => {
                growth_from_levels(&observations, ProviderKind::TradingEconomics)
            }
        }
    }
}

#[async_trait]
impl GdpSeriesProvider for TradingEconomicsProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::TradingEconomics
    }

    fn check_available(&self, country: &Country) -> Result<(), String> {
        if self.token.is_none() {
            return Err("no access token configured".to_string());
        }
        if country.trading_economics.is_none() {
            return Err(format!("no Trading Economics name for {}", country.key));
        }
        Ok(())
    }

    #[instrument(name = "TradingEconomicsGdpFetch", skip(self, country), fields(country = %country.key))]
    async fn fetch_gdp(&self, country: &Country) -> SeriesResult<Vec<GdpPoint>> {
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| SeriesError::unavailable(PROVIDER, "no access token configured"))?;
        let name = country.trading_economics.as_deref().ok_or_else(|| {
            SeriesError::unavailable(PROVIDER, format!("no country name for {}", country.key))
        })?;

        let url = self.url(name, token)?;
        let body = fetch_body(&self.client, PROVIDER, url.as_str()).await?;

        let rows: Vec<HistoricalRow> = serde_json::from_str(&body)
            .map_err(|e| SeriesError::malformed(PROVIDER, format!("Failed to parse JSON: {e}")))?;
        debug!("Received {} rows for {}", rows.len(), name);

        let points = self.to_points(rows);
        if points.is_empty() {
            return Err(SeriesError::unavailable(
                PROVIDER,
                format!("No usable {} values for {}", self.indicator.path_segment(), name),
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

    const GROWTH_JSON: &str = r#"[
        {"Country": "Germany", "Category": "GDP Growth Rate", "DateTime": "2020-03-31T00:00:00", "Value": -1.9, "Frequency": "Quarterly"},
        {"Country": "Germany", "Category": "GDP Growth Rate", "DateTime": "2020-06-30T00:00:00", "Value": -9.7, "Frequency": "Quarterly"},
        {"Country": "Germany", "Category": "GDP Growth Rate", "DateTime": "2020-09-30T00:00:00", "Value": null, "Frequency": "Quarterly"}
    ]"#;

    const LEVEL_JSON: &str = r#"[
        {"DateTime": "2019-12-31T00:00:00", "Value": 4000.0},
        {"DateTime": "2020-12-31T00:00:00", "Value": 3800.0},
        {"DateTime": "2021-12-31T00:00:00", "Value": 3990.0}
    ]"#;

    fn germany() -> Country {
        CountryTable::builtin().lookup("DE").unwrap().clone()
    }

    async fn create_mock_server(indicator_path: &str, body: &str, status_code: u16) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/historical/country/germany/indicator/{indicator_path}")))
            .and(query_param("c", "secret"))
            .and(query_param("f", "json"))
            .respond_with(ResponseTemplate::new(status_code).set_body_string(body))
            .mount(&mock_server)
            .await;
        mock_server
    }

    #[tokio::test]
    async fn test_growth_indicator_used_as_is() {
        let mock_server = create_mock_server("gdp%20growth%20rate", GROWTH_JSON, 200).await;
        let provider = TradingEconomicsProvider::new(
            &mock_server.uri(),
            Some("secret".to_string()),
            TradingEconomicsIndicator::Growth,
            http_client().unwrap(),
        );

        let points = provider.fetch_gdp(&germany()).await.unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date.to_string(), "2020-03-31");
        assert_eq!(points[1].growth_percent, -9.7);
        assert_eq!(points[1].source_provider, ProviderKind::TradingEconomics);
    }

    #[tokio::test]
    async fn test_level_indicator_is_derived() {
        let mock_server = create_mock_server("gdp", LEVEL_JSON, 200).await;
        let provider = TradingEconomicsProvider::new(
            &mock_server.uri(),
            Some("secret".to_string()),
            TradingEconomicsIndicator::Level,
            http_client().unwrap(),
        );

        let points = provider.fetch_gdp(&germany()).await.unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date.to_string(), "2020-12-31");
        assert!((points[0].growth_percent - -5.0).abs() < 1e-9);
        assert!((points[1].growth_percent - 5.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_level_gap_is_not_bridged() {
        const GAPPED_LEVEL_JSON: &str = r#"[
            {"DateTime": "2019-12-31T00:00:00", "Value": 100.0},
            {"DateTime": "2020-12-31T00:00:00", "Value": null},
            {"DateTime": "2021-12-31T00:00:00", "Value": 110.0}
        ]"#;
        let mock_server = create_mock_server("gdp", GAPPED_LEVEL_JSON, 200).await;
        let provider = TradingEconomicsProvider::new(
            &mock_server.uri(),
            Some("secret".to_string()),
            TradingEconomicsIndicator::Level,
            http_client().unwrap(),
        );

        let err = provider.fetch_gdp(&germany()).await.unwrap_err();
        assert!(matches!(err, SeriesError::UpstreamUnavailable { .. }));
        assert!(err.to_string().contains("No usable gdp values"));
    }

    #[tokio::test]
    async fn test_forbidden_is_unavailable() {
        let mock_server = create_mock_server("gdp%20growth%20rate", "", 403).await;
        let provider = TradingEconomicsProvider::new(
            &mock_server.uri(),
            Some("secret".to_string()),
            TradingEconomicsIndicator::Growth,
            http_client().unwrap(),
        );

        let err = provider.fetch_gdp(&germany()).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "tradingeconomics unavailable: HTTP error: 403 Forbidden"
        );
    }

    #[test]
    fn test_availability() {
        let provider = TradingEconomicsProvider::new(
            "http://localhost",
            None,
            TradingEconomicsIndicator::Growth,
            http_client().unwrap(),
        );
        assert!(provider.check_available(&germany()).unwrap_err().contains("token"));

        let provider = TradingEconomicsProvider::new(
            "http://localhost",
            Some("t".to_string()),
            TradingEconomicsIndicator::Growth,
            http_client().unwrap(),
        );
        assert!(provider.check_available(&germany()).is_ok());

        let mut unmapped = germany();
        unmapped.trading_economics = None;
        assert!(provider.check_available(&unmapped).is_err());
    }
}
