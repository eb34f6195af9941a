//! Ordered GDP provider attempts.
//!
//! A chain is planned up front as an explicit list: the preferred provider
//! (when it can serve the country), then the primary provider, then the
//! primary provider for the configured fallback country. Attempts run one at
//! a time and each observes the previous failure before starting.

use crate::core::country::Country;
use crate::core::error::{SeriesError, SeriesResult};
use crate::core::provider::GdpSeriesProvider;
use crate::core::series::{GdpPoint, ProviderKind, sort_gdp_series};
use std::sync::Arc;
use tracing::{debug, instrument};

#[derive(Debug, Clone, PartialEq)]
pub enum AttemptStatus {
    Skipped(String),
    Failed(SeriesError),
    Succeeded { points: usize },
}

/// What happened to one planned attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptOutcome {
    pub provider: ProviderKind,
    pub country_key: String,
    pub status: AttemptStatus,
}

/// A resolved GDP series together with how it was obtained.
#[derive(Debug, Clone)]
pub struct GdpFetch {
    /// Sorted ascending by date.
    pub points: Vec<GdpPoint>,
    pub provider: ProviderKind,
    pub country_key: String,
    pub attempts: Vec<AttemptOutcome>,
}

impl GdpFetch {
    /// True when the series did not come from the first planned attempt.
    pub fn fell_back(&self) -> bool {
        self.attempts
            .iter()
            .any(|a| !matches!(a.status, AttemptStatus::Succeeded { .. }))
    }
}

pub struct GdpAttempt {
    provider: Option<Arc<dyn GdpSeriesProvider>>,
    kind: ProviderKind,
    country: Country,
    skip_reason: Option<String>,
}

impl GdpAttempt {
    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    pub fn country_key(&self) -> &str {
        &self.country.key
    }

    pub fn is_skipped(&self) -> bool {
        self.skip_reason.is_some()
    }
}

pub struct GdpChain {
    primary: Arc<dyn GdpSeriesProvider>,
    secondaries: Vec<Arc<dyn GdpSeriesProvider>>,
    fallback_country: Option<Country>,
}

impl GdpChain {
    pub fn new(primary: Arc<dyn GdpSeriesProvider>) -> Self {
        GdpChain {
            primary,
            secondaries: Vec::new(),
            fallback_country: None,
        }
    }

    pub fn with_secondary(mut self, provider: Arc<dyn GdpSeriesProvider>) -> Self {
        self.secondaries.push(provider);
        self
    }

    pub fn with_fallback_country(mut self, country: Option<Country>) -> Self {
        self.fallback_country = country;
        self
    }

    fn attempt_for(&self, provider: &Arc<dyn GdpSeriesProvider>, country: &Country) -> GdpAttempt {
        GdpAttempt {
            provider: Some(Arc::clone(provider)),
            kind: provider.kind(),
            country: country.clone(),
            skip_reason: provider.check_available(country).err(),
        }
    }

    pub fn plan(&self, country: &Country, preferred: ProviderKind) -> Vec<GdpAttempt> {
        let mut attempts = Vec::new();

        if preferred != self.primary.kind() {
            match self.secondaries.iter().find(|p| p.kind() == preferred) {
                Some(provider) => attempts.push(self.attempt_for(provider, country)),
                None => attempts.push(GdpAttempt {
                    provider: None,
                    kind: preferred,
                    country: country.clone(),
                    skip_reason: Some(format!("{preferred} provider is not configured")),
                }),
            }
        }

        attempts.push(self.attempt_for(&self.primary, country));

        if let Some(fallback) = &self.fallback_country
            && !fallback.key.eq_ignore_ascii_case(&country.key)
        {
            attempts.push(self.attempt_for(&self.primary, fallback));
        }

        attempts
    }

    /// Runs the planned attempts in order until one yields a non-empty series.
    #[instrument(name = "GdpChainFetch", skip(self, country), fields(country = %country.key))]
    pub async fn fetch(&self, country: &Country, preferred: ProviderKind) -> SeriesResult<GdpFetch> {
        let mut outcomes = Vec::new();
        let mut last_error: Option<SeriesError> = None;

        for attempt in self.plan(country, preferred) {
            let status = match (&attempt.provider, &attempt.skip_reason) {
                (_, Some(reason)) => AttemptStatus::Skipped(reason.clone()),
                (None, None) => AttemptStatus::Skipped("no provider".to_string()),
                (Some(provider), None) => match provider.fetch_gdp(&attempt.country).await {
                    Ok(mut points) if !points.is_empty() => {
                        sort_gdp_series(&mut points);
                        outcomes.push(AttemptOutcome {
                            provider: attempt.kind,
                            country_key: attempt.country.key.clone(),
                            status: AttemptStatus::Succeeded {
                                points: points.len(),
                            },
                        });
                        return Ok(GdpFetch {
                            points,
                            provider: attempt.kind,
                            country_key: attempt.country.key,
                            attempts: outcomes,
                        });
                    }
                    Ok(_) => {
                        let err = SeriesError::unavailable(
                            &attempt.kind.to_string(),
                            format!("empty series for {}", attempt.country.key),
                        );
                        last_error = Some(err.clone());
                        AttemptStatus::Failed(err)
                    }
                    Err(err) => {
                        last_error = Some(err.clone());
                        AttemptStatus::Failed(err)
                    }
                },
            };
            debug!(provider = %attempt.kind, ?status, "GDP attempt did not produce a series");
            outcomes.push(AttemptOutcome {
                provider: attempt.kind,
                country_key: attempt.country.key,
                status,
            });
        }

        let reason = last_error.map_or_else(
            || "no GDP provider could be attempted".to_string(),
            |e| e.to_string(),
        );
        Err(SeriesError::unavailable("GDP providers", reason))
    }
}
