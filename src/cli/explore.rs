//! Interactive country switching.
//!
//! Each line read from stdin selects a country and starts a fetch in the
//! background. Fetches may finish in any order; only the result for the most
//! recent selection is rendered.

use super::{series, ui};
use crate::core::selection::{Selection, SelectionTracker};
use crate::core::{JoinOptions, JoinedSeries, SeriesJoiner, SeriesResult};
use anyhow::Result;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinSet;
use tracing::debug;

#[derive(Debug, PartialEq)]
pub enum Received {
    Applied,
    Failed(String),
    Stale,
}

/// Holds the series currently on screen.
#[derive(Default)]
pub struct Explorer {
    tracker: SelectionTracker,
    current: Option<JoinedSeries>,
}

impl Explorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&self) -> Selection {
        self.tracker.begin()
    }

    pub fn current(&self) -> Option<&JoinedSeries> {
        self.current.as_ref()
    }

    /// Accepts a finished fetch. Results for superseded selections are dropped,
    /// successful or not.
    pub fn receive(&mut self, selection: Selection, result: SeriesResult<JoinedSeries>) -> Received {
        if !self.tracker.is_current(&selection) {
            return Received::Stale;
        }
        match result {
            Ok(series) => {
                if self.tracker.apply(&selection, series, &mut self.current) {
                    Received::Applied
                } else {
                    Received::Stale
                }
            }
            Err(e) => Received::Failed(e.to_string()),
        }
    }
}

pub async fn run(joiner: Arc<SeriesJoiner>, options: JoinOptions, tail: usize) -> Result<()> {
    println!(
        "{}",
        ui::style_text(
            "Enter a country key per line (empty line or EOF to quit).",
            ui::StyleType::Subtle
        )
    );

    let mut explorer = Explorer::new();
    let mut tasks: JoinSet<(Selection, String, SeriesResult<JoinedSeries>)> = JoinSet::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut reading = true;

    while reading || !tasks.is_empty() {
        tokio::select! {
            line = lines.next_line(), if reading => {
                let key = line?.map(|l| l.trim().to_string()).unwrap_or_default();
                if key.is_empty() {
                    reading = false;
                    continue;
                }
                let selection = explorer.select();
                debug!(generation = selection.generation(), %key, "Selected country");
                let joiner = Arc::clone(&joiner);
                tasks.spawn(async move {
                    let result = joiner.get_joined_series(&key, options).await;
                    (selection, key, result)
                });
            }
            Some(joined) = tasks.join_next() => {
                let (selection, key, result) = joined?;
                match explorer.receive(selection, result) {
                    Received::Applied => {
                        if let Some(current) = explorer.current() {
                            series::display(current, tail);
                        }
                    }
                    Received::Failed(reason) => {
                        println!("{}", ui::style_text(&format!("{key}: {reason}"), ui::StyleType::Error));
                    }
                    Received::Stale => {
                        debug!(generation = selection.generation(), %key, "Dropped stale result");
                    }
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fallback::GdpFetch;
    use crate::core::series::ProviderKind;
    use crate::core::{CountryTable, SeriesError};

    fn series_for(key: &str) -> JoinedSeries {
        JoinedSeries {
            country: CountryTable::builtin().lookup(key).unwrap().clone(),
            case_series: Vec::new(),
            gdp: GdpFetch {
                points: Vec::new(),
                provider: ProviderKind::WorldBank,
                country_key: key.to_string(),
                attempts: Vec::new(),
            },
            joined_series: Vec::new(),
        }
    }

    #[test]
    fn test_late_result_for_earlier_selection_is_dropped() {
        let mut explorer = Explorer::new();
        let first = explorer.select();
        let second = explorer.select();

        assert_eq!(explorer.receive(second, Ok(series_for("IT"))), Received::Applied);
        assert_eq!(explorer.receive(first, Ok(series_for("DE"))), Received::Stale);
        assert_eq!(explorer.current().unwrap().country.key, "IT");
    }

    #[test]
    fn test_stale_failure_is_not_reported() {
        let mut explorer = Explorer::new();
        let first = explorer.select();
        let _second = explorer.select();

        let err = SeriesError::UnknownCountry("XX".to_string());
        assert_eq!(explorer.receive(first, Err(err)), Received::Stale);
        assert!(explorer.current().is_none());
    }

    #[test]
    fn test_current_failure_keeps_previous_series() {
        let mut explorer = Explorer::new();
        let first = explorer.select();
        assert_eq!(explorer.receive(first, Ok(series_for("DE"))), Received::Applied);

        let second = explorer.select();
        let result = explorer.receive(second, Err(SeriesError::UnknownCountry("XX".to_string())));
        assert_eq!(result, Received::Failed("Unknown country: XX".to_string()));
        assert_eq!(explorer.current().unwrap().country.key, "DE");
    }
}
