use super::ui;
use crate::core::analytics::{self, SeriesMetrics, TrendDirection};
use crate::core::fallback::{AttemptStatus, GdpFetch};
use crate::core::{CountryTable, JoinOptions, JoinedSeries, SeriesJoiner};
use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

const ROLLING_WINDOW: usize = 7;
const TREND_WINDOW: usize = 14;

pub async fn run(
    joiner: &SeriesJoiner,
    country_key: &str,
    options: JoinOptions,
    tail: usize,
) -> Result<()> {
    let pb = ui::new_spinner(format!("Fetching series for {country_key}"));
    let result = joiner.get_joined_series(country_key, options).await;
    pb.finish_and_clear();

    let series = result.with_context(|| format!("Failed to load series for {country_key}"))?;
    display(&series, tail);
    Ok(())
}

pub fn display(series: &JoinedSeries, tail: usize) {
    println!(
        "\nCountry: {}",
        ui::style_text(&series.country.label, ui::StyleType::Title)
    );
    println!(
        "GDP source: {}",
        ui::style_text(&gdp_source_label(&series.gdp), ui::StyleType::Label)
    );
    if series.gdp.fell_back() {
        for note in attempt_notes(&series.gdp) {
            println!("  {}", ui::style_text(&note, ui::StyleType::Warning));
        }
    }

    if series.joined_series.is_empty() {
        println!("No case data available.");
        return;
    }

    println!("{}", build_series_table(series, tail));
    println!("{}", build_metrics_table(series));
}

pub fn gdp_source_label(gdp: &GdpFetch) -> String {
    format!("{} ({}), {} points", gdp.provider, gdp.country_key, gdp.points.len())
}

/// One line per planned attempt that did not produce the series.
pub fn attempt_notes(gdp: &GdpFetch) -> Vec<String> {
    gdp.attempts
        .iter()
        .filter_map(|attempt| {
            let what = format!("{} ({})", attempt.provider, attempt.country_key);
            match &attempt.status {
                AttemptStatus::Skipped(reason) => Some(format!("{what} skipped: {reason}")),
                AttemptStatus::Failed(error) => Some(format!("{what} failed: {error}")),
                AttemptStatus::Succeeded { .. } => None,
            }
        })
        .collect()
}

/// The last `tail` joined records, with a trailing average of new cases.
pub fn build_series_table(series: &JoinedSeries, tail: usize) -> Table {
    let records = &series.joined_series;
    let new_cases: Vec<Option<f64>> = records.iter().map(|r| Some(r.new_cases as f64)).collect();
    let averages = analytics::rolling_average(&new_cases, ROLLING_WINDOW);

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Date"),
        ui::header_cell("New cases"),
        ui::header_cell(&format!("{ROLLING_WINDOW}-day avg")),
        ui::header_cell("Confirmed"),
        ui::header_cell("Deaths"),
        ui::header_cell("GDP growth"),
    ]);

    let start = records.len().saturating_sub(tail);
    for (record, average) in records[start..].iter().zip(&averages[start..]) {
        table.add_row(vec![
            Cell::new(record.date.to_string()),
            ui::number_cell(record.new_cases.to_string()),
            ui::format_optional_cell(*average, |v| format!("{v:.1}")),
            ui::number_cell(record.cumulative_confirmed.to_string()),
            ui::number_cell(record.cumulative_deaths.to_string()),
            ui::growth_cell(record.gdp_growth_percent),
        ]);
    }
    table
}

pub fn build_metrics_table(series: &JoinedSeries) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Metric"), ui::header_cell("Value")]);

    if let Some(metrics) = SeriesMetrics::from_joined(&series.joined_series) {
        table.add_row(vec![
            Cell::new("Peak new cases"),
            ui::number_cell(format!("{} on {}", metrics.peak_cases, metrics.peak_cases_date)),
        ]);
        let worst = match (metrics.worst_gdp, metrics.worst_gdp_date) {
            (Some(value), Some(date)) => ui::number_cell(format!("{value:.2}% on {date}")),
            _ => ui::format_optional_cell(None::<f64>, |v| v.to_string()),
        };
        table.add_row(vec![Cell::new("Worst GDP growth"), worst]);
        table.add_row(vec![
            Cell::new("Cases/GDP correlation"),
            ui::format_optional_cell(metrics.correlation, |v| format!("{v:.3}")),
        ]);
    }

    let new_cases: Vec<Option<f64>> = series
        .joined_series
        .iter()
        .map(|r| Some(r.new_cases as f64))
        .collect();
    let trend = analytics::compute_trend(&new_cases, TREND_WINDOW).map(|trend| {
        let arrow = match trend.direction {
            TrendDirection::Up => "rising",
            TrendDirection::Down => "falling",
            TrendDirection::Flat => "flat",
        };
        match trend.pct {
            Some(pct) => format!("{arrow} ({pct:+.1}%)"),
            None => arrow.to_string(),
        }
    });
    table.add_row(vec![
        Cell::new(format!("{TREND_WINDOW}-day case trend")),
        ui::format_optional_cell(trend, |v| v),
    ]);
    table
}

pub fn display_countries(countries: &CountryTable) {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Key"),
        ui::header_cell("Label"),
        ui::header_cell("Case key"),
        ui::header_cell("ISO-3"),
        ui::header_cell("Preferred GDP"),
    ]);
    for country in countries.iter() {
        table.add_row(vec![
            Cell::new(&country.key),
            Cell::new(&country.label),
            Cell::new(&country.case_key),
            Cell::new(&country.iso3),
            Cell::new(country.preferred.to_string()),
        ]);
    }
    println!("{table}");
}
