use super::ui;
use crate::core::series::JoinedRecord;
use crate::core::{JoinOptions, SeriesJoiner};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

const HEADER: [&str; 5] = ["date", "newCases", "confirmed", "deaths", "gdpGrowth"];

pub async fn run(
    joiner: &SeriesJoiner,
    country_key: &str,
    options: JoinOptions,
    output: Option<&Path>,
) -> Result<()> {
    let pb = ui::new_spinner(format!("Fetching series for {country_key}"));
    let result = joiner.get_joined_series(country_key, options).await;
    pb.finish_and_clear();
    let series = result.with_context(|| format!("Failed to load series for {country_key}"))?;

    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(default_file_name(&series.country.label)));
    let file = File::create(&path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_csv(file, &series.joined_series)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!(
        "Wrote {} rows to {}",
        series.joined_series.len(),
        ui::style_text(&path.display().to_string(), ui::StyleType::Label)
    );
    Ok(())
}

/// `United States` becomes `united_states.csv`.
pub fn default_file_name(label: &str) -> String {
    let stem: String = label
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect();
    if stem.is_empty() {
        "series.csv".to_string()
    } else {
        format!("{stem}.csv")
    }
}

/// Writes joined records as CSV. Absent values are empty fields.
pub fn write_csv<W: Write>(writer: W, records: &[JoinedRecord]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(HEADER)?;
    for record in records {
        csv_writer.write_record([
            record.date.to_string(),
            record.new_cases.to_string(),
            record.cumulative_confirmed.to_string(),
            record.cumulative_deaths.to_string(),
            record
                .gdp_growth_percent
                .map(|g| g.to_string())
                .unwrap_or_default(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}
