use super::ui;
use crate::core::analytics::SeriesMetrics;
use crate::core::{JoinOptions, JoinedSeries, SeriesJoiner, SeriesResult};
use anyhow::Result;
use comfy_table::{Cell, Table};
use futures::future::join_all;

struct CountryRow {
    key: String,
    result: SeriesResult<JoinedSeries>,
}

/// Fetches every configured country concurrently and prints one row each.
pub async fn run(joiner: &SeriesJoiner, options: JoinOptions) -> Result<()> {
    let keys: Vec<String> = joiner.countries().iter().map(|c| c.key.clone()).collect();
    if keys.is_empty() {
        println!("No countries configured.");
        return Ok(());
    }

    let pb = ui::new_progress_bar(keys.len() as u64);
    let futures = keys.into_iter().map(|key| {
        let pb_clone = pb.clone();
        async move {
            let result = joiner.get_joined_series(&key, options).await;
            pb_clone.inc(1);
            CountryRow { key, result }
        }
    });
    let rows = join_all(futures).await;
    pb.finish_and_clear();

    println!("\n{}", ui::style_text("Country overview", ui::StyleType::Title));
    println!("{}", build_table(&rows));
    Ok(())
}

fn build_table(rows: &[CountryRow]) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Country"),
        ui::header_cell("Days"),
        ui::header_cell("Peak new cases"),
        ui::header_cell("Worst GDP growth"),
        ui::header_cell("Correlation"),
        ui::header_cell("GDP source"),
    ]);

    for row in rows {
        match &row.result {
            Ok(series) => {
                let metrics = SeriesMetrics::from_joined(&series.joined_series);
                table.add_row(vec![
                    Cell::new(&series.country.label),
                    ui::number_cell(series.joined_series.len().to_string()),
                    ui::format_optional_cell(metrics.as_ref().map(|m| m.peak_cases), |v| {
                        v.to_string()
                    }),
                    ui::growth_cell(metrics.as_ref().and_then(|m| m.worst_gdp)),
                    ui::format_optional_cell(metrics.as_ref().and_then(|m| m.correlation), |v| {
                        format!("{v:.3}")
                    }),
                    Cell::new(format!("{} ({})", series.gdp.provider, series.gdp.country_key)),
                ]);
            }
            Err(e) => {
                table.add_row(vec![
                    Cell::new(&row.key),
                    Cell::new(ui::style_text(&e.to_string(), ui::StyleType::Error)),
                ]);
            }
        }
    }
    table
}
