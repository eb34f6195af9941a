use super::ui;
use crate::core::simulator::{SimulationParams, SimulationState, simulate};
use anyhow::{Context, Result};
use comfy_table::{Attribute, Cell, Table};
use std::fs::File;
use std::io::Write;
use std::path::Path;

pub fn run(params: &SimulationParams, every: usize, csv_path: Option<&Path>) -> Result<()> {
    if !params.dt.is_finite() || params.dt <= 0.0 {
        anyhow::bail!("Time step must be a positive number, got {}", params.dt);
    }
    let states = simulate(params);

    if let Some(path) = csv_path {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        write_csv(file, &states)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Wrote {} states to {}", states.len(), path.display());
        return Ok(());
    }

    if states.is_empty() {
        println!("No steps to simulate.");
        return Ok(());
    }
    println!(
        "\n{}",
        ui::style_text("Healthy/infected simulation", ui::StyleType::Title)
    );
    println!("{}", build_table(&states, every));
    Ok(())
}

/// Every `every`-th state, always ending with the final state.
pub fn sample(states: &[SimulationState], every: usize) -> Vec<&SimulationState> {
    let every = every.max(1);
    let mut sampled: Vec<&SimulationState> = states.iter().step_by(every).collect();
    if let Some(last) = states.last()
        && (states.len() - 1) % every != 0
    {
        sampled.push(last);
    }
    sampled
}

fn build_table(states: &[SimulationState], every: usize) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Time"),
        ui::header_cell("Healthy"),
        ui::header_cell("Infected"),
    ]);
    let sampled = sample(states, every);
    let last_index = sampled.len().saturating_sub(1);
    for (i, state) in sampled.into_iter().enumerate() {
        let mut time = Cell::new(format!("{:.2}", state.time));
        if i == last_index {
            time = time.add_attribute(Attribute::Bold);
        }
        table.add_row(vec![
            time,
            ui::number_cell(format!("{:.3}", state.healthy)),
            ui::number_cell(format!("{:.3}", state.infected)),
        ]);
    }
    table
}

pub fn write_csv<W: Write>(writer: W, states: &[SimulationState]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["time", "healthy", "infected"])?;
    for state in states {
        csv_writer.write_record([
            state.time.to_string(),
            state.healthy.to_string(),
            state.infected.to_string(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn states(n: usize) -> Vec<SimulationState> {
        (0..n)
            .map(|i| SimulationState {
                time: i as f64,
                healthy: 1.0,
                infected: 0.5,
            })
            .collect()
    }

    #[test]
    fn test_sample_includes_final_state() {
        let all = states(10);
        let times: Vec<f64> = sample(&all, 4).iter().map(|s| s.time).collect();
        assert_eq!(times, vec![0.0, 4.0, 8.0, 9.0]);

        let times: Vec<f64> = sample(&all, 3).iter().map(|s| s.time).collect();
        assert_eq!(times, vec![0.0, 3.0, 6.0, 9.0]);
    }

    #[test]
    fn test_sample_zero_every_means_all() {
        assert_eq!(sample(&states(3), 0).len(), 3);
        assert!(sample(&[], 5).is_empty());
    }

    #[test]
    fn test_write_csv() -> Result<()> {
        let mut buf = Vec::new();
        write_csv(&mut buf, &states(2))?;
        assert_eq!(
            String::from_utf8(buf)?,
            "time,healthy,infected\n0,1,0.5\n1,1,0.5\n"
        );
        Ok(())
    }

    #[test]
    fn test_run_rejects_bad_time_step() {
        let params = SimulationParams {
            dt: 0.0,
            ..SimulationParams::default()
        };
        assert!(run(&params, 10, None).is_err());
    }
}
