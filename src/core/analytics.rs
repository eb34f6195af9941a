//! Summary statistics over joined series.
use crate::core::series::JoinedRecord;
use chrono::NaiveDate;
use serde::Serialize;

/// Headline figures for a joined series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesMetrics {
    pub peak_cases: u64,
    pub peak_cases_date: NaiveDate,
    pub worst_gdp: Option<f64>,
    pub worst_gdp_date: Option<NaiveDate>,
    /// Pearson correlation between new cases and GDP growth.
    pub correlation: Option<f64>,
}

impl SeriesMetrics {
    /// Computes metrics for `records`, or `None` when there are no records.
    ///
    /// The peak considers every record; GDP figures and the correlation only
    /// consider records that carry GDP growth. Ties keep the earliest date.
    pub fn from_joined(records: &[JoinedRecord]) -> Option<Self> {
        let first = records.first()?;

        let mut peak_cases = first.new_cases;
        let mut peak_cases_date = first.date;
        for record in records {
            if record.new_cases > peak_cases {
                peak_cases = record.new_cases;
                peak_cases_date = record.date;
            }
        }

        let with_gdp: Vec<(f64, f64, NaiveDate)> = records
            .iter()
            .filter_map(|r| {
                r.gdp_growth_percent
                    .map(|gdp| (r.new_cases as f64, gdp, r.date))
            })
            .collect();

        let mut worst: Option<(f64, NaiveDate)> = None;
        for &(_, gdp, date) in &with_gdp {
            if worst.is_none_or(|(value, _)| gdp < value) {
                worst = Some((gdp, date));
            }
        }

        let xs: Vec<f64> = with_gdp.iter().map(|(x, _, _)| *x).collect();
        let ys: Vec<f64> = with_gdp.iter().map(|(_, y, _)| *y).collect();

        Some(SeriesMetrics {
            peak_cases,
            peak_cases_date,
            worst_gdp: worst.map(|(value, _)| value),
            worst_gdp_date: worst.map(|(_, date)| date),
            correlation: pearson(&xs, &ys),
        })
    }
}

/// Pearson correlation coefficient, `None` with fewer than two samples or
/// when either side has zero variance.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return None;
    }
    let mean_x = xs[..n].iter().sum::<f64>() / n as f64;
    let mean_y = ys[..n].iter().sum::<f64>() / n as f64;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in xs[..n].iter().zip(&ys[..n]) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x > 0.0 && var_y > 0.0 {
        Some(cov / (var_x * var_y).sqrt())
    } else {
        None
    }
}

/// Trailing mean over `window` values. Positions before the window fills are
/// `None`; missing values count as zero.
pub fn rolling_average(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    let mut sum = 0.0;
    values
        .iter()
        .enumerate()
        .map(|(i, value)| {
            sum += value.unwrap_or(0.0);
            if i >= window {
                sum -= values[i - window].unwrap_or(0.0);
            }
            (i + 1 >= window).then(|| sum / window as f64)
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrendDirection {
    Up,
    Down,
    Flat,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Trend {
    pub direction: TrendDirection,
    pub change: f64,
    pub pct: Option<f64>,
}

/// Short-term direction over the trailing `window` values.
///
/// Compares the first and last present value in the window. Changes under 2%
/// (or effectively zero) are flat.
pub fn compute_trend(values: &[Option<f64>], window: usize) -> Option<Trend> {
    if values.len() < 2 {
        return None;
    }
    let start = values.len().saturating_sub(window);
    let mut present = values[start..]
        .iter()
        .filter_map(|v| v.filter(|x| !x.is_nan()));
    let first = present.next()?;
    let last = present.last().unwrap_or(first);

    let change = last - first;
    let pct = (first != 0.0).then(|| change / first.abs() * 100.0);

    let direction = if change.abs() < 1e-6 || pct.is_some_and(|p| p.abs() < 2.0) {
        TrendDirection::Flat
    } else if change > 0.0 {
        TrendDirection::Up
    } else {
        TrendDirection::Down
    };

    Some(Trend {
        direction,
        change,
        pct,
    })
}
