//! Date-keyed case and GDP series, and the step-function join between them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt::Display;
use std::str::FromStr;

/// Upstream source a GDP point came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    WorldBank,
    TradingEconomics,
    Oecd,
}

impl Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                ProviderKind::WorldBank => "worldbank",
                ProviderKind::TradingEconomics => "tradingeconomics",
                ProviderKind::Oecd => "oecd",
            }
        )
    }
}

impl FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "worldbank" | "wb" => Ok(ProviderKind::WorldBank),
            "tradingeconomics" | "te" => Ok(ProviderKind::TradingEconomics),
            "oecd" | "oecdtracker" => Ok(ProviderKind::Oecd),
            _ => Err(anyhow::anyhow!("Invalid GDP provider: {}", s)),
        }
    }
}

/// One row of a cumulative daily case feed, as reported upstream.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseObservation {
    pub date: NaiveDate,
    pub confirmed: u64,
    pub deaths: Option<u64>,
    pub recovered: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseRecord {
    pub date: NaiveDate,
    pub cumulative_confirmed: u64,
    pub cumulative_deaths: u64,
    pub recovered: Option<u64>,
    pub new_cases: u64,
    pub new_deaths: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GdpPoint {
    pub date: NaiveDate,
    pub growth_percent: f64,
    pub source_provider: ProviderKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinedRecord {
    pub date: NaiveDate,
    pub new_cases: u64,
    pub cumulative_confirmed: u64,
    pub cumulative_deaths: u64,
    pub gdp_growth_percent: Option<f64>,
}

/// Derives daily deltas from a cumulative feed.
///
/// Rows are ordered by date first. The first record's delta is its own
/// cumulative value; every later delta is `max(0, current - previous)`, so a
/// downward revision yields zero rather than a negative count.
pub fn derive_case_series(mut rows: Vec<CaseObservation>) -> Vec<CaseRecord> {
    rows.sort_by_key(|row| row.date);

    let mut previous: Option<&CaseObservation> = None;
    let mut records = Vec::with_capacity(rows.len());
    for row in &rows {
        let (new_cases, new_deaths) = match previous {
            None => (row.confirmed, row.deaths),
            Some(prev) => (
                row.confirmed.saturating_sub(prev.confirmed),
                match (row.deaths, prev.deaths) {
                    (Some(current), Some(before)) => Some(current.saturating_sub(before)),
                    _ => None,
                },
            ),
        };

        records.push(CaseRecord {
            date: row.date,
            cumulative_confirmed: row.confirmed,
            cumulative_deaths: row.deaths.unwrap_or(0),
            recovered: row.recovered,
            new_cases,
            new_deaths,
        });
        previous = Some(row);
    }
    records
}

/// Converts a level series into period-over-period growth percentages.
///
/// Growth is only computed between adjacent observations. The first level has
/// no predecessor and produces no point. A missing level breaks the chain: it
/// produces no point and neither does the level after it. A point whose
/// previous level is zero is undefined and is skipped as well.
pub fn growth_from_levels(
    levels: &[(NaiveDate, Option<f64>)],
    provider: ProviderKind,
) -> Vec<GdpPoint> {
    let mut sorted = levels.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(&b.0).then(cmp_level(a.1, b.1)));

    sorted
        .windows(2)
        .filter_map(|pair| {
            let (_, previous) = pair[0];
            let (date, current) = pair[1];
            let (previous, current) = (previous?, current?);
            if previous == 0.0 || !previous.is_finite() || !current.is_finite() {
                return None;
            }
            Some(GdpPoint {
                date,
                growth_percent: (current - previous) / previous * 100.0,
                source_provider: provider,
            })
        })
        .collect()
}

fn cmp_level(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        _ => a.is_some().cmp(&b.is_some()),
    }
}

fn canonical_cmp(a: &GdpPoint, b: &GdpPoint) -> Ordering {
    a.date
        .cmp(&b.date)
        .then(a.growth_percent.total_cmp(&b.growth_percent))
        .then(a.source_provider.cmp(&b.source_provider))
}

/// Sorts GDP points by date, breaking ties with a total order on the value so
/// that every permutation of the same points sorts identically.
pub fn sort_gdp_series(points: &mut [GdpPoint]) {
    points.sort_by(canonical_cmp);
}

fn is_canonical(points: &[GdpPoint]) -> bool {
    points
        .windows(2)
        .all(|pair| canonical_cmp(&pair[0], &pair[1]) != Ordering::Greater)
}

/// Step-function join of GDP growth onto each case date.
///
/// Every case record takes the growth of the latest GDP point dated on or
/// before it, or `None` if no point precedes it. `case_series` must be in
/// ascending date order. The GDP pointer only moves forward, so the cost is
/// O(n + m).
pub fn join(case_series: &[CaseRecord], gdp_series: &[GdpPoint]) -> Vec<JoinedRecord> {
    let gdp: Cow<'_, [GdpPoint]> = if is_canonical(gdp_series) {
        Cow::Borrowed(gdp_series)
    } else {
        let mut owned = gdp_series.to_vec();
        sort_gdp_series(&mut owned);
        Cow::Owned(owned)
    };

    let mut next = 0;
    let mut current: Option<f64> = None;
    case_series
        .iter()
        .map(|case| {
            while next < gdp.len() && gdp[next].date <= case.date {
                current = Some(gdp[next].growth_percent);
                next += 1;
            }
            JoinedRecord {
                date: case.date,
                new_cases: case.new_cases,
                cumulative_confirmed: case.cumulative_confirmed,
                cumulative_deaths: case.cumulative_deaths,
                gdp_growth_percent: current,
            }
        })
        .collect()
}

fn month_end(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

/// Aligns a reporting-period label to the last day of that period.
///
/// Accepts `2020` (year), `2020Q2` (quarter), `2020M03` or `2020-03` (month),
/// and full dates with or without a time part.
pub fn period_end(label: &str) -> Option<NaiveDate> {
    let label = label.trim();
    if let Some((date, _time)) = label.split_once('T') {
        return NaiveDate::parse_from_str(date, "%Y-%m-%d").ok();
    }
    if let Ok(date) = NaiveDate::parse_from_str(label, "%Y-%m-%d") {
        return Some(date);
    }
    if label.len() == 4 {
        let year: i32 = label.parse().ok()?;
        return NaiveDate::from_ymd_opt(year, 12, 31);
    }

    let year: i32 = label.get(..4)?.parse().ok()?;
    let rest = label.get(4..)?;
    if let Some(quarter) = rest.strip_prefix('Q').or_else(|| rest.strip_prefix('q')) {
        let quarter: u32 = quarter.parse().ok()?;
        if !(1..=4).contains(&quarter) {
            return None;
        }
        return month_end(year, quarter * 3);
    }
    let month = rest
        .strip_prefix('M')
        .or_else(|| rest.strip_prefix('-'))?
        .parse::<u32>()
        .ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }
    month_end(year, month)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn obs(d: &str, confirmed: u64, deaths: u64) -> CaseObservation {
        CaseObservation {
            date: date(d),
            confirmed,
            deaths: Some(deaths),
            recovered: None,
        }
    }

    fn gdp(d: &str, growth: f64) -> GdpPoint {
        GdpPoint {
            date: date(d),
            growth_percent: growth,
            source_provider: ProviderKind::WorldBank,
        }
    }

    fn cases(values: &[(&str, u64)]) -> Vec<CaseRecord> {
        derive_case_series(values.iter().map(|(d, c)| obs(d, *c, 0)).collect())
    }

    #[test]
    fn test_deltas_first_record_is_baseline() {
        let series = derive_case_series(vec![
            obs("2020-01-01", 10, 1),
            obs("2020-01-02", 15, 3),
            obs("2020-01-03", 22, 3),
        ]);
        let new_cases: Vec<u64> = series.iter().map(|r| r.new_cases).collect();
        let new_deaths: Vec<Option<u64>> = series.iter().map(|r| r.new_deaths).collect();
        assert_eq!(new_cases, vec![10, 5, 7]);
        assert_eq!(new_deaths, vec![Some(1), Some(2), Some(0)]);
    }

    #[test]
    fn test_deltas_clamp_downward_revisions() {
        let series = derive_case_series(vec![
            obs("2020-01-01", 100, 5),
            obs("2020-01-02", 90, 4),
            obs("2020-01-03", 120, 6),
        ]);
        let new_cases: Vec<u64> = series.iter().map(|r| r.new_cases).collect();
        assert_eq!(new_cases, vec![100, 0, 30]);
        assert_eq!(series[1].new_deaths, Some(0));
        assert_eq!(series[2].new_deaths, Some(2));
    }

    #[test]
    fn test_deltas_sort_rows_and_handle_missing_deaths() {
        let mut late = obs("2020-01-02", 15, 0);
        late.deaths = None;
        let series = derive_case_series(vec![late, obs("2020-01-01", 10, 2)]);
        assert_eq!(series[0].date, date("2020-01-01"));
        assert_eq!(series[1].new_cases, 5);
        assert_eq!(series[1].cumulative_deaths, 0);
        assert!(series[1].new_deaths.is_none());
    }

    #[test]
    fn test_join_concrete_scenario() {
        let case_series = cases(&[("2020-01-01", 10), ("2020-01-02", 15)]);
        let joined = join(&case_series, &[gdp("2020-01-01", -2.5)]);

        assert_eq!(joined.len(), 2);
        assert_eq!(joined[0].date, date("2020-01-01"));
        assert_eq!(joined[0].new_cases, 10);
        assert_eq!(joined[0].gdp_growth_percent, Some(-2.5));
        assert_eq!(joined[1].date, date("2020-01-02"));
        assert_eq!(joined[1].new_cases, 5);
        assert_eq!(joined[1].gdp_growth_percent, Some(-2.5));
    }

    #[test]
    fn test_join_absent_before_first_point_and_carried_after_last() {
        let case_series = cases(&[
            ("2020-03-30", 1),
            ("2020-03-31", 2),
            ("2020-05-01", 3),
            ("2020-06-30", 4),
            ("2020-12-31", 5),
        ]);
        let gdp_series = vec![gdp("2020-03-31", 0.5), gdp("2020-06-30", -9.1)];
        let joined = join(&case_series, &gdp_series);

        let growth: Vec<Option<f64>> = joined.iter().map(|r| r.gdp_growth_percent).collect();
        assert_eq!(
            growth,
            vec![None, Some(0.5), Some(0.5), Some(-9.1), Some(-9.1)]
        );
    }

    #[test]
    fn test_join_sparse_gdp_skips_intermediate_points() {
        let case_series = cases(&[("2020-01-01", 1), ("2021-01-01", 2)]);
        let gdp_series = vec![
            gdp("2020-01-01", 1.0),
            gdp("2020-04-01", 2.0),
            gdp("2020-07-01", 3.0),
            gdp("2020-10-01", 4.0),
        ];
        let joined = join(&case_series, &gdp_series);
        assert_eq!(joined[0].gdp_growth_percent, Some(1.0));
        assert_eq!(joined[1].gdp_growth_percent, Some(4.0));
    }

    #[test]
    fn test_join_empty_gdp() {
        let case_series = cases(&[("2020-01-01", 1), ("2020-01-02", 2)]);
        let joined = join(&case_series, &[]);
        assert!(joined.iter().all(|r| r.gdp_growth_percent.is_none()));
    }

    #[test]
    fn test_join_independent_of_gdp_permutation() {
        let case_series = cases(&[
            ("2020-01-01", 1),
            ("2020-02-01", 2),
            ("2020-03-01", 3),
            ("2020-04-01", 4),
        ]);
        let sorted = vec![
            gdp("2020-01-15", 1.0),
            gdp("2020-02-01", 2.0),
            gdp("2020-02-01", 2.5),
            gdp("2020-03-20", -1.0),
        ];
        let expected = join(&case_series, &sorted);

        let permutations = [
            vec![3, 2, 1, 0],
            vec![2, 0, 3, 1],
            vec![1, 2, 0, 3],
        ];
        for order in permutations {
            let shuffled: Vec<GdpPoint> = order.iter().map(|&i| sorted[i].clone()).collect();
            let mut resorted = shuffled.clone();
            sort_gdp_series(&mut resorted);
            assert_eq!(join(&case_series, &shuffled), expected);
            assert_eq!(join(&case_series, &resorted), expected);
        }
        assert_eq!(expected[1].gdp_growth_percent, Some(2.5));
    }

    #[test]
    fn test_growth_from_levels() {
        let levels = vec![
            (date("2020-06-30"), Some(90.0)),
            (date("2020-03-31"), Some(100.0)),
            (date("2020-09-30"), Some(99.0)),
        ];
        let points = growth_from_levels(&levels, ProviderKind::TradingEconomics);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, date("2020-06-30"));
        assert!((points[0].growth_percent - -10.0).abs() < 1e-9);
        assert!((points[1].growth_percent - 10.0).abs() < 1e-9);
        assert_eq!(points[1].source_provider, ProviderKind::TradingEconomics);
    }

    #[test]
    fn test_growth_from_levels_skips_zero_previous() {
        let levels = vec![
            (date("2020-03-31"), Some(0.0)),
            (date("2020-06-30"), Some(50.0)),
            (date("2020-09-30"), Some(75.0)),
        ];
        let points = growth_from_levels(&levels, ProviderKind::TradingEconomics);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].date, date("2020-09-30"));
        assert!((points[0].growth_percent - 50.0).abs() < 1e-9);
        assert!(growth_from_levels(&levels[..1], ProviderKind::TradingEconomics).is_empty());
    }

    #[test]
    fn test_growth_from_levels_does_not_bridge_missing_level() {
        let levels = vec![
            (date("2019-12-31"), Some(100.0)),
            (date("2020-12-31"), None),
            (date("2021-12-31"), Some(110.0)),
            (date("2022-12-31"), Some(121.0)),
        ];
        let points = growth_from_levels(&levels, ProviderKind::TradingEconomics);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].date, date("2022-12-31"));
        assert!((points[0].growth_percent - 10.0).abs() < 1e-9);

        assert!(growth_from_levels(&levels[..3], ProviderKind::TradingEconomics).is_empty());
    }

    #[test]
    fn test_period_end() {
        assert_eq!(period_end("2020"), Some(date("2020-12-31")));
        assert_eq!(period_end("2020Q1"), Some(date("2020-03-31")));
        assert_eq!(period_end("2021Q4"), Some(date("2021-12-31")));
        assert_eq!(period_end("2020M02"), Some(date("2020-02-29")));
        assert_eq!(period_end("2020-11"), Some(date("2020-11-30")));
        assert_eq!(period_end("2020-1-22"), Some(date("2020-01-22")));
        assert_eq!(period_end("2020-03-31T00:00:00"), Some(date("2020-03-31")));
        assert_eq!(period_end("2020Q5"), None);
        assert_eq!(period_end("garbage"), None);
    }

    #[test]
    fn test_provider_kind_round_trip_names() {
        assert_eq!(
            "World-Bank".parse::<ProviderKind>().unwrap(),
            ProviderKind::WorldBank
        );
        assert_eq!(
            "tradingeconomics".parse::<ProviderKind>().unwrap(),
            ProviderKind::TradingEconomics
        );
        assert_eq!(ProviderKind::Oecd.to_string(), "oecd");
        assert!("fred".parse::<ProviderKind>().is_err());
    }
}
