use std::collections::BTreeMap;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{MS_PER_SECOND, error::ReportError, project, table::Table};

pub const NAME_COLUMN: &str = "name";
pub const ITERATION_COLUMN: &str = "iteration";
/// Iterations before this one are treated as warm-up
pub const DEFAULT_WARMUP_ITERATIONS: usize = 3;

/// Divisor applied to every metric value before aggregation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitScale(pub f64);

impl UnitScale {
    pub const IDENTITY: UnitScale = UnitScale(1.0);
    pub const MILLIS_TO_SECS: UnitScale = UnitScale(MS_PER_SECOND);

    pub fn apply(&self, value: f64) -> f64 {
        value / self.0
    }

    pub fn revert(&self, value: f64) -> f64 {
        value * self.0
    }
}

impl Default for UnitScale {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Warmup {
    pub column: String,
    /// First iteration that is kept
    pub first_kept: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub group_by: String,
    pub metrics: Vec<String>,
    pub warmup: Option<Warmup>,
    pub scale: UnitScale,
}

impl Aggregation {
    pub fn new<S: Into<String>>(group_by: &str, metrics: impl IntoIterator<Item = S>) -> Self {
        Self {
            group_by: group_by.to_owned(),
            metrics: metrics.into_iter().map(Into::into).collect(),
            warmup: None,
            scale: UnitScale::IDENTITY,
        }
    }

    /// Drops rows whose `column` value is below `first_kept`
    pub fn skip_warmup(mut self, column: &str, first_kept: usize) -> Self {
        self.warmup = Some(Warmup {
            column: column.to_owned(),
            first_kept: first_kept as f64,
        });
        self
    }

    pub fn scale(mut self, scale: UnitScale) -> Self {
        self.scale = scale;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub mean: f64,
    /// Sample standard deviation, NaN with fewer than two values
    pub std: f64,
    pub count: usize,
}

impl Stats {
    /// NaN values are skipped
    pub fn from_values(values: &[f64]) -> Self {
        let values = values.iter().copied().filter(|v| !v.is_nan()).collect_vec();
        let count = values.len();
        if count == 0 {
            return Stats {
                mean: f64::NAN,
                std: f64::NAN,
                count,
            };
        }

        let mean = values.iter().sum::<f64>() / count as f64;
        let std = if count < 2 {
            f64::NAN
        } else {
            let sq = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
            (sq / (count - 1) as f64).sqrt()
        };
        Stats { mean, std, count }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub label: String,
    pub stats: Stats,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    metrics: Vec<String>,
    groups: BTreeMap<String, Vec<Stats>>,
}

impl Summary {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn get(&self, group: &str, metric: &str) -> Option<Stats> {
        let idx = self.metrics.iter().position(|m| m == metric)?;
        self.groups.get(group).map(|stats| stats[idx])
    }

    /// One bar per group for `metric`, largest mean first and undefined
    /// means last
    pub fn ranked(&self, metric: &str) -> Result<Vec<Bar>, ReportError> {
        let idx = self
            .metrics
            .iter()
            .position(|m| m == metric)
            .ok_or_else(|| ReportError::MissingColumn(metric.to_owned()))?;
        Ok(self
            .groups
            .iter()
            .map(|(label, stats)| Bar {
                label: label.clone(),
                stats: stats[idx],
            })
            .sorted_by(|a, b| {
                let (a, b) = (a.stats.mean, b.stats.mean);
                a.is_nan().cmp(&b.is_nan()).then_with(|| b.total_cmp(&a))
            })
            .collect())
    }
}

pub fn aggregate(table: &Table, aggregation: &Aggregation) -> Result<Summary, ReportError> {
    table.column(&aggregation.group_by)?;
    for metric in &aggregation.metrics {
        table.numeric(metric)?;
    }

    let table = match &aggregation.warmup {
        Some(warmup) => {
            let iterations = table.numeric(&warmup.column)?;
            let kept = table.filter(|row| iterations[row] >= warmup.first_kept);
            debug!(
                "Dropped {} warm-up rows below {} {}",
                table.len() - kept.len(),
                warmup.column,
                warmup.first_kept
            );
            kept
        }
        None => table.clone(),
    };
    let table = table.select(
        &std::iter::once(aggregation.group_by.as_str())
            .chain(aggregation.metrics.iter().map(String::as_str))
            .collect_vec(),
    )?;

    let labels = table
        .labels(&aggregation.group_by)?
        .into_iter()
        .map(|id| project::display_name(&id).to_owned())
        .collect_vec();
    let metrics = aggregation
        .metrics
        .iter()
        .map(|metric| {
            Ok(table
                .numeric(metric)?
                .iter()
                .map(|v| aggregation.scale.apply(*v))
                .collect_vec())
        })
        .collect::<Result<Vec<_>, ReportError>>()?;

    let rows_by_group = labels.into_iter().enumerate().into_group_map_by(|(_, l)| l.clone());
    let groups = rows_by_group
        .into_iter()
        .map(|(group, rows)| {
            let stats = metrics
                .iter()
                .map(|values| {
                    let picked = rows.iter().map(|(row, _)| values[*row]).collect_vec();
                    Stats::from_values(&picked)
                })
                .collect_vec();
            (group, stats)
        })
        .collect::<BTreeMap<_, _>>();

    debug!("Aggregated {} rows into {} groups", table.len(), groups.len());
    Ok(Summary {
        metrics: aggregation.metrics.clone(),
        groups,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn table(csv: &str) -> Table {
        Table::from_reader(csv.as_bytes(), "test.csv").unwrap()
    }

    fn build_aggregation() -> Aggregation {
        Aggregation::new(NAME_COLUMN, ["build_time_ms"])
            .skip_warmup(ITERATION_COLUMN, DEFAULT_WARMUP_ITERATIONS)
            .scale(UnitScale::MILLIS_TO_SECS)
    }

    #[test]
    fn warmup_rows_are_dropped() {
        let t = table("name,iteration,build_time_ms\njvm,0,100\njvm,3,2000\njvm,4,4000\n");
        let summary = aggregate(&t, &build_aggregation()).unwrap();
        let stats = summary.get("JVM", "build_time_ms").unwrap();
        assert_eq!(stats.count, 2);
        assert!((stats.mean - 3.0).abs() < EPS);
        assert!((stats.std - 2f64.sqrt()).abs() < EPS);
    }

    #[test]
    fn warmup_only_group_disappears() {
        let t = table("name,iteration,build_time_ms\nteavm,0,100\nteavm,2,100\njvm,5,1000\n");
        let summary = aggregate(&t, &build_aggregation()).unwrap();
        assert_eq!(summary.groups().collect_vec(), ["JVM"]);
    }

    #[test]
    fn single_row_has_nan_std() {
        let t = table("name,bytes\ngwt,1500\n");
        let summary = aggregate(&t, &Aggregation::new("name", ["bytes"])).unwrap();
        let stats = summary.get("GWT", "bytes").unwrap();
        assert_eq!(stats.mean, 1500.0);
        assert!(stats.std.is_nan());
    }

    #[test]
    fn unknown_projects_keep_their_identifier() {
        let t = table("name,bytes\nkotlin,10\n");
        let summary = aggregate(&t, &Aggregation::new("name", ["bytes"])).unwrap();
        assert_eq!(summary.groups().collect_vec(), ["kotlin"]);
    }

    #[test]
    fn ranked_is_descending_by_mean() {
        let t = table(
            "name,iteration,fib_time_ms,gcd_time_ms\n\
             jvm,3,100,9\njvm,4,300,11\n\
             teavm,3,900,1\nteavm,4,1100,3\n\
             gwt,3,400,5\ngwt,4,600,7\n",
        );
        let aggregation = Aggregation::new("name", ["fib_time_ms", "gcd_time_ms"])
            .skip_warmup("iteration", 3)
            .scale(UnitScale::MILLIS_TO_SECS);
        let summary = aggregate(&t, &aggregation).unwrap();

        let fib = summary.ranked("fib_time_ms").unwrap();
        assert_eq!(
            fib.iter().map(|b| b.label.as_str()).collect_vec(),
            ["TeaVM", "GWT", "JVM"]
        );
        assert!(fib.windows(2).all(|w| w[0].stats.mean >= w[1].stats.mean));

        let gcd = summary.ranked("gcd_time_ms").unwrap();
        assert_eq!(
            gcd.iter().map(|b| b.label.as_str()).collect_vec(),
            ["JVM", "GWT", "TeaVM"]
        );
        assert!(matches!(
            summary.ranked("sum_time_ms"),
            Err(ReportError::MissingColumn(_))
        ));
    }

    #[test]
    fn undefined_means_rank_last() {
        let t = table("name,bytes\njvm,10\nteavm,\ngwt,20\n");
        let summary = aggregate(&t, &Aggregation::new("name", ["bytes"])).unwrap();
        let ranked = summary.ranked("bytes").unwrap();
        assert_eq!(
            ranked.iter().map(|b| b.label.as_str()).collect_vec(),
            ["GWT", "JVM", "TeaVM"]
        );
        assert!(ranked[2].stats.mean.is_nan());
        assert_eq!(ranked[2].stats.count, 0);
    }

    #[test]
    fn unit_scale_reverts() {
        for v in [0.0, 1.0, 123.456, 98765.4321, 1e-3] {
            let s = UnitScale::MILLIS_TO_SECS;
            assert!((s.revert(s.apply(v)) - v).abs() <= v.abs() * EPS);
        }
        assert_eq!(UnitScale::IDENTITY.apply(42.0), 42.0);
    }

    #[test]
    fn missing_columns_are_reported() {
        let t = table("name,build_time_ms\njvm,100\n");
        assert!(matches!(
            aggregate(&t, &build_aggregation()),
            Err(ReportError::MissingColumn(ref c)) if c == "iteration"
        ));
        let t = table("name,iteration\njvm,3\n");
        assert!(matches!(
            aggregate(&t, &build_aggregation()),
            Err(ReportError::MissingColumn(ref c)) if c == "build_time_ms"
        ));
    }

    #[test]
    fn empty_table_gives_empty_summary() {
        let t = table("name,iteration,build_time_ms\n");
        assert!(aggregate(&t, &build_aggregation()).unwrap().is_empty());
    }

    #[test]
    fn stats_skip_missing_values() {
        let stats = Stats::from_values(&[2.0, f64::NAN, 4.0]);
        assert_eq!(stats.count, 2);
        assert_eq!(stats.mean, 3.0);
        assert!(Stats::from_values(&[]).mean.is_nan());
    }
}
