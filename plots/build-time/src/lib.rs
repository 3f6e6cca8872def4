use common::{
    aggregate::{
        Aggregation, DEFAULT_WARMUP_ITERATIONS, ITERATION_COLUMN, NAME_COLUMN, UnitScale,
        aggregate,
    },
    plot::Plot,
    render::BarChart,
    table::Table,
};
use eyre::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const BUILD_TIME_COLUMN: &str = "build_time_ms";

/// Mean compilation time per project
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildTime {
    pub warmup_iterations: usize,
}

impl Default for BuildTime {
    fn default() -> Self {
        Self {
            warmup_iterations: DEFAULT_WARMUP_ITERATIONS,
        }
    }
}

#[typetag::serde]
impl Plot for BuildTime {
    fn dataset(&self) -> &'static str {
        "build"
    }

    fn charts(&self, table: &Table) -> Result<Vec<BarChart>> {
        let aggregation = Aggregation::new(NAME_COLUMN, [BUILD_TIME_COLUMN])
            .skip_warmup(ITERATION_COLUMN, self.warmup_iterations)
            .scale(UnitScale::MILLIS_TO_SECS);
        let summary = aggregate(table, &aggregation)?;
        let bars = summary.ranked(BUILD_TIME_COLUMN)?;
        debug!("Build time bars: {bars:?}");

        Ok(vec![BarChart::new("build", "Compilation Time (s)", bars)])
    }
}

#[cfg(test)]
mod tests {
    use common::render::{AxisScale, ValueLabel};

    use super::*;

    const DATA: &str = "name,iteration,build_time_ms
jvm,0,100
jvm,3,2000
jvm,4,4000
teavm,0,90000
teavm,3,9000
teavm,4,11000
cheerpj,3,500
";

    #[test]
    fn one_linear_chart_slowest_first() {
        let table = Table::from_reader(DATA.as_bytes(), "build.csv").unwrap();
        let charts = BuildTime::default().charts(&table).unwrap();
        assert_eq!(charts.len(), 1);

        let chart = &charts[0];
        assert_eq!(chart.name, "build");
        assert_eq!(chart.axis, AxisScale::Linear);
        assert_eq!(chart.value_label, ValueLabel::Seconds);
        assert!(chart.error_bars);
        assert_eq!(
            chart.bars.iter().map(|b| b.label.as_str()).collect::<Vec<_>>(),
            ["TeaVM", "JVM", "CheerpJ"]
        );

        let teavm = &chart.bars[0].stats;
        assert!((teavm.mean - 10.0).abs() < 1e-9);
        let jvm = &chart.bars[1].stats;
        assert!((jvm.mean - 3.0).abs() < 1e-9);
        assert!((jvm.std - 2f64.sqrt()).abs() < 1e-9);
        assert!(chart.bars[2].stats.std.is_nan());
    }

    #[test]
    fn warmup_cutoff_is_configurable() {
        let table = Table::from_reader(DATA.as_bytes(), "build.csv").unwrap();
        let plot = BuildTime {
            warmup_iterations: 0,
        };
        let charts = plot.charts(&table).unwrap();
        let jvm = charts[0].bars.iter().find(|b| b.label == "JVM").unwrap();
        assert_eq!(jvm.stats.count, 3);
    }

    #[test]
    fn requires_build_time_column() {
        let table = Table::from_reader("name,iteration\njvm,3\n".as_bytes(), "build.csv").unwrap();
        assert!(BuildTime::default().charts(&table).is_err());
    }
}
