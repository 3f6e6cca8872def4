use common::{
    aggregate::{
        Aggregation, DEFAULT_WARMUP_ITERATIONS, ITERATION_COLUMN, NAME_COLUMN, UnitScale,
        aggregate,
    },
    plot::Plot,
    render::{AxisScale, BarChart},
    table::Table,
};
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

const Y_LABEL: &str = "Execution Time (s)";

#[derive(Debug, Clone, Copy)]
struct RuntimeChart {
    column: &'static str,
    name: &'static str,
    title: &'static str,
    axis: AxisScale,
}

const CHARTS: &[RuntimeChart] = &[
    RuntimeChart {
        column: "fib_time_ms",
        name: "runtime-fib",
        title: "Fibonacci",
        axis: AxisScale::Linear,
    },
    RuntimeChart {
        column: "gcd_time_ms",
        name: "runtime-gcd",
        title: "GCD",
        axis: AxisScale::Log,
    },
    RuntimeChart {
        column: "sum_time_ms",
        name: "runtime-sum",
        title: "Object Sum",
        axis: AxisScale::Log,
    },
];

/// Execution time of the Fibonacci, GCD and object sum workloads, one chart each
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Runtime {
    pub warmup_iterations: usize,
}

impl Default for Runtime {
    fn default() -> Self {
        Self {
            warmup_iterations: DEFAULT_WARMUP_ITERATIONS,
        }
    }
}

#[typetag::serde]
impl Plot for Runtime {
    fn dataset(&self) -> &'static str {
        "runtime"
    }

    fn charts(&self, table: &Table) -> Result<Vec<BarChart>> {
        let aggregation = Aggregation::new(NAME_COLUMN, CHARTS.iter().map(|c| c.column))
            .skip_warmup(ITERATION_COLUMN, self.warmup_iterations)
            .scale(UnitScale::MILLIS_TO_SECS);
        let summary = aggregate(table, &aggregation)?;

        CHARTS
            .iter()
            .map(|job| {
                let bars = summary
                    .ranked(job.column)
                    .context(format!("Rank {}", job.column))?;
                debug!("{} bars: {bars:?}", job.title);
                let chart = BarChart::new(job.name, Y_LABEL, bars).with_title(job.title);
                Ok(match job.axis {
                    AxisScale::Linear => chart,
                    AxisScale::Log => chart.log_scale(),
                })
            })
            .collect()
    }
}
