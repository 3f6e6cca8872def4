use core::fmt::Debug;
use std::{
    fs::create_dir_all,
    path::{Path, PathBuf},
};

use eyre::{Context, Result};
use tracing::{debug, info};

use crate::{
    locate::latest_output_path,
    render::{BarChart, render_bar_chart},
    table::Table,
};

pub const PLOT_EXTENSION: &str = "svg";

#[typetag::serde(tag = "type")]
pub trait Plot: Debug + Send + Sync {
    /// Logical dataset this plot reads, ie. `build`
    fn dataset(&self) -> &'static str;
    /// Builds the charts for the latest output of [`Plot::dataset`]
    ///
    /// Arguments:
    /// * `table` - The loaded dataset
    fn charts(&self, table: &Table) -> Result<Vec<BarChart>>;
}

/// Resolves and loads the latest output for `plot`, returning the charts it
/// would draw without rendering them.
pub fn summarise(plot: &dyn Plot, data_path: &Path) -> Result<(PathBuf, Vec<BarChart>)> {
    let csv_path = latest_output_path(data_path, plot.dataset())?;
    let table = Table::load(&csv_path)?;
    let charts = plot
        .charts(&table)
        .wrap_err_with(|| format!("Building {} charts from {csv_path:?}", plot.dataset()))?;
    Ok((csv_path, charts))
}

pub fn chart_path(plot_path: &Path, chart: &BarChart) -> PathBuf {
    plot_path.join(format!("{}.{PLOT_EXTENSION}", chart.name))
}

/// Renders every chart of every plot into `plot_path`, stopping at the first
/// error.
pub fn plot(plots: &[Box<dyn Plot>], data_path: &Path, plot_path: &Path) -> Result<Vec<PathBuf>> {
    if plots.is_empty() {
        debug!("No plots");
        return Ok(Vec::new());
    }

    create_dir_all(plot_path).wrap_err_with(|| format!("Creating {plot_path:?}"))?;
    let mut written = Vec::new();
    for plot in plots {
        let (csv_path, charts) = summarise(plot.as_ref(), data_path)
            .wrap_err_with(|| format!("Plotting {}", plot.dataset()))?;
        debug!("Got {} charts from {csv_path:?}", charts.len());

        for chart in charts {
            let filepath = chart_path(plot_path, &chart);
            render_bar_chart(&chart, &filepath)
                .wrap_err_with(|| format!("Rendering {filepath:?}"))?;
            info!("Wrote {filepath:?}");
            written.push(filepath);
        }
    }
    Ok(written)
}
