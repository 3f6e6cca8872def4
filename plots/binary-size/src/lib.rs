use common::{
    aggregate::{Aggregation, NAME_COLUMN, aggregate},
    plot::Plot,
    render::{BarChart, ValueLabel},
    table::Table,
};
use eyre::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const BYTES_COLUMN: &str = "bytes";
const DEFAULT_HEADROOM: f64 = 1.6;

/// Download size per project. The dataset has no iterations so nothing is
/// skipped, repeated rows for a project are averaged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BinarySize {
    /// Extra room above the largest bar for its size label
    pub headroom: f64,
}

impl Default for BinarySize {
    fn default() -> Self {
        Self {
            headroom: DEFAULT_HEADROOM,
        }
    }
}

#[typetag::serde]
impl Plot for BinarySize {
    fn dataset(&self) -> &'static str {
        "size"
    }

    fn charts(&self, table: &Table) -> Result<Vec<BarChart>> {
        let summary = aggregate(table, &Aggregation::new(NAME_COLUMN, [BYTES_COLUMN]))?;
        let bars = summary.ranked(BYTES_COLUMN)?;
        debug!("Size bars: {bars:?}");

        Ok(vec![
            BarChart::new("size", "Download Size (bytes)", bars)
                .log_scale()
                .with_headroom(self.headroom)
                .with_value_label(ValueLabel::Bytes)
                .without_error_bars(),
        ])
    }
}

#[cfg(test)]
mod tests {
    use common::render::AxisScale;

    use super::*;

    #[test]
    fn log_chart_with_byte_labels() {
        let table = Table::from_reader(
            "name,bytes\nteavm,2500\ncheerpj,3400000\nhandwritten,500\nmontera,1200\n".as_bytes(),
            "size.csv",
        )
        .unwrap();
        let charts = BinarySize::default().charts(&table).unwrap();
        assert_eq!(charts.len(), 1);

        let chart = &charts[0];
        assert_eq!(chart.axis, AxisScale::Log);
        assert!(!chart.error_bars);
        assert_eq!(chart.headroom, DEFAULT_HEADROOM);
        let labels = chart
            .bars
            .iter()
            .map(|b| (b.label.as_str(), chart.value_label.format(b.stats.mean)))
            .collect::<Vec<_>>();
        assert_eq!(
            labels,
            [
                ("CheerpJ", "3.4MB".to_owned()),
                ("TeaVM", "2.5KB".to_owned()),
                ("My Project", "1.2KB".to_owned()),
                ("Handwritten WASM", "500B".to_owned()),
            ]
        );
    }

    #[test]
    fn iteration_column_is_not_required() {
        let table = Table::from_reader("name,bytes\njvm,10\n".as_bytes(), "size.csv").unwrap();
        assert_eq!(BinarySize::default().charts(&table).unwrap()[0].bars.len(), 1);
    }
}
