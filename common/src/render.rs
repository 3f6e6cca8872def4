use std::path::Path;

use eyre::Result;
use plotters::{
    prelude::*,
    style::text_anchor::{HPos, Pos, VPos},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{aggregate::Bar, project};

const WIDTH: u32 = 640;
const HEIGHT: u32 = 480;
const MARGIN: u32 = 15;
const X_LABEL_AREA: u32 = 150;
const Y_LABEL_AREA: u32 = 70;
const TITLE_SIZE: u32 = 22;
const FONT_SIZE: u32 = 14;
const BAR_MARGIN: u32 = 8;
const ERROR_CAP: u32 = 8;
const LABEL_OFFSET: i32 = 12;

const LINEAR_HEADROOM: f64 = 1.15;
const LOG_HEADROOM: f64 = 1.6;

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AxisScale {
    #[default]
    Linear,
    Log,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ValueLabel {
    #[default]
    Seconds,
    Bytes,
}

impl ValueLabel {
    pub fn format(&self, value: f64) -> String {
        match self {
            ValueLabel::Seconds => format!("{value:.2}"),
            ValueLabel::Bytes => format_bytes(value),
        }
    }
}

pub fn format_bytes(bytes: f64) -> String {
    if bytes < 1000.0 {
        format!("{bytes:.0}B")
    } else if bytes < 1_000_000.0 {
        format!("{:.1}KB", bytes / 1000.0)
    } else {
        format!("{:.1}MB", bytes / 1_000_000.0)
    }
}

/// A single bar chart, bars are drawn in the given order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarChart {
    /// Output file stem, ie. `runtime-fib`
    pub name: String,
    pub title: Option<String>,
    pub y_label: String,
    pub axis: AxisScale,
    pub value_label: ValueLabel,
    pub error_bars: bool,
    /// Factor applied to the tallest bar to leave room for value labels
    pub headroom: f64,
    pub bars: Vec<Bar>,
}

impl BarChart {
    pub fn new(name: &str, y_label: &str, bars: Vec<Bar>) -> Self {
        Self {
            name: name.to_owned(),
            title: None,
            y_label: y_label.to_owned(),
            axis: AxisScale::Linear,
            value_label: ValueLabel::Seconds,
            error_bars: true,
            headroom: LINEAR_HEADROOM,
            bars,
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_owned());
        self
    }

    pub fn log_scale(mut self) -> Self {
        self.axis = AxisScale::Log;
        self.headroom = LOG_HEADROOM;
        self
    }

    pub fn with_value_label(mut self, value_label: ValueLabel) -> Self {
        self.value_label = value_label;
        self
    }

    pub fn without_error_bars(mut self) -> Self {
        self.error_bars = false;
        self
    }

    pub fn with_headroom(mut self, headroom: f64) -> Self {
        self.headroom = headroom;
        self
    }

    /// Length of the error bar above and below the mean, zero when undefined
    pub fn error(&self, bar: &Bar) -> f64 {
        if self.error_bars && bar.stats.std.is_finite() {
            bar.stats.std
        } else {
            0.0
        }
    }

    pub fn y_range(&self) -> (f64, f64) {
        let top = self
            .bars
            .iter()
            .map(|bar| bar.stats.mean + self.error(bar))
            .filter(|v| v.is_finite() && *v > 0.0)
            .fold(f64::NAN, f64::max);
        let top = if top.is_nan() { 1.0 } else { top };

        match self.axis {
            AxisScale::Linear => (0.0, top * self.headroom),
            AxisScale::Log => {
                let bottom = self
                    .bars
                    .iter()
                    .map(|bar| bar.stats.mean)
                    .filter(|v| v.is_finite() && *v > 0.0)
                    .fold(f64::NAN, f64::min);
                let bottom = if bottom.is_nan() { top } else { bottom };
                (bottom / 2.0, top * self.headroom)
            }
        }
    }
}

macro_rules! draw_bars {
    ($root:expr, $chart:expr, $colours:expr, $base:expr, $y_spec:expr) => {{
        let chart: &BarChart = $chart;
        let base: f64 = $base;
        let labels = chart.bars.iter().map(|b| b.label.clone()).collect::<Vec<_>>();

        let mut builder = ChartBuilder::on(&$root);
        builder
            .margin(MARGIN)
            .x_label_area_size(X_LABEL_AREA)
            .y_label_area_size(Y_LABEL_AREA);
        if let Some(title) = &chart.title {
            builder.caption(title, ("sans-serif", TITLE_SIZE));
        }
        let mut ctx = builder.build_cartesian_2d((0..labels.len()).into_segmented(), $y_spec)?;

        ctx.configure_mesh()
            .disable_x_mesh()
            .x_labels(labels.len())
            .x_label_formatter(&|x: &SegmentValue<usize>| match x {
                SegmentValue::CenterOf(i) => labels.get(*i).cloned().unwrap_or_default(),
                _ => String::new(),
            })
            .x_label_style(
                ("sans-serif", FONT_SIZE)
                    .into_font()
                    .transform(FontTransform::Rotate90),
            )
            .y_desc(chart.y_label.as_str())
            .draw()?;

        let visible = || {
            chart
                .bars
                .iter()
                .enumerate()
                .filter(|(_, bar)| bar.stats.mean.is_finite())
        };

        ctx.draw_series(visible().map(|(i, bar)| {
            let colour: &RGBColor = &$colours[i];
            let mut rect = Rectangle::new(
                [
                    (SegmentValue::Exact(i), base),
                    (SegmentValue::Exact(i + 1), bar.stats.mean.max(base)),
                ],
                colour.filled(),
            );
            rect.set_margin(0, 0, BAR_MARGIN, BAR_MARGIN);
            rect
        }))?;

        if chart.error_bars {
            ctx.draw_series(visible().map(|(i, bar)| {
                let mean = bar.stats.mean.max(base);
                let err = chart.error(bar);
                ErrorBar::new_vertical(
                    SegmentValue::CenterOf(i),
                    (mean - err).max(base),
                    mean,
                    mean + err,
                    BLACK.stroke_width(1),
                    ERROR_CAP,
                )
            }))?;
        }

        let style = ("sans-serif", FONT_SIZE)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Center));
        ctx.draw_series(visible().map(|(i, bar)| {
            EmptyElement::at((SegmentValue::CenterOf(i), bar.stats.mean.max(base)))
                + Text::new(
                    chart.value_label.format(bar.stats.mean),
                    (0, -LABEL_OFFSET),
                    style.clone(),
                )
        }))?;
    }};
}

/// Renders `chart` as an SVG to `path`.
///
/// Every bar label must be a configured project display name, this is checked
/// before anything is written.
pub fn render_bar_chart(chart: &BarChart, path: &Path) -> Result<()> {
    let colours = chart
        .bars
        .iter()
        .map(|bar| project::colour(&bar.label))
        .collect::<Result<Vec<_>, _>>()?;

    if chart.bars.is_empty() {
        warn!("No bars for {}, skipping {path:?}", chart.name);
        return Ok(());
    }

    let (y_min, y_max) = chart.y_range();
    debug!("Rendering {} bars to {path:?}, y {y_min}..{y_max}", chart.bars.len());

    let root = SVGBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&WHITE)?;
    match chart.axis {
        AxisScale::Linear => draw_bars!(root, chart, colours, y_min, y_min..y_max),
        AxisScale::Log => draw_bars!(root, chart, colours, y_min, (y_min..y_max).log_scale()),
    }
    root.present()?;
    Ok(())
}
