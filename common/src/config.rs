use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::plot::Plot;

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
    pub plots: Vec<Box<dyn Plot>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory holding the `<dataset>-<timestamp>.csv` outputs
    pub data_dir: PathBuf,
    /// Directory the charts are written to
    pub plot_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            plot_dir: PathBuf::from("plots"),
        }
    }
}

impl Config {
    /// Keeps only the plots reading `dataset`
    pub fn retain_dataset(&mut self, dataset: &str) {
        self.plots.retain(|plot| plot.dataset() == dataset);
    }
}
