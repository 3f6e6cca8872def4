use binary_size::BinarySize;
use build_time::BuildTime;
use common::plot::Plot;
use runtime::Runtime;

/// Crate names of the plot plugins, used for log filtering
pub const PLUGIN_NAMES: &[&str] = &["build_time", "runtime", "binary_size", "common"];

/// Every report, in the order they are drawn when no config is given
pub fn default_plots() -> Vec<Box<dyn Plot>> {
    vec![
        Box::new(BuildTime::default()),
        Box::new(Runtime::default()),
        Box::new(BinarySize::default()),
    ]
}
