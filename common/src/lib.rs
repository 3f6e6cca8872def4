pub mod aggregate;
pub mod config;
pub mod error;
pub mod locate;
pub mod plot;
pub mod project;
pub mod render;
pub mod table;

pub const MS_PER_SECOND: f64 = 1000.0;
