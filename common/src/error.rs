use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("No matching data file: '{name}' in {dir:?}")]
    NotFound { name: String, dir: PathBuf },
    #[error("Could not parse {source_name}: {reason}")]
    Parse { source_name: String, reason: String },
    #[error("No colour configured for project '{0}'")]
    UnknownProject(String),
    #[error("Missing column {0}")]
    MissingColumn(String),
    #[error("Column {0} is not numeric")]
    ColumnType(String),
    #[error("Invalid file pattern")]
    Pattern(#[from] regex::Error),
    #[error("Reading {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ReportError {
    pub(crate) fn parse(source_name: &str, reason: impl ToString) -> Self {
        ReportError::Parse {
            source_name: source_name.to_owned(),
            reason: reason.to_string(),
        }
    }
}
