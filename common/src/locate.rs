use std::{
    collections::BTreeMap,
    fs::read_dir,
    path::{Path, PathBuf},
};

use itertools::Itertools;
use regex::Regex;
use tracing::{debug, warn};

use crate::error::ReportError;

/// Number of dash separated numeric fields following the dataset name
pub const STAMP_FIELDS: usize = 6;

fn file_names(data_dir: &Path) -> Result<Vec<String>, ReportError> {
    let io_err = |source| ReportError::Io {
        path: data_dir.to_path_buf(),
        source,
    };
    let mut names = Vec::new();
    for entry in read_dir(data_dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        if let Some(name) = entry.file_name().to_str() {
            names.push(name.to_owned());
        }
    }
    Ok(names)
}

fn output_regex(name: &str) -> Result<Regex, ReportError> {
    Ok(Regex::new(&format!(
        r"^{}(-\d+){{{STAMP_FIELDS}}}\.csv$",
        regex::escape(name)
    ))?)
}

/// Every output file for `name`, earliest first.
///
/// Ordering is lexicographic on the file name, so it only matches
/// chronological order when the numeric fields are zero padded.
pub fn list_outputs(data_dir: &Path, name: &str) -> Result<Vec<PathBuf>, ReportError> {
    let re = output_regex(name)?;
    let matches = file_names(data_dir)?
        .into_iter()
        .filter(|file| re.is_match(file))
        .sorted()
        .collect::<Vec<_>>();

    if matches.iter().map(String::len).unique().count() > 1 {
        warn!(
            "Output files for {name} differ in length, latest by name may not be latest by time: {matches:?}"
        );
    }

    Ok(matches.into_iter().map(|file| data_dir.join(file)).collect())
}

/// The latest output file for the dataset `name` in `data_dir`
pub fn latest_output_path(data_dir: &Path, name: &str) -> Result<PathBuf, ReportError> {
    let latest = list_outputs(data_dir, name)?
        .pop()
        .ok_or_else(|| ReportError::NotFound {
            name: name.to_owned(),
            dir: data_dir.to_path_buf(),
        })?;
    debug!("Latest {name} output: {latest:?}");
    Ok(latest)
}

/// All datasets present in `data_dir`, each with its files in sorted order.
pub fn list_datasets(data_dir: &Path) -> Result<BTreeMap<String, Vec<PathBuf>>, ReportError> {
    let re = Regex::new(&format!(r"^(.+?)(?:-\d+){{{STAMP_FIELDS}}}\.csv$"))?;
    let mut datasets: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    for file in file_names(data_dir)?.into_iter().sorted() {
        if let Some(name) = re.captures(&file).and_then(|cap| cap.get(1)) {
            datasets
                .entry(name.as_str().to_owned())
                .or_default()
                .push(data_dir.join(&file));
        }
    }
    Ok(datasets)
}
