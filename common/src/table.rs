use std::{fs::File, io::Read, path::Path};

use csv::{ReaderBuilder, Trim};
use tracing::debug;

use crate::error::ReportError;

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Numeric(Vec<f64>),
    Text(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    fn infer(name: String, raw: Vec<String>) -> Self {
        let parsed = raw
            .iter()
            .map(|value| {
                if value.is_empty() {
                    Some(f64::NAN)
                } else {
                    value.parse::<f64>().ok()
                }
            })
            .collect::<Option<Vec<_>>>();
        let data = match parsed {
            Some(values) => ColumnData::Numeric(values),
            None => ColumnData::Text(raw),
        };
        Column { name, data }
    }

    pub fn len(&self) -> usize {
        match &self.data {
            ColumnData::Numeric(values) => values.len(),
            ColumnData::Text(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Text view of the column, numbers are printed as they would be by `{}`
    pub fn labels(&self) -> Vec<String> {
        match &self.data {
            ColumnData::Numeric(values) => values.iter().map(|v| v.to_string()).collect(),
            ColumnData::Text(values) => values.clone(),
        }
    }

    fn retain(&self, keep: &[bool]) -> Self {
        fn pick<T: Clone>(values: &[T], keep: &[bool]) -> Vec<T> {
            values
                .iter()
                .zip(keep)
                .filter(|(_, keep)| **keep)
                .map(|(v, _)| v.clone())
                .collect()
        }
        let data = match &self.data {
            ColumnData::Numeric(values) => ColumnData::Numeric(pick(values, keep)),
            ColumnData::Text(values) => ColumnData::Text(pick(values, keep)),
        };
        Column {
            name: self.name.clone(),
            data,
        }
    }
}

/// Column oriented CSV table, every column has the same number of rows
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    rows: usize,
}

impl Table {
    pub fn load(path: &Path) -> Result<Self, ReportError> {
        let file = File::open(path).map_err(|source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_reader(file, &path.display().to_string())?;
        debug!(
            "Loaded {} rows with columns {:?} from {path:?}",
            table.len(),
            table.column_names()
        );
        Ok(table)
    }

    /// Parses headed CSV from `reader`, `source_name` is only used for errors
    pub fn from_reader<R: Read>(reader: R, source_name: &str) -> Result<Self, ReportError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(reader);

        let headers = reader
            .headers()
            .map_err(|err| ReportError::parse(source_name, err))?
            .iter()
            .map(str::to_owned)
            .collect::<Vec<_>>();
        if headers.is_empty() || headers.iter().all(String::is_empty) {
            return Err(ReportError::parse(source_name, "missing header"));
        }

        let mut raw = vec![Vec::new(); headers.len()];
        for record in reader.records() {
            let record = record.map_err(|err| ReportError::parse(source_name, err))?;
            for (column, value) in raw.iter_mut().zip(record.iter()) {
                column.push(value.to_owned());
            }
        }

        let rows = raw.first().map_or(0, Vec::len);
        let columns = headers
            .into_iter()
            .zip(raw)
            .map(|(name, values)| Column::infer(name, values))
            .collect();
        Ok(Table { columns, rows })
    }

    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Result<&Column, ReportError> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| ReportError::MissingColumn(name.to_owned()))
    }

    pub fn numeric(&self, name: &str) -> Result<&[f64], ReportError> {
        match &self.column(name)?.data {
            ColumnData::Numeric(values) => Ok(values.as_slice()),
            ColumnData::Text(_) => Err(ReportError::ColumnType(name.to_owned())),
        }
    }

    pub fn labels(&self, name: &str) -> Result<Vec<String>, ReportError> {
        Ok(self.column(name)?.labels())
    }

    /// Keeps the rows for which `keep` returns true, given the row index
    pub fn filter(&self, keep: impl Fn(usize) -> bool) -> Table {
        let mask = (0..self.rows).map(keep).collect::<Vec<_>>();
        Table {
            columns: self.columns.iter().map(|c| c.retain(&mask)).collect(),
            rows: mask.iter().filter(|k| **k).count(),
        }
    }

    pub fn select(&self, names: &[&str]) -> Result<Table, ReportError> {
        let columns = names
            .iter()
            .map(|name| self.column(name).cloned())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Table {
            columns,
            rows: self.rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(csv: &str) -> Result<Table, ReportError> {
        Table::from_reader(csv.as_bytes(), "test.csv")
    }

    #[test]
    fn infers_column_types() {
        let t = table("name,iteration,build_time_ms\njvm,0,100\nteavm, 1 ,250.5\n").unwrap();
        assert_eq!(t.len(), 2);
        assert_eq!(t.column_names(), ["name", "iteration", "build_time_ms"]);
        assert_eq!(t.numeric("iteration").unwrap(), [0.0, 1.0]);
        assert_eq!(t.numeric("build_time_ms").unwrap(), [100.0, 250.5]);
        assert_eq!(t.labels("name").unwrap(), ["jvm", "teavm"]);
        assert!(matches!(
            t.numeric("name"),
            Err(ReportError::ColumnType(ref c)) if c == "name"
        ));
    }

    #[test]
    fn empty_cells_are_nan() {
        let t = table("name,bytes\njvm,\ngwt,12\n").unwrap();
        let bytes = t.numeric("bytes").unwrap();
        assert!(bytes[0].is_nan());
        assert_eq!(bytes[1], 12.0);
    }

    #[test]
    fn header_only_table_is_empty() {
        let t = table("name,bytes\n").unwrap();
        assert!(t.is_empty());
        assert!(t.column("bytes").unwrap().is_empty());
    }

    #[test]
    fn missing_header_is_parse_error() {
        assert!(matches!(table(""), Err(ReportError::Parse { .. })));
    }

    #[test]
    fn ragged_rows_are_parse_errors() {
        let err = table("name,bytes\njvm,1,2\n").unwrap_err();
        assert!(matches!(err, ReportError::Parse { ref source_name, .. } if source_name == "test.csv"));
    }

    #[test]
    fn missing_column() {
        let t = table("name,bytes\njvm,1\n").unwrap();
        assert!(matches!(
            t.column("iteration"),
            Err(ReportError::MissingColumn(ref c)) if c == "iteration"
        ));
        assert!(matches!(
            t.select(&["name", "build_time_ms"]),
            Err(ReportError::MissingColumn(_))
        ));
    }

    #[test]
    fn filter_and_select() {
        let t = table("name,iteration,fib_time_ms\njvm,0,5\njvm,3,6\ngwt,4,7\n").unwrap();
        let late = t.filter(|row| row != 0);
        assert_eq!(late.len(), 2);
        assert_eq!(late.numeric("fib_time_ms").unwrap(), [6.0, 7.0]);

        let picked = late.select(&["fib_time_ms", "name"]).unwrap();
        assert_eq!(picked.column_names(), ["fib_time_ms", "name"]);
        assert_eq!(picked.labels("name").unwrap(), ["jvm", "gwt"]);
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("size-0-0-0-0-0-1.csv");
        std::fs::write(&path, "name,bytes\nteavm,2500\n").unwrap();
        let t = Table::load(&path).unwrap();
        assert_eq!(t.numeric("bytes").unwrap(), [2500.0]);
    }
}
