//! CSV table loading

use cohort_stats_core::{CoreError, FlatTable, Result, TableSource, Value};
use csv::ReaderBuilder;
use std::path::{Path, PathBuf};

/// A [`TableSource`] reading a delimited file with a header row.
///
/// Cells are typed by inference: empty cells become `Null`, then integer,
/// float and finally text.
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
    delimiter: u8,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delimiter: b',',
        }
    }

    /// Single-byte delimiter; other characters are rejected on load
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = if delimiter.is_ascii() { delimiter as u8 } else { 0 };
        self
    }
}

impl TableSource for CsvSource {
    fn load(&self) -> Result<FlatTable> {
        if self.delimiter == 0 {
            return Err(CoreError::Validation(
                "CSV delimiter must be a single ASCII character".to_string(),
            ));
        }

        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .delimiter(self.delimiter)
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(|e| csv_error(&self.path, e))?;

        let headers: Vec<String> = rdr
            .headers()
            .map_err(|e| csv_error(&self.path, e))?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let mut table = FlatTable::new(headers)?;
        for result in rdr.records() {
            let record = result.map_err(|e| csv_error(&self.path, e))?;
            table.push_row(record.iter().map(Value::parse).collect())?;
        }

        tracing::debug!(
            path = %self.path.display(),
            columns = table.columns().len(),
            rows = table.len(),
            "Loaded CSV table"
        );
        Ok(table)
    }
}

fn csv_error(path: &Path, err: csv::Error) -> CoreError {
    CoreError::Serialization(format!("{}: {}", path.display(), err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn write_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_infers_types() {
        let file = write_file("Country,Year,Status,Life_expectancy\nChad,2014, Developing ,53.1\nPeru,2014,Developing,\n");
        let table = CsvSource::new(file.path()).load().unwrap();

        assert_eq!(table.columns(), ["Country", "Year", "Status", "Life_expectancy"]);
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.row(0).unwrap(),
            [
                Value::from("Chad"),
                Value::Integer(2014),
                Value::from("Developing"),
                Value::Float(53.1),
            ]
        );
        assert!(table.row(1).unwrap()[3].is_null());
    }

    #[test]
    fn test_semicolon_delimiter() {
        let file = write_file("a;b\n1;x\n");
        let table = CsvSource::new(file.path())
            .with_delimiter(';')
            .load()
            .unwrap();
        assert_eq!(table.row(0).unwrap(), [Value::Integer(1), Value::from("x")]);
    }

    #[test]
    fn test_ragged_rows_are_rejected() {
        let file = write_file("a,b\n1,2\n3\n");
        let err = CsvSource::new(file.path()).load().unwrap_err();
        assert!(matches!(err, CoreError::Serialization(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = CsvSource::new("/nonexistent/cohorts.csv").load().unwrap_err();
        assert_eq!(err.kind(), "serialization");
    }
}
