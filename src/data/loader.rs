// ============================================================
// Layer 4 — CSV Sample Loader
// ============================================================
// Reads a numeric CSV file into a SampleDataset.
//
// Parsing is done by the `csv` crate, so quoted fields and
// quoted headers are accepted. On top of it:
//   - lines starting with '#' are comments, blank lines are skipped
//   - fields are trimmed
//   - the first record may be a header; it is skipped when it
//     does not parse as numbers
//   - every record must have the same number of columns
//   - optionally one column is the label: it is removed from
//     the features and kept as auxiliary data
//
// Example:
//   x0,x1,x2,x3
//   0.12,0.50,0.33,0.91
//   "0.08","0.47","0.29","0.95"
//
// Reference: Rust Book §9 (Error Handling)
//            Rust Book §12 (I/O and File Handling)

use std::path::PathBuf;

use csv::{ErrorKind, ReaderBuilder, StringRecord, Trim};

use crate::data::dataset::{Sample, SampleDataset};
use crate::domain::error::{TrainError, TrainResult};

/// Loads one CSV file per batch source.
pub struct CsvLoader {
    path:         PathBuf,
    label_column: Option<usize>,
}

impl CsvLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), label_column: None }
    }

    /// Treat this zero-based column as the label instead of a feature
    pub fn with_label_column(mut self, column: Option<usize>) -> Self {
        self.label_column = column;
        self
    }

    pub fn load(&self) -> TrainResult<SampleDataset> {
        // Headers are detected per file, not declared
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .comment(Some(b'#'))
            .trim(Trim::All)
            .flexible(false)
            .from_path(&self.path)
            .map_err(|e| self.error(format!("cannot read file: {e}")))?;

        let mut samples: Vec<Sample> = Vec::new();
        let mut seen_record = false;

        for record in reader.records() {
            let record  = record.map_err(|e| self.csv_error(e))?;
            let line_no = line_of(&record);

            let values = match parse_record(&record) {
                Ok(values) => values,
                // A non-numeric first record is a header
                Err(_) if !seen_record => {
                    seen_record = true;
                    tracing::debug!("Skipping header line in '{}'", self.path.display());
                    continue;
                }
                Err(e) => return Err(self.error(format!("line {line_no}: {e}"))),
            };
            seen_record = true;

            samples.push(self.split_label(values, line_no)?);
        }

        let labelled = samples.iter().filter(|s| s.label.is_some()).count();
        tracing::info!(
            "Loaded {} samples ({} labelled) from '{}'",
            samples.len(),
            labelled,
            self.path.display(),
        );
        Ok(SampleDataset::new(samples))
    }

    fn split_label(&self, mut values: Vec<f32>, line_no: u64) -> TrainResult<Sample> {
        let Some(column) = self.label_column else {
            return Ok(Sample::new(values));
        };
        if column >= values.len() {
            return Err(self.error(format!(
                "line {line_no}: label column {column} out of range for {} columns",
                values.len()
            )));
        }
        let label = values.remove(column);
        Ok(Sample::new(values).with_label(label))
    }

    fn csv_error(&self, err: csv::Error) -> TrainError {
        let reason = match err.kind() {
            ErrorKind::UnequalLengths { pos, expected_len, len } => format!(
                "line {}: expected {expected_len} columns, found {len}",
                pos.as_ref().map_or(0, |p| p.line()),
            ),
            _ => err.to_string(),
        };
        self.error(reason)
    }

    fn error(&self, reason: String) -> TrainError {
        TrainError::Data { path: self.path.clone(), reason }
    }
}

fn line_of(record: &StringRecord) -> u64 {
    record.position().map_or(0, |p| p.line())
}

fn parse_record(record: &StringRecord) -> Result<Vec<f32>, String> {
    record
        .iter()
        .map(|field| {
            field
                .parse::<f32>()
                .map_err(|_| format!("'{field}' is not a number"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::data::dataset::Dataset;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_skips_header_comments_and_blank_lines() {
        let file = write_csv("a,b,c\n# comment\n1,2,3\n\n4, 5, 6\n");
        let dataset = CsvLoader::new(file.path()).load().unwrap();
        assert_eq!(dataset.sample_count(), 2);
        assert_eq!(dataset.feature_dim(), Some(3));
        assert_eq!(dataset.get(1).unwrap().features, vec![4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_quoted_fields_and_header() {
        let file = write_csv("\"x\",\"y\"\n\"1.0\",\"2.0\"\n\"3.0\",\"4.0\"\n");
        let dataset = CsvLoader::new(file.path()).load().unwrap();
        assert_eq!(dataset.sample_count(), 2);
        assert_eq!(dataset.get(0).unwrap().features, vec![1.0, 2.0]);
        assert_eq!(dataset.get(1).unwrap().features, vec![3.0, 4.0]);
    }

    #[test]
    fn test_label_column_is_split_off() {
        let file = write_csv("0.5,0.25,1\n0.75,0.5,0\n");
        let dataset = CsvLoader::new(file.path())
            .with_label_column(Some(2))
            .load()
            .unwrap();
        let first = dataset.get(0).unwrap();
        assert_eq!(first.features, vec![0.5, 0.25]);
        assert_eq!(first.label, Some(1.0));
    }

    #[test]
    fn test_ragged_rows_are_rejected() {
        let file = write_csv("1,2,3\n4,5\n");
        let err = CsvLoader::new(file.path()).load().unwrap_err();
        assert!(matches!(err, TrainError::Data { .. }));
        assert!(err.to_string().contains("line 2"), "{err}");
    }

    #[test]
    fn test_non_numeric_data_after_first_row_is_rejected() {
        let file = write_csv("1,2\nx,3\n");
        assert!(CsvLoader::new(file.path()).load().is_err());
    }

    #[test]
    fn test_empty_file_gives_empty_dataset() {
        let file = write_csv("");
        let dataset = CsvLoader::new(file.path()).load().unwrap();
        assert_eq!(dataset.sample_count(), 0);
        assert_eq!(dataset.feature_dim(), None);
    }

    #[test]
    fn test_missing_file() {
        let err = CsvLoader::new("does/not/exist.csv").load().unwrap_err();
        assert!(matches!(err, TrainError::Data { .. }));
    }
}
