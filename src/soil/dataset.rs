//! Soil properties dataset loaded from CSV.
//!
//! All the ways a cell can mean "no observation" (blank, `NA`, `NaN`,
//! `null`, non-numeric text) collapse to `None` here, before any record
//! reaches the resolver.

use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use super::fallback::SoilField;

/// Region key column.
pub const KEY_COLUMN: &str = "MU_GLOBAL";

#[derive(Debug, Error)]
pub enum SoilDataError {
    #[error("failed to open soil dataset {0}: {1}")]
    Open(PathBuf, #[source] csv::Error),
    #[error("malformed soil CSV at record {record}: {source}")]
    Csv {
        record: u64,
        #[source]
        source: csv::Error,
    },
    #[error("soil dataset has no {KEY_COLUMN} column")]
    MissingKeyColumn,
}

/// One raw soil row. `None` means the dataset has no usable observation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SoilRecord {
    pub key: String,
    pub ph: Option<f64>,
    pub clay: Option<f64>,
    pub sand: Option<f64>,
    pub silt: Option<f64>,
    pub cec: Option<f64>,
}

impl SoilRecord {
    pub fn field(&self, field: SoilField) -> Option<f64> {
        match field {
            SoilField::Ph => self.ph,
            SoilField::Clay => self.clay,
            SoilField::Sand => self.sand,
            SoilField::Silt => self.silt,
            SoilField::Cec => self.cec,
        }
    }

    fn set(&mut self, field: SoilField, value: Option<f64>) {
        match field {
            SoilField::Ph => self.ph = value,
            SoilField::Clay => self.clay = value,
            SoilField::Sand => self.sand = value,
            SoilField::Silt => self.silt = value,
            SoilField::Cec => self.cec = value,
        }
    }
}

/// Parse a raw cell into an observation.
pub fn parse_cell(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Soil records indexed by region key.
///
/// When a key appears on several rows the first row in source order is
/// kept and later ones are counted in [`SoilDataset::duplicates_skipped`].
#[derive(Debug, Clone, Default)]
pub struct SoilDataset {
    records: HashMap<String, SoilRecord>,
    rows_read: usize,
    duplicates_skipped: usize,
}

impl SoilDataset {
    /// Build from records in source order (first per key wins).
    pub fn from_records<I: IntoIterator<Item = SoilRecord>>(rows: I) -> Self {
        let mut dataset = Self::default();
        for record in rows {
            dataset.insert_first(record);
        }
        dataset
    }

    fn insert_first(&mut self, record: SoilRecord) {
        self.rows_read += 1;
        if self.records.contains_key(&record.key) {
            self.duplicates_skipped += 1;
        } else {
            self.records.insert(record.key.clone(), record);
        }
    }

    /// Read a CSV table with a header row.
    ///
    /// Columns are located by name; a missing value column is warned about
    /// and treated as empty for every row. Rows with a blank key are skipped.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SoilDataError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|source| SoilDataError::Csv { record: 0, source })?
            .clone();
        let position = |name: &str| headers.iter().position(|h| h.trim() == name);

        let key_idx = position(KEY_COLUMN).ok_or(SoilDataError::MissingKeyColumn)?;
        let columns: Vec<(SoilField, Option<usize>)> = SoilField::ALL
            .iter()
            .map(|&field| {
                let idx = position(field.column());
                if idx.is_none() {
                    warn!(column = field.column(), "Soil dataset column missing, values will be synthesized");
                }
                (field, idx)
            })
            .collect();

        let mut dataset = Self::default();
        let mut blank_keys = 0usize;
        for (i, row) in csv_reader.records().enumerate() {
            let row = row.map_err(|source| SoilDataError::Csv {
                record: i as u64 + 1,
                source,
            })?;

            let key = row.get(key_idx).map(str::trim).unwrap_or_default();
            if key.is_empty() {
                blank_keys += 1;
                continue;
            }

            let mut record = SoilRecord {
                key: key.to_string(),
                ..SoilRecord::default()
            };
            for &(field, idx) in &columns {
                record.set(field, idx.and_then(|i| row.get(i)).and_then(parse_cell));
            }
            dataset.insert_first(record);
        }

        if blank_keys > 0 {
            warn!(rows = blank_keys, "Skipped soil rows with a blank {}", KEY_COLUMN);
        }
        Ok(dataset)
    }

    pub fn load(path: &Path) -> Result<Self, SoilDataError> {
        let file = std::fs::File::open(path)
            .map_err(|e| SoilDataError::Open(path.to_path_buf(), csv::Error::from(e)))?;
        let dataset = Self::from_reader(std::io::BufReader::new(file))?;
        info!(
            path = %path.display(),
            rows = dataset.rows_read,
            regions = dataset.len(),
            duplicates_skipped = dataset.duplicates_skipped,
            "Loaded soil dataset"
        );
        Ok(dataset)
    }

    /// The first record for `key` in source order.
    pub fn first(&self, key: &str) -> Option<&SoilRecord> {
        self.records.get(key)
    }

    /// Number of distinct region keys.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn rows_read(&self) -> usize {
        self.rows_read
    }

    pub fn duplicates_skipped(&self) -> usize {
        self.duplicates_skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
ID,MU_GLOBAL,S_PH_H2O,S_CLAY,S_SAND,S_SILT,S_CEC_SOIL
1,7001,6.5,22.0,41.0,37.0,14.2
2,7001,4.0,10.0,10.0,10.0,10.0
3,7002,,NA,55.5,NaN,null
4, ,7.0,7.0,7.0,7.0,7.0
5,7003,abc,12.345,-,33,inf
";

    #[test]
    fn test_parse_cell_missing_forms() {
        assert_eq!(parse_cell("6.5"), Some(6.5));
        assert_eq!(parse_cell(" 12 "), Some(12.0));
        for raw in ["", "   ", "NA", "NaN", "nan", "null", "None", "abc", "inf", "-"] {
            assert_eq!(parse_cell(raw), None, "{raw:?} should be missing");
        }
    }

    #[test]
    fn test_first_row_wins_on_duplicate_keys() {
        let dataset = SoilDataset::from_reader(SAMPLE.as_bytes()).unwrap();
        let rec = dataset.first("7001").unwrap();
        assert_eq!(rec.ph, Some(6.5));
        assert_eq!(rec.cec, Some(14.2));
        assert_eq!(dataset.duplicates_skipped(), 1);
    }

    #[test]
    fn test_missing_cells_become_none() {
        let dataset = SoilDataset::from_reader(SAMPLE.as_bytes()).unwrap();
        let rec = dataset.first("7002").unwrap();
        assert_eq!(rec.ph, None);
        assert_eq!(rec.clay, None);
        assert_eq!(rec.sand, Some(55.5));
        assert_eq!(rec.silt, None);
        assert_eq!(rec.cec, None);

        let rec = dataset.first("7003").unwrap();
        assert_eq!(rec.ph, None);
        assert_eq!(rec.clay, Some(12.345));
        assert_eq!(rec.sand, None);
        assert_eq!(rec.silt, Some(33.0));
        assert_eq!(rec.cec, None);
    }

    #[test]
    fn test_blank_keys_skipped() {
        let dataset = SoilDataset::from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.rows_read(), 4);
        assert!(dataset.first("").is_none());
    }

    #[test]
    fn test_missing_value_column_reads_as_none() {
        let csv = "MU_GLOBAL,S_PH_H2O\n10,5.5\n";
        let dataset = SoilDataset::from_reader(csv.as_bytes()).unwrap();
        let rec = dataset.first("10").unwrap();
        assert_eq!(rec.ph, Some(5.5));
        assert_eq!(rec.clay, None);
        assert_eq!(rec.cec, None);
    }

    #[test]
    fn test_missing_key_column_is_error() {
        let csv = "ID,S_PH_H2O\n1,5.5\n";
        let err = SoilDataset::from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, SoilDataError::MissingKeyColumn));
    }

    #[test]
    fn test_from_records_first_wins() {
        let dataset = SoilDataset::from_records([
            SoilRecord { key: "a".into(), ph: Some(5.0), ..Default::default() },
            SoilRecord { key: "a".into(), ph: Some(8.0), ..Default::default() },
        ]);
        assert_eq!(dataset.first("a").unwrap().ph, Some(5.0));
        assert_eq!(dataset.duplicates_skipped(), 1);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("soil.csv");
        std::fs::write(&path, SAMPLE).unwrap();
        let dataset = SoilDataset::load(&path).unwrap();
        assert_eq!(dataset.len(), 3);

        let err = SoilDataset::load(&dir.path().join("missing.csv")).unwrap_err();
        assert!(matches!(err, SoilDataError::Open(_, _)));
    }
}
