use std::fs;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Trim};
use ds_core::errors::{DsError, ErrorInfo};
use ds_core::hash::hash_bytes;
use tracing::{debug, info};

use crate::derivatives::append_derivatives;
use crate::preprocess::{preprocess, SubjectRange};
use crate::record::{RawRecord, RawTable};
use crate::table::ProcessedTable;

/// Fewest samples a trajectory needs to yield derivatives.
pub const DEFAULT_MIN_SAMPLES: usize = 2;

/// Loads and prepares trajectory data from a CSV file.
#[derive(Debug, Clone, PartialEq)]
pub struct DataReader {
    path: PathBuf,
    min_samples: usize,
}

impl DataReader {
    /// Creates a reader for the CSV file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            min_samples: DEFAULT_MIN_SAMPLES,
        }
    }

    /// Sets the minimum trajectory length kept by [`DataReader::preprocess_data`].
    /// Values below two are raised to two.
    pub fn with_min_samples(mut self, min_samples: usize) -> Self {
        self.min_samples = min_samples.max(DEFAULT_MIN_SAMPLES);
        self
    }

    /// Path of the backing CSV file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Minimum trajectory length.
    pub fn min_samples(&self) -> usize {
        self.min_samples
    }

    /// Reads every row of the dataset.
    pub fn read_data(&self) -> Result<RawTable, DsError> {
        let bytes = fs::read(&self.path).map_err(|err| {
            DsError::Data(
                ErrorInfo::new("data-open", "failed to read raw dataset")
                    .with_context("path", self.path.display().to_string())
                    .with_hint(err.to_string()),
            )
        })?;
        let input_hash = hash_bytes(&bytes);
        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .from_reader(bytes.as_slice());

        let mut records = Vec::new();
        for (idx, row) in reader.deserialize::<RawRecord>().enumerate() {
            // header occupies line 1
            let line = idx + 2;
            let record = row.map_err(|err| {
                DsError::Data(
                    ErrorInfo::new("data-parse", "malformed dataset row")
                        .with_context("path", self.path.display().to_string())
                        .with_context("row", line.to_string())
                        .with_hint(err.to_string()),
                )
            })?;
            if !(record.t.is_finite() && record.x.is_finite() && record.y.is_finite()) {
                return Err(DsError::Data(
                    ErrorInfo::new("data-parse", "non-finite time or position")
                        .with_context("path", self.path.display().to_string())
                        .with_context("row", line.to_string()),
                ));
            }
            records.push(record);
        }

        if records.is_empty() {
            return Err(DsError::Data(
                ErrorInfo::new("data-empty", "dataset contains no rows")
                    .with_context("path", self.path.display().to_string()),
            ));
        }
        info!(path = %self.path.display(), rows = records.len(), "read raw dataset");
        debug!(input_hash = %input_hash, "hashed raw dataset");

        Ok(RawTable {
            source: Some(self.path.clone()),
            input_hash,
            records,
        })
    }

    /// Selects the trials of one experiment type, reward sum and subject range.
    ///
    /// Returns the sorted subject identifiers that survived selection along with
    /// the processed table.
    pub fn preprocess_data(
        &self,
        raw: &RawTable,
        exp_type: u32,
        rewards_sum: f64,
        subjects: SubjectRange,
    ) -> Result<(Vec<u32>, ProcessedTable), DsError> {
        preprocess(raw, exp_type, rewards_sum, subjects, self.min_samples)
    }

    /// Appends velocity, speed and acceleration columns.
    pub fn append_derivatives(&self, table: ProcessedTable) -> Result<ProcessedTable, DsError> {
        append_derivatives(table)
    }
}
