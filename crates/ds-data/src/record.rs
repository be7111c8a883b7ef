use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One sample row of the raw dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Subject identifier.
    pub subj_id: u32,
    /// Experiment type; doubles as the high reward magnitude.
    pub exp_type: u32,
    /// Trial number within the subject's session.
    pub trial_no: u32,
    /// Reward offered by the left option.
    pub reward_left: f64,
    /// Reward offered by the right option.
    pub reward_right: f64,
    /// Sample timestamp in seconds.
    pub t: f64,
    /// Horizontal cursor position.
    pub x: f64,
    /// Vertical cursor position.
    pub y: f64,
}

impl RawRecord {
    /// Sum of both offered rewards.
    pub fn rewards_sum(&self) -> f64 {
        self.reward_left + self.reward_right
    }
}

/// Raw dataset as loaded from disk.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawTable {
    /// File the rows were read from, if any.
    #[serde(default)]
    pub source: Option<PathBuf>,
    /// SHA256 of the raw input bytes.
    #[serde(default)]
    pub input_hash: String,
    /// Rows in file order.
    pub records: Vec<RawRecord>,
}

impl RawTable {
    /// Builds an in-memory table without a backing file.
    pub fn from_records(records: Vec<RawRecord>) -> Self {
        Self {
            source: None,
            input_hash: String::new(),
            records,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true when the table holds no rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
