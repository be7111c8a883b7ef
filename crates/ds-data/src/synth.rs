use std::path::Path;

use ds_core::errors::{DsError, ErrorInfo};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::preprocess::{RewardCondition, SubjectRange, LOW_REWARD};
use crate::record::{RawRecord, RawTable};

/// Parameters of a synthetic two-choice dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthSpec {
    /// Master seed.
    pub seed: u64,
    /// Subjects to generate, inclusive.
    #[serde(default)]
    pub subjects: SubjectRange,
    /// Experiment types (high reward magnitudes).
    #[serde(default = "SynthSpec::default_exp_types")]
    pub exp_types: Vec<u32>,
    /// Trials per subject, experiment type and reward condition.
    #[serde(default = "SynthSpec::default_trials")]
    pub trials_per_condition: u32,
    /// Samples recorded per trial.
    #[serde(default = "SynthSpec::default_samples")]
    pub samples_per_trial: usize,
    /// Half-width of the uniform position noise.
    #[serde(default = "SynthSpec::default_noise")]
    pub noise: f64,
}

impl SynthSpec {
    fn default_exp_types() -> Vec<u32> {
        vec![10, 20]
    }
    fn default_trials() -> u32 {
        4
    }
    fn default_samples() -> usize {
        40
    }
    fn default_noise() -> f64 {
        0.01
    }

    /// Spec with default sizes and the given seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            subjects: SubjectRange::default(),
            exp_types: Self::default_exp_types(),
            trials_per_condition: Self::default_trials(),
            samples_per_trial: Self::default_samples(),
            noise: Self::default_noise(),
        }
    }
}

/// Generates curved cursor trajectories from a start point toward one of two
/// targets at `(-1, 1.5)` and `(1, 1.5)`. Subjects prefer the richer side and
/// commit to it with a randomly late bend.
pub fn synthesise(spec: &SynthSpec) -> RawTable {
    let mut rng = StdRng::seed_from_u64(spec.seed);
    let samples = spec.samples_per_trial.max(2);
    let mut records = Vec::new();

    for subj_id in spec.subjects.lo..=spec.subjects.hi {
        let mut trial_no = 0u32;
        for &exp_type in &spec.exp_types {
            let high = f64::from(exp_type);
            for condition in RewardCondition::ALL {
                for _ in 0..spec.trials_per_condition {
                    trial_no += 1;
                    let (reward_left, reward_right) = match condition {
                        RewardCondition::HighHigh => (high, high),
                        RewardCondition::LowLow => (LOW_REWARD, LOW_REWARD),
                        RewardCondition::HighLow if rng.gen_bool(0.5) => (high, LOW_REWARD),
                        RewardCondition::HighLow => (LOW_REWARD, high),
                    };
                    let preferred = if reward_left > reward_right {
                        -1.0
                    } else if reward_right > reward_left {
                        1.0
                    } else if rng.gen_bool(0.5) {
                        -1.0
                    } else {
                        1.0
                    };
                    let side = if rng.gen_bool(0.8) { preferred } else { -preferred };
                    let bend: f64 = rng.gen_range(1.0..3.0);
                    let duration: f64 = rng.gen_range(0.8..1.6);
                    for step in 0..samples {
                        let s = step as f64 / (samples - 1) as f64;
                        let jitter = if spec.noise > 0.0 {
                            (
                                rng.gen_range(-spec.noise..spec.noise),
                                rng.gen_range(-spec.noise..spec.noise),
                            )
                        } else {
                            (0.0, 0.0)
                        };
                        records.push(RawRecord {
                            subj_id,
                            exp_type,
                            trial_no,
                            reward_left,
                            reward_right,
                            t: s * duration,
                            x: side * s.powf(bend) + jitter.0,
                            y: 1.5 * s + jitter.1,
                        });
                    }
                }
            }
        }
    }
    info!(seed = spec.seed, rows = records.len(), "synthesised dataset");
    RawTable::from_records(records)
}

/// Writes rows as CSV with a header line.
pub fn write_csv(table: &RawTable, path: &Path) -> Result<(), DsError> {
    let write_error = |err: csv::Error| {
        DsError::Data(
            ErrorInfo::new("data-write", "failed to write dataset")
                .with_context("path", path.display().to_string())
                .with_hint(err.to_string()),
        )
    };
    let mut writer = csv::Writer::from_path(path).map_err(write_error)?;
    for record in &table.records {
        writer.serialize(record).map_err(write_error)?;
    }
    writer.flush().map_err(|err| write_error(err.into()))?;
    Ok(())
}
