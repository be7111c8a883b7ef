use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use ds_core::errors::{DsError, ErrorInfo};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::record::RawTable;
use crate::table::{ProcessedTable, Sample, Trajectory, TrajectoryKey};

/// Magnitude of the low reward option.
pub const LOW_REWARD: f64 = 5.0;

const REWARD_TOLERANCE: f64 = 1e-9;

/// Inclusive range of subject identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectRange {
    /// Lowest accepted identifier.
    pub lo: u32,
    /// Highest accepted identifier.
    pub hi: u32,
}

impl SubjectRange {
    /// Creates a range, rejecting `lo > hi`.
    pub fn new(lo: u32, hi: u32) -> Result<Self, DsError> {
        let range = Self { lo, hi };
        range.validate()?;
        Ok(range)
    }

    /// Checks that the bounds are ordered.
    pub fn validate(&self) -> Result<(), DsError> {
        if self.lo > self.hi {
            return Err(DsError::Data(
                ErrorInfo::new("data-range", "subject range lower bound exceeds upper bound")
                    .with_context("lo", self.lo.to_string())
                    .with_context("hi", self.hi.to_string()),
            ));
        }
        Ok(())
    }

    /// Returns true when `subj_id` lies within the inclusive bounds.
    pub fn contains(&self, subj_id: u32) -> bool {
        subj_id >= self.lo && subj_id <= self.hi
    }
}

impl Default for SubjectRange {
    fn default() -> Self {
        Self { lo: 18, hi: 36 }
    }
}

impl fmt::Display for SubjectRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.lo, self.hi)
    }
}

impl FromStr for SubjectRange {
    type Err = DsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_error = || {
            DsError::Data(
                ErrorInfo::new("data-range", "subject range must look like LO-HI")
                    .with_context("value", s),
            )
        };
        let (lo, hi) = s.split_once('-').ok_or_else(parse_error)?;
        let lo = lo.trim().parse().map_err(|_| parse_error())?;
        let hi = hi.trim().parse().map_err(|_| parse_error())?;
        Self::new(lo, hi)
    }
}

/// Pairing of the two offered rewards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RewardCondition {
    /// Both options pay the high reward.
    HighHigh,
    /// One high and one low option.
    HighLow,
    /// Both options pay the low reward.
    LowLow,
}

impl RewardCondition {
    /// All conditions in presentation order.
    pub const ALL: [RewardCondition; 3] = [
        RewardCondition::HighHigh,
        RewardCondition::HighLow,
        RewardCondition::LowLow,
    ];

    /// Reward sum for this condition given the experiment's high reward.
    pub fn rewards_sum(self, exp_type: u32) -> f64 {
        let high = f64::from(exp_type);
        match self {
            RewardCondition::HighHigh => 2.0 * high,
            RewardCondition::HighLow => high + LOW_REWARD,
            RewardCondition::LowLow => 2.0 * LOW_REWARD,
        }
    }

    /// Kebab-case label.
    pub fn label(self) -> &'static str {
        match self {
            RewardCondition::HighHigh => "high-high",
            RewardCondition::HighLow => "high-low",
            RewardCondition::LowLow => "low-low",
        }
    }
}

impl fmt::Display for RewardCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RewardCondition {
    type Err = DsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|condition| condition.label() == s)
            .ok_or_else(|| {
                DsError::Data(
                    ErrorInfo::new("data-condition", "unknown reward condition")
                        .with_context("value", s)
                        .with_hint("expected high-high, high-low or low-low"),
                )
            })
    }
}

/// Filters raw rows into trajectories of one experimental condition.
///
/// Rows are grouped by subject and trial. Every row of a selected trial must
/// agree on experiment type and rewards; disagreeing trials that never match
/// the selection are dropped. Samples are ordered by time, repeated or
/// backwards timestamps are dropped, time is rebased to the first sample and
/// trajectories shorter than `min_samples` are discarded.
pub fn preprocess(
    raw: &RawTable,
    exp_type: u32,
    rewards_sum: f64,
    subjects: SubjectRange,
    min_samples: usize,
) -> Result<(Vec<u32>, ProcessedTable), DsError> {
    subjects.validate()?;

    let mut grouped: BTreeMap<TrajectoryKey, Trajectory> = BTreeMap::new();
    let mut inconsistent: BTreeSet<TrajectoryKey> = BTreeSet::new();
    let mut selected: BTreeSet<TrajectoryKey> = BTreeSet::new();
    for record in raw.records.iter().filter(|r| subjects.contains(r.subj_id)) {
        let key = TrajectoryKey {
            subj_id: record.subj_id,
            trial_no: record.trial_no,
        };
        if record.exp_type == exp_type
            && (record.rewards_sum() - rewards_sum).abs() <= REWARD_TOLERANCE
        {
            selected.insert(key);
        }
        let traj = grouped.entry(key).or_insert_with(|| Trajectory {
            key,
            exp_type: record.exp_type,
            reward_left: record.reward_left,
            reward_right: record.reward_right,
            samples: Vec::new(),
        });
        if traj.exp_type != record.exp_type
            || traj.reward_left != record.reward_left
            || traj.reward_right != record.reward_right
        {
            inconsistent.insert(key);
        }
        traj.samples.push(Sample::new(record.t, record.x, record.y));
    }

    // Malformed trials only matter when they touch the selected condition.
    if let Some(key) = inconsistent.intersection(&selected).next() {
        return Err(DsError::Data(
            ErrorInfo::new("data-inconsistent", "rows of one trial disagree on condition")
                .with_context("subj_id", key.subj_id.to_string())
                .with_context("trial_no", key.trial_no.to_string()),
        ));
    }
    if !inconsistent.is_empty() {
        warn!(
            trials = inconsistent.len(),
            "ignoring inconsistent trials outside the selection"
        );
    }
    grouped.retain(|key, _| !inconsistent.contains(key));

    let candidates = grouped.len();
    let mut dropped_samples = 0usize;
    let mut short = 0usize;
    let mut kept = Vec::new();
    for (_, mut traj) in grouped {
        if traj.exp_type != exp_type || (traj.rewards_sum() - rewards_sum).abs() > REWARD_TOLERANCE
        {
            continue;
        }
        dropped_samples += normalise_time(&mut traj.samples);
        if traj.samples.len() < min_samples {
            debug!(
                subj_id = traj.key.subj_id,
                trial_no = traj.key.trial_no,
                samples = traj.samples.len(),
                "dropping short trajectory"
            );
            short += 1;
            continue;
        }
        kept.push(traj);
    }

    if dropped_samples > 0 {
        warn!(dropped_samples, "dropped samples with non-increasing timestamps");
    }
    if short > 0 {
        warn!(short, min_samples, "dropped trajectories below minimum length");
    }

    let table = ProcessedTable::new(kept);
    let subject_ids: Vec<u32> = table
        .trajectories
        .iter()
        .map(|traj| traj.key.subj_id)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    info!(
        exp_type,
        rewards_sum,
        subjects = %subjects,
        candidates,
        trajectories = table.trajectories.len(),
        subject_count = subject_ids.len(),
        "preprocessed dataset"
    );
    Ok((subject_ids, table))
}

/// Sorts by time, removes non-increasing timestamps and rebases to zero.
/// Returns the number of removed samples.
fn normalise_time(samples: &mut Vec<Sample>) -> usize {
    samples.sort_by(|a, b| a.t.total_cmp(&b.t));
    let before = samples.len();
    samples.dedup_by(|later, earlier| later.t <= earlier.t);
    if let Some(origin) = samples.first().map(|s| s.t) {
        for sample in samples.iter_mut() {
            sample.t -= origin;
        }
    }
    before - samples.len()
}
