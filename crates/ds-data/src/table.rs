use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Identifies a single trial trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TrajectoryKey {
    /// Subject identifier.
    pub subj_id: u32,
    /// Trial number.
    pub trial_no: u32,
}

/// Kinematic columns derived from positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Derivatives {
    /// Horizontal velocity.
    pub vx: f64,
    /// Vertical velocity.
    pub vy: f64,
    /// Velocity magnitude.
    pub speed: f64,
    /// Horizontal acceleration.
    pub ax: f64,
    /// Vertical acceleration.
    pub ay: f64,
}

/// A single position sample inside a trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Time since trajectory onset.
    pub t: f64,
    /// Horizontal position.
    pub x: f64,
    /// Vertical position.
    pub y: f64,
    /// Derived kinematics, present after [`crate::append_derivatives`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derivatives: Option<Derivatives>,
}

impl Sample {
    /// Creates a sample without derived columns.
    pub fn new(t: f64, x: f64, y: f64) -> Self {
        Self {
            t,
            x,
            y,
            derivatives: None,
        }
    }
}

/// Time-ordered samples of one trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    /// Subject and trial identifier.
    pub key: TrajectoryKey,
    /// Experiment type shared by every row of the trial.
    pub exp_type: u32,
    /// Left reward.
    pub reward_left: f64,
    /// Right reward.
    pub reward_right: f64,
    /// Samples ordered by strictly increasing time.
    pub samples: Vec<Sample>,
}

impl Trajectory {
    /// Sum of both offered rewards.
    pub fn rewards_sum(&self) -> f64 {
        self.reward_left + self.reward_right
    }

    /// Returns true when every sample carries derived columns.
    pub fn has_derivatives(&self) -> bool {
        !self.samples.is_empty() && self.samples.iter().all(|s| s.derivatives.is_some())
    }
}

/// Filtered trajectories ready for decision-space generation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProcessedTable {
    /// Trajectories ordered by key.
    pub trajectories: Vec<Trajectory>,
}

impl ProcessedTable {
    /// Wraps trajectories, restoring key order.
    pub fn new(mut trajectories: Vec<Trajectory>) -> Self {
        trajectories.sort_by_key(|traj| traj.key);
        Self { trajectories }
    }

    /// Sorted unique subject identifiers present in the table.
    pub fn subject_ids(&self) -> Vec<u32> {
        self.trajectories
            .iter()
            .map(|traj| traj.key.subj_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Total number of samples across all trajectories.
    pub fn sample_count(&self) -> usize {
        self.trajectories.iter().map(|traj| traj.samples.len()).sum()
    }

    /// Returns true when the table holds no trajectories.
    pub fn is_empty(&self) -> bool {
        self.trajectories.is_empty()
    }

    /// Returns true when every trajectory carries derived columns.
    pub fn has_derivatives(&self) -> bool {
        !self.trajectories.is_empty() && self.trajectories.iter().all(Trajectory::has_derivatives)
    }

    /// Iterates over every sample together with its trajectory key.
    pub fn samples(&self) -> impl Iterator<Item = (TrajectoryKey, &Sample)> + '_ {
        self.trajectories
            .iter()
            .flat_map(|traj| traj.samples.iter().map(move |sample| (traj.key, sample)))
    }
}
