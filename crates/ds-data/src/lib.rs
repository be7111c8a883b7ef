#![deny(missing_docs)]
#![doc = "Data reader for two-choice cursor trajectories: CSV loading, condition filters and kinematic derivatives."]

/// Finite-difference kinematics.
pub mod derivatives;
/// Trial selection and trajectory assembly.
pub mod preprocess;
/// CSV reader entry point.
pub mod reader;
/// Raw row schema.
pub mod record;
/// Deterministic synthetic datasets.
pub mod synth;
/// Processed trajectory table.
pub mod table;

pub use derivatives::{append_derivatives, gradient};
pub use preprocess::{preprocess, RewardCondition, SubjectRange, LOW_REWARD};
pub use reader::{DataReader, DEFAULT_MIN_SAMPLES};
pub use record::{RawRecord, RawTable};
pub use synth::{synthesise, write_csv, SynthSpec};
pub use table::{Derivatives, ProcessedTable, Sample, Trajectory, TrajectoryKey};
