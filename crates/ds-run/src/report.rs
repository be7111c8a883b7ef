use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::Utc;
use ds_core::errors::{DsError, ErrorInfo};
use ds_core::hash::stable_hash_string;
use ds_core::provenance::{RunProvenance, SchemaVersion};
use ds_core::serde::from_json_slice;
use ds_data::SubjectRange;
use ds_space::{Binning, DecisionSpace, FieldColumn, SurfaceComparison, SurfaceSummary};
use serde::{Deserialize, Serialize};

/// File name of the run report inside an output directory.
pub const REPORT_FILE: &str = "analysis_report.json";
/// File name of the per-invocation metadata next to the report.
pub const META_FILE: &str = "run_meta.json";

/// Wall-clock details of one invocation, kept apart from the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMeta {
    /// RFC 3339 timestamp of the run.
    pub created_at: String,
    /// Hash of the report written alongside.
    pub report_hash: String,
}

impl RunMeta {
    pub(crate) fn stamp(report: &AnalysisReport) -> Result<Self, DsError> {
        Ok(Self {
            created_at: Utc::now().to_rfc3339(),
            report_hash: stable_hash_string(report)?,
        })
    }
}

/// Canonical report of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Hash of the configuration driving the run.
    pub config_hash: String,
    /// Selected experiment type.
    pub exp_type: u32,
    /// Effective reward sum.
    pub rewards_sum: f64,
    /// Requested subject range.
    pub subjects: SubjectRange,
    /// Subjects that contributed at least one trajectory.
    pub subject_ids: Vec<u32>,
    /// Trajectories after preprocessing.
    pub trajectories: usize,
    /// Samples after preprocessing.
    pub samples: usize,
    /// Averaged column.
    pub field: FieldColumn,
    /// Resolved grid shared by both surfaces.
    pub grid: Binning,
    /// Samples outside the grid bounds.
    pub skipped_out_of_range: usize,
    /// Row-wise surface summary.
    pub row_wise: SurfaceSummary,
    /// Cell-wise surface summary.
    pub cell_wise: SurfaceSummary,
    /// Row-wise versus cell-wise agreement.
    pub comparison: SurfaceComparison,
    /// Plot files written, relative to the output directory.
    pub plots: Vec<String>,
    /// Provenance metadata.
    pub provenance: RunProvenance,
}

/// Inputs gathered by the pipeline before the report is assembled.
pub(crate) struct ReportParts<'a> {
    pub config_hash: String,
    pub input_hash: String,
    pub exp_type: u32,
    pub rewards_sum: f64,
    pub subjects: SubjectRange,
    pub subject_ids: Vec<u32>,
    pub trajectories: usize,
    pub samples: usize,
    pub row_wise: &'a DecisionSpace,
    pub cell_wise: &'a DecisionSpace,
    pub plots: Vec<String>,
}

impl AnalysisReport {
    pub(crate) fn assemble(parts: ReportParts<'_>) -> Self {
        Self {
            exp_type: parts.exp_type,
            rewards_sum: parts.rewards_sum,
            subjects: parts.subjects,
            subject_ids: parts.subject_ids,
            trajectories: parts.trajectories,
            samples: parts.samples,
            field: parts.row_wise.column,
            grid: parts.row_wise.binning,
            skipped_out_of_range: parts.row_wise.skipped,
            row_wise: SurfaceSummary::from_surface(&parts.row_wise.field),
            cell_wise: SurfaceSummary::from_surface(&parts.cell_wise.field),
            comparison: SurfaceComparison::between(
                &parts.row_wise.field,
                &parts.cell_wise.field,
            ),
            plots: parts.plots,
            provenance: provenance(&parts.config_hash, parts.input_hash),
            config_hash: parts.config_hash,
        }
    }
}

fn provenance(config_hash: &str, input_hash: String) -> RunProvenance {
    let mut versions = BTreeMap::new();
    versions.insert("ds-run".to_string(), env!("CARGO_PKG_VERSION").to_string());
    RunProvenance {
        schema_version: SchemaVersion::default(),
        config_hash: config_hash.to_string(),
        input_hash,
        tool_versions: versions,
    }
}

/// Reads the report of a completed run directory.
pub fn summarize(root: &Path) -> Result<AnalysisReport, DsError> {
    let path = root.join(REPORT_FILE);
    let bytes = fs::read(&path).map_err(|err| {
        DsError::Serde(
            ErrorInfo::new("report-read", "failed to read analysis report")
                .with_context("path", path.display().to_string())
                .with_hint(err.to_string()),
        )
    })?;
    from_json_slice(&bytes)
}
