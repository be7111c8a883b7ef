#![deny(missing_docs)]
#![doc = "End-to-end decision-space analysis: load, select, derive, aggregate and plot."]

/// YAML configuration.
pub mod config;
/// Pipeline execution.
pub mod dispatch;
/// Run report assembly.
pub mod report;

pub use config::{
    from_yaml_str, load_config, AnalysisConfig, DataConfig, OutputsConfig, PlotsConfig,
    SelectionConfig,
};
pub use dispatch::{run_analysis, run_analysis_from_path};
pub use report::{summarize, AnalysisReport, RunMeta, META_FILE, REPORT_FILE};
