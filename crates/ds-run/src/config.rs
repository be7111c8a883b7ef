use std::fs;
use std::path::{Path, PathBuf};

use ds_core::errors::{DsError, ErrorInfo};
use ds_core::hash::stable_hash_string;
use ds_data::{RewardCondition, SubjectRange, DEFAULT_MIN_SAMPLES};
use ds_plot::{Colormap, PlotStyle};
use ds_space::{FieldColumn, GridSpec};
use serde::{Deserialize, Serialize};

fn config_error(code: &str, err: impl ToString) -> DsError {
    DsError::Config(ErrorInfo::new(code, err.to_string()))
}

/// Where the raw dataset lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    /// CSV path; relative paths resolve against the config file's directory.
    #[serde(default = "DataConfig::default_path")]
    pub path: PathBuf,
    /// Shortest trajectory kept after preprocessing.
    #[serde(default = "DataConfig::default_min_samples")]
    pub min_samples: usize,
}

impl DataConfig {
    fn default_path() -> PathBuf {
        PathBuf::from("trajectories.csv")
    }
    fn default_min_samples() -> usize {
        DEFAULT_MIN_SAMPLES
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: Self::default_path(),
            min_samples: Self::default_min_samples(),
        }
    }
}

/// Experimental condition to analyse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Experiment type, also the high reward magnitude.
    #[serde(default = "SelectionConfig::default_exp_type")]
    pub exp_type: u32,
    /// Reward pairing used to derive the reward sum.
    #[serde(default = "SelectionConfig::default_condition")]
    pub condition: RewardCondition,
    /// Explicit reward sum; takes precedence over `condition`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rewards_sum: Option<f64>,
    /// Subject identifiers to keep.
    #[serde(default)]
    pub subjects: SubjectRange,
}

impl SelectionConfig {
    fn default_exp_type() -> u32 {
        20
    }
    fn default_condition() -> RewardCondition {
        RewardCondition::HighLow
    }

    /// Effective reward sum.
    pub fn rewards_sum(&self) -> f64 {
        self.rewards_sum
            .unwrap_or_else(|| self.condition.rewards_sum(self.exp_type))
    }

    /// Short human readable label for titles and logs.
    pub fn label(&self) -> String {
        match self.rewards_sum {
            Some(sum) => format!("exp {} sum {}", self.exp_type, sum),
            None => format!("exp {} {}", self.exp_type, self.condition),
        }
    }
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            exp_type: Self::default_exp_type(),
            condition: Self::default_condition(),
            rewards_sum: None,
            subjects: SubjectRange::default(),
        }
    }
}

/// Colormaps and canvas for the rendered surfaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotsConfig {
    /// Colormap of the row-wise surface.
    #[serde(default = "PlotsConfig::default_row_wise")]
    pub row_wise: Colormap,
    /// Colormap of the cell-wise surface.
    #[serde(default = "PlotsConfig::default_cell_wise")]
    pub cell_wise: Colormap,
    /// When set, also plots row-wise minus cell-wise with this colormap.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difference: Option<Colormap>,
    /// Canvas and camera.
    #[serde(default)]
    pub style: PlotStyle,
}

impl PlotsConfig {
    fn default_row_wise() -> Colormap {
        Colormap::Winter
    }
    fn default_cell_wise() -> Colormap {
        Colormap::Spring
    }
}

impl Default for PlotsConfig {
    fn default() -> Self {
        Self {
            row_wise: Self::default_row_wise(),
            cell_wise: Self::default_cell_wise(),
            difference: None,
            style: PlotStyle::default(),
        }
    }
}

/// Persisted artefacts besides plots and the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputsConfig {
    /// Write both decision spaces as canonical JSON.
    #[serde(default = "OutputsConfig::default_write_surfaces")]
    pub write_surfaces: bool,
}

impl OutputsConfig {
    fn default_write_surfaces() -> bool {
        true
    }
}

impl Default for OutputsConfig {
    fn default() -> Self {
        Self {
            write_surfaces: Self::default_write_surfaces(),
        }
    }
}

/// Complete analysis configuration. Every field has a default, so an empty
/// YAML document is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Dataset location.
    #[serde(default)]
    pub data: DataConfig,
    /// Condition selection.
    #[serde(default)]
    pub selection: SelectionConfig,
    /// Decision-space grid.
    #[serde(default)]
    pub grid: GridSpec,
    /// Averaged response column.
    #[serde(default)]
    pub field: FieldColumn,
    /// Minimum support per cell.
    #[serde(default = "AnalysisConfig::default_min_support")]
    pub min_support: u32,
    /// Plot settings.
    #[serde(default)]
    pub plots: PlotsConfig,
    /// Extra outputs.
    #[serde(default)]
    pub outputs: OutputsConfig,
    /// Directory containing the config on disk (ignored when serializing).
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            data: DataConfig::default(),
            selection: SelectionConfig::default(),
            grid: GridSpec::default(),
            field: FieldColumn::default(),
            min_support: Self::default_min_support(),
            plots: PlotsConfig::default(),
            outputs: OutputsConfig::default(),
            base_dir: PathBuf::new(),
        }
    }
}

impl AnalysisConfig {
    fn default_min_support() -> u32 {
        1
    }

    /// Deterministic hash of the configuration contents.
    pub fn config_hash(&self) -> Result<String, DsError> {
        stable_hash_string(self)
    }

    /// Canonical YAML rendering.
    pub fn to_yaml_string(&self) -> Result<String, DsError> {
        serde_yaml::to_string(self).map_err(|err| config_error("config-serialize", err))
    }

    /// Dataset path resolved against [`AnalysisConfig::base_dir`].
    pub fn data_path(&self) -> PathBuf {
        if self.data.path.is_absolute() {
            self.data.path.clone()
        } else {
            self.base_dir.join(&self.data.path)
        }
    }

    /// Rejects settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), DsError> {
        self.selection.subjects.validate()?;
        if self.min_support == 0 {
            return Err(DsError::Config(
                ErrorInfo::new("config-invalid", "min_support must be at least one")
                    .with_context("field", "min_support"),
            ));
        }
        if self.grid.x_bins == 0 || self.grid.y_bins == 0 {
            return Err(DsError::Config(
                ErrorInfo::new("config-invalid", "grid needs at least one bin per axis")
                    .with_context("x_bins", self.grid.x_bins.to_string())
                    .with_context("y_bins", self.grid.y_bins.to_string()),
            ));
        }
        if let Some(sum) = self.selection.rewards_sum {
            if !sum.is_finite() {
                return Err(DsError::Config(
                    ErrorInfo::new("config-invalid", "rewards_sum must be finite")
                        .with_context("field", "selection.rewards_sum"),
                ));
            }
        }
        Ok(())
    }
}

/// Parses a YAML configuration; blank input yields the defaults.
pub fn from_yaml_str(text: &str) -> Result<AnalysisConfig, DsError> {
    if text.trim().is_empty() {
        return Ok(AnalysisConfig::default());
    }
    serde_yaml::from_str(text).map_err(|err| config_error("config-parse", err))
}

/// Loads a configuration file and records its directory for path resolution.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AnalysisConfig, DsError> {
    let config_path = path.as_ref();
    let text = fs::read_to_string(config_path).map_err(|err| {
        DsError::Config(
            ErrorInfo::new("config-read", "failed to read configuration")
                .with_context("path", config_path.display().to_string())
                .with_hint(err.to_string()),
        )
    })?;
    let mut config = from_yaml_str(&text)?;
    config.base_dir = config_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();
    config.validate()?;
    Ok(config)
}
