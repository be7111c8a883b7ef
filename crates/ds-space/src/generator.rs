use std::collections::BTreeMap;
use std::fmt;

use ds_core::errors::{DsError, ErrorInfo};
use ds_data::{ProcessedTable, Sample, TrajectoryKey};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::grid::{Binning, GridSpec, Mesh};
use crate::surface::Surface;

/// Response column averaged into each cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FieldColumn {
    /// Horizontal velocity.
    #[default]
    Vx,
    /// Vertical velocity.
    Vy,
    /// Speed.
    Speed,
    /// Horizontal acceleration.
    Ax,
    /// Vertical acceleration.
    Ay,
    /// Time since onset.
    T,
}

impl FieldColumn {
    /// Whether the column only exists after derivatives were appended.
    pub fn requires_derivatives(self) -> bool {
        !matches!(self, FieldColumn::T)
    }

    /// Reads the column from a sample.
    pub fn value(self, sample: &Sample) -> Option<f64> {
        if self == FieldColumn::T {
            return Some(sample.t);
        }
        let d = sample.derivatives?;
        Some(match self {
            FieldColumn::Vx => d.vx,
            FieldColumn::Vy => d.vy,
            FieldColumn::Speed => d.speed,
            FieldColumn::Ax => d.ax,
            FieldColumn::Ay => d.ay,
            FieldColumn::T => sample.t,
        })
    }

    /// Column name.
    pub fn label(self) -> &'static str {
        match self {
            FieldColumn::Vx => "vx",
            FieldColumn::Vy => "vy",
            FieldColumn::Speed => "speed",
            FieldColumn::Ax => "ax",
            FieldColumn::Ay => "ay",
            FieldColumn::T => "t",
        }
    }
}

impl fmt::Display for FieldColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How samples sharing a cell are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Aggregation {
    /// Mean over every sample in the cell; long dwells weigh more.
    RowWise,
    /// Mean of per-trajectory means; each trajectory counts once per cell.
    CellWise,
}

impl Aggregation {
    /// Kebab-case label.
    pub fn label(self) -> &'static str {
        match self {
            Aggregation::RowWise => "row-wise",
            Aggregation::CellWise => "cell-wise",
        }
    }
}

/// A generated decision space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionSpace {
    /// Aggregation policy that produced the field.
    pub aggregation: Aggregation,
    /// Averaged column.
    pub column: FieldColumn,
    /// Resolved bins.
    pub binning: Binning,
    /// Cell centers.
    pub mesh: Mesh,
    /// Averaged field.
    pub field: Surface,
    /// Samples falling outside the grid bounds.
    pub skipped: usize,
}

impl DecisionSpace {
    /// Meshgrid of x coordinates.
    pub fn x_grid(&self) -> Vec<Vec<f64>> {
        self.mesh.x_grid()
    }

    /// Meshgrid of y coordinates.
    pub fn y_grid(&self) -> Vec<Vec<f64>> {
        self.mesh.y_grid()
    }

    /// Splits into `(field, x_grid, y_grid)`.
    pub fn into_parts(self) -> (Surface, Vec<Vec<f64>>, Vec<Vec<f64>>) {
        let x_grid = self.mesh.x_grid();
        let y_grid = self.mesh.y_grid();
        (self.field, x_grid, y_grid)
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    sum: f64,
    count: u32,
}

impl Accumulator {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn mean(&self) -> f64 {
        self.sum / f64::from(self.count)
    }
}

type CellContributions = BTreeMap<TrajectoryKey, Accumulator>;

/// Builds decision spaces from processed trajectory tables.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionSpaceGenerator {
    grid: GridSpec,
    column: FieldColumn,
    min_support: u32,
}

impl DecisionSpaceGenerator {
    /// Generator averaging `column` over `grid`.
    pub fn new(grid: GridSpec, column: FieldColumn) -> Self {
        Self {
            grid,
            column,
            min_support: 1,
        }
    }

    /// Cells backed by fewer samples (row-wise) or trajectories (cell-wise)
    /// than `min_support` are left empty.
    pub fn with_min_support(mut self, min_support: u32) -> Self {
        self.min_support = min_support.max(1);
        self
    }

    /// Grid specification.
    pub fn grid(&self) -> &GridSpec {
        &self.grid
    }

    /// Averaged column.
    pub fn column(&self) -> FieldColumn {
        self.column
    }

    /// Row-wise decision space: every sample in a cell weighs the same.
    pub fn generate_ds(&self, table: &ProcessedTable) -> Result<DecisionSpace, DsError> {
        self.generate(Aggregation::RowWise, table)
    }

    /// Cell-wise decision space: samples are averaged per trajectory first,
    /// then trajectories are averaged with equal weight.
    pub fn generate_ds_cell_wise(&self, table: &ProcessedTable) -> Result<DecisionSpace, DsError> {
        self.generate(Aggregation::CellWise, table)
    }

    /// Generates a decision space with the requested aggregation.
    pub fn generate(
        &self,
        aggregation: Aggregation,
        table: &ProcessedTable,
    ) -> Result<DecisionSpace, DsError> {
        if self.column.requires_derivatives() && !table.is_empty() && !table.has_derivatives() {
            return Err(DsError::Space(
                ErrorInfo::new(
                    "space-missing-derivatives",
                    "field column needs derivative columns",
                )
                .with_context("column", self.column.label())
                .with_hint("append derivatives before generating the decision space"),
            ));
        }
        let binning = self.grid.resolve(table)?;
        let (cells, skipped) = self.collect(table, &binning)?;
        let (rows, cols) = binning.shape();
        let mut field = Surface::empty(rows, cols);
        for (idx, contributions) in cells.iter().enumerate() {
            let (value, support) = match aggregation {
                Aggregation::RowWise => row_wise(contributions),
                Aggregation::CellWise => cell_wise(contributions),
            };
            field.support[idx] = support;
            if support >= self.min_support {
                field.values[idx] = value;
            }
        }

        if skipped > 0 {
            warn!(skipped, "samples fell outside the grid bounds");
        }
        info!(
            aggregation = aggregation.label(),
            column = self.column.label(),
            rows,
            cols,
            defined = field.defined_cells(),
            "generated decision space"
        );
        Ok(DecisionSpace {
            aggregation,
            column: self.column,
            mesh: binning.mesh(),
            binning,
            field,
            skipped,
        })
    }

    fn collect(
        &self,
        table: &ProcessedTable,
        binning: &Binning,
    ) -> Result<(Vec<CellContributions>, usize), DsError> {
        let (rows, cols) = binning.shape();
        let mut cells = vec![CellContributions::new(); rows * cols];
        let mut skipped = 0usize;
        for (key, sample) in table.samples() {
            let value = self.column.value(sample).ok_or_else(|| {
                DsError::Space(
                    ErrorInfo::new("space-missing-derivatives", "sample lacks derivative columns")
                        .with_context("subj_id", key.subj_id.to_string())
                        .with_context("trial_no", key.trial_no.to_string()),
                )
            })?;
            match binning.cell(sample.x, sample.y) {
                Some(idx) => cells[idx].entry(key).or_default().push(value),
                None => skipped += 1,
            }
        }
        debug!(cells = cells.len(), skipped, "binned samples");
        Ok((cells, skipped))
    }
}

fn row_wise(contributions: &CellContributions) -> (Option<f64>, u32) {
    let total = contributions
        .values()
        .fold(Accumulator::default(), |mut acc, traj| {
            acc.sum += traj.sum;
            acc.count += traj.count;
            acc
        });
    if total.count == 0 {
        return (None, 0);
    }
    (Some(total.mean()), total.count)
}

fn cell_wise(contributions: &CellContributions) -> (Option<f64>, u32) {
    if contributions.is_empty() {
        return (None, 0);
    }
    let mut means = Accumulator::default();
    for traj in contributions.values() {
        means.push(traj.mean());
    }
    (Some(means.mean()), means.count)
}
