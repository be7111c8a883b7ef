use ds_core::errors::{DsError, ErrorInfo};
use serde::{Deserialize, Serialize};

/// Row-major scalar field over a grid; `None` marks cells without enough support.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    /// Number of rows (y bins).
    pub rows: usize,
    /// Number of columns (x bins).
    pub cols: usize,
    /// Cell values, `rows * cols` long.
    pub values: Vec<Option<f64>>,
    /// Samples (row-wise) or trajectories (cell-wise) behind each cell.
    pub support: Vec<u32>,
}

impl Surface {
    /// All-empty surface.
    pub fn empty(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            values: vec![None; rows * cols],
            support: vec![0; rows * cols],
        }
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Value at `(row, col)`; `None` outside the grid or for empty cells.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.values[row * self.cols + col]
    }

    /// Values as nested rows.
    pub fn to_rows(&self) -> Vec<Vec<Option<f64>>> {
        if self.cols == 0 {
            return vec![Vec::new(); self.rows];
        }
        self.values.chunks(self.cols).map(<[_]>::to_vec).collect()
    }

    /// Iterates over defined values.
    pub fn defined(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().flatten().copied()
    }

    /// Number of defined cells.
    pub fn defined_cells(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// Element-wise `self - other`. Cells empty on either side stay empty.
    pub fn difference(&self, other: &Surface) -> Result<Surface, DsError> {
        if self.shape() != other.shape() {
            return Err(DsError::Space(
                ErrorInfo::new("space-shape", "surfaces have different shapes")
                    .with_context("left", format!("{}x{}", self.rows, self.cols))
                    .with_context("right", format!("{}x{}", other.rows, other.cols)),
            ));
        }
        let values = self
            .values
            .iter()
            .zip(&other.values)
            .map(|(a, b)| Some((*a)? - (*b)?))
            .collect();
        let support = self
            .support
            .iter()
            .zip(&other.support)
            .map(|(a, b)| (*a).min(*b))
            .collect();
        Ok(Surface {
            rows: self.rows,
            cols: self.cols,
            values,
            support,
        })
    }
}
