use ds_core::errors::{DsError, ErrorInfo};
use ds_data::ProcessedTable;
use serde::{Deserialize, Serialize};

const DEGENERATE_PADDING: f64 = 0.5;

/// Requested grid resolution and optional fixed bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    /// Number of bins along x.
    #[serde(default = "GridSpec::default_bins")]
    pub x_bins: usize,
    /// Number of bins along y.
    #[serde(default = "GridSpec::default_bins")]
    pub y_bins: usize,
    /// Fixed `[lo, hi]` bounds along x; derived from the data when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_range: Option<[f64; 2]>,
    /// Fixed `[lo, hi]` bounds along y; derived from the data when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_range: Option<[f64; 2]>,
}

impl GridSpec {
    fn default_bins() -> usize {
        20
    }

    /// Grid with the given resolution and data-derived bounds.
    pub fn with_bins(x_bins: usize, y_bins: usize) -> Self {
        Self {
            x_bins,
            y_bins,
            x_range: None,
            y_range: None,
        }
    }

    /// Resolves concrete bin edges for the table.
    pub fn resolve(&self, table: &ProcessedTable) -> Result<Binning, DsError> {
        if self.x_bins == 0 || self.y_bins == 0 {
            return Err(DsError::Space(
                ErrorInfo::new("space-grid", "grid needs at least one bin per axis")
                    .with_context("x_bins", self.x_bins.to_string())
                    .with_context("y_bins", self.y_bins.to_string()),
            ));
        }
        if table.sample_count() == 0 {
            return Err(DsError::Space(ErrorInfo::new(
                "space-empty",
                "no samples to place on the grid",
            )));
        }
        let x = match self.x_range {
            Some(range) => Axis::fixed(range, self.x_bins)?,
            None => Axis::spanning(table.samples().map(|(_, s)| s.x), self.x_bins),
        };
        let y = match self.y_range {
            Some(range) => Axis::fixed(range, self.y_bins)?,
            None => Axis::spanning(table.samples().map(|(_, s)| s.y), self.y_bins),
        };
        Ok(Binning { x, y })
    }
}

impl Default for GridSpec {
    fn default() -> Self {
        Self::with_bins(Self::default_bins(), Self::default_bins())
    }
}

/// Uniform bins over `[lo, hi]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    /// Lower bound.
    pub lo: f64,
    /// Upper bound.
    pub hi: f64,
    /// Number of bins.
    pub bins: usize,
}

impl Axis {
    fn fixed(range: [f64; 2], bins: usize) -> Result<Self, DsError> {
        let [lo, hi] = range;
        if !(lo.is_finite() && hi.is_finite()) || lo >= hi {
            return Err(DsError::Space(
                ErrorInfo::new("space-grid", "grid range must be finite and increasing")
                    .with_context("lo", lo.to_string())
                    .with_context("hi", hi.to_string()),
            ));
        }
        Ok(Self { lo, hi, bins })
    }

    fn spanning(values: impl Iterator<Item = f64>, bins: usize) -> Self {
        let (mut lo, mut hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        if hi - lo <= 0.0 {
            lo -= DEGENERATE_PADDING;
            hi += DEGENERATE_PADDING;
        }
        Self { lo, hi, bins }
    }

    /// Width of a single bin.
    pub fn width(&self) -> f64 {
        (self.hi - self.lo) / self.bins as f64
    }

    /// `bins + 1` bin edges.
    pub fn edges(&self) -> Vec<f64> {
        (0..=self.bins)
            .map(|idx| self.lo + idx as f64 * self.width())
            .collect()
    }

    /// Bin midpoints.
    pub fn centers(&self) -> Vec<f64> {
        (0..self.bins)
            .map(|idx| self.lo + (idx as f64 + 0.5) * self.width())
            .collect()
    }

    /// Bin index holding `value`. Bins are half-open except the last, which
    /// includes `hi`. Values outside the bounds map to `None`.
    pub fn locate(&self, value: f64) -> Option<usize> {
        if !value.is_finite() || value < self.lo || value > self.hi {
            return None;
        }
        let idx = ((value - self.lo) / self.width()).floor() as usize;
        Some(idx.min(self.bins - 1))
    }
}

/// Resolved x and y axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Binning {
    /// Horizontal axis.
    pub x: Axis,
    /// Vertical axis.
    pub y: Axis,
}

impl Binning {
    /// `(rows, cols)`: rows follow y, columns follow x.
    pub fn shape(&self) -> (usize, usize) {
        (self.y.bins, self.x.bins)
    }

    /// Flat row-major cell index for a position.
    pub fn cell(&self, x: f64, y: f64) -> Option<usize> {
        let col = self.x.locate(x)?;
        let row = self.y.locate(y)?;
        Some(row * self.x.bins + col)
    }

    /// Cell-center mesh.
    pub fn mesh(&self) -> Mesh {
        Mesh {
            x_centers: self.x.centers(),
            y_centers: self.y.centers(),
        }
    }
}

/// Cell centers of a decision-space grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    /// Centers along x.
    pub x_centers: Vec<f64>,
    /// Centers along y.
    pub y_centers: Vec<f64>,
}

impl Mesh {
    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.y_centers.len(), self.x_centers.len())
    }

    /// Meshgrid of x coordinates; every row repeats the x centers.
    pub fn x_grid(&self) -> Vec<Vec<f64>> {
        self.y_centers
            .iter()
            .map(|_| self.x_centers.clone())
            .collect()
    }

    /// Meshgrid of y coordinates; row `r` is filled with `y_centers[r]`.
    pub fn y_grid(&self) -> Vec<Vec<f64>> {
        self.y_centers
            .iter()
            .map(|&y| vec![y; self.x_centers.len()])
            .collect()
    }
}
