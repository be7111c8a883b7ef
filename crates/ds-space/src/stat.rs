use serde::{Deserialize, Serialize};

use crate::surface::Surface;

/// Aggregate view of a single surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSummary {
    /// Cells in the grid.
    pub total_cells: usize,
    /// Cells holding a value.
    pub defined_cells: usize,
    /// Smallest defined value.
    pub min: Option<f64>,
    /// Largest defined value.
    pub max: Option<f64>,
    /// Unweighted mean over defined cells.
    pub mean: Option<f64>,
    /// Sum of per-cell support.
    pub total_support: u64,
}

impl SurfaceSummary {
    /// Summarises the defined cells of `surface`.
    pub fn from_surface(surface: &Surface) -> Self {
        let values: Vec<f64> = surface.defined().collect();
        let (min, max, mean) = if values.is_empty() {
            (None, None, None)
        } else {
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let mean = values.iter().sum::<f64>() / values.len() as f64;
            (Some(min), Some(max), Some(mean))
        };
        Self {
            total_cells: surface.values.len(),
            defined_cells: values.len(),
            min,
            max,
            mean,
            total_support: surface.support.iter().map(|&s| u64::from(s)).sum(),
        }
    }
}

/// Agreement between two surfaces over the cells both define.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceComparison {
    /// Cells defined in both surfaces.
    pub co_defined: usize,
    /// Largest absolute difference.
    pub max_abs_diff: Option<f64>,
    /// Root mean square difference.
    pub rms_diff: Option<f64>,
    /// Pearson correlation of the paired values.
    pub pearson: Option<f64>,
}

impl SurfaceComparison {
    /// Compares `a` and `b` cell by cell. Surfaces of different shape share no cells.
    pub fn between(a: &Surface, b: &Surface) -> Self {
        let pairs: Vec<(f64, f64)> = if a.shape() == b.shape() {
            a.values
                .iter()
                .zip(&b.values)
                .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
                .collect()
        } else {
            Vec::new()
        };
        if pairs.is_empty() {
            return Self {
                co_defined: 0,
                max_abs_diff: None,
                rms_diff: None,
                pearson: None,
            };
        }
        let max_abs_diff = pairs
            .iter()
            .map(|(x, y)| (x - y).abs())
            .fold(0.0, f64::max);
        let rms_diff =
            (pairs.iter().map(|(x, y)| (x - y) * (x - y)).sum::<f64>() / pairs.len() as f64).sqrt();
        let xs: Vec<f64> = pairs.iter().map(|p| p.0).collect();
        let ys: Vec<f64> = pairs.iter().map(|p| p.1).collect();
        Self {
            co_defined: pairs.len(),
            max_abs_diff: Some(max_abs_diff),
            rms_diff: Some(rms_diff),
            pearson: Some(pearson(&xs, &ys)),
        }
    }
}

fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let len = xs.len();
    let mean_x = xs.iter().sum::<f64>() / len as f64;
    let mean_y = ys.iter().sum::<f64>() / len as f64;
    let mut num = 0.0;
    let mut denom_x = 0.0;
    let mut denom_y = 0.0;
    for (x, y) in xs.iter().zip(ys.iter()) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        num += dx * dy;
        denom_x += dx * dx;
        denom_y += dy * dy;
    }
    if denom_x == 0.0 || denom_y == 0.0 {
        return 0.0;
    }
    num / (denom_x.sqrt() * denom_y.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface(values: Vec<Option<f64>>) -> Surface {
        Surface {
            rows: 1,
            cols: values.len(),
            support: values.iter().map(|v| u32::from(v.is_some())).collect(),
            values,
        }
    }

    #[test]
    fn summary_skips_empty_cells() {
        let summary = SurfaceSummary::from_surface(&surface(vec![Some(1.0), None, Some(3.0)]));
        assert_eq!(summary.total_cells, 3);
        assert_eq!(summary.defined_cells, 2);
        assert_eq!(summary.min, Some(1.0));
        assert_eq!(summary.max, Some(3.0));
        assert_eq!(summary.mean, Some(2.0));
        assert_eq!(summary.total_support, 2);
    }

    #[test]
    fn comparison_uses_co_defined_cells() {
        let a = surface(vec![Some(1.0), Some(2.0), Some(3.0), None]);
        let b = surface(vec![Some(2.0), Some(4.0), None, Some(1.0)]);
        let cmp = SurfaceComparison::between(&a, &b);
        assert_eq!(cmp.co_defined, 2);
        assert_eq!(cmp.max_abs_diff, Some(2.0));
        assert!((cmp.rms_diff.unwrap() - (2.5f64).sqrt()).abs() < 1e-12);
        assert!((cmp.pearson.unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn mismatched_shapes_share_nothing() {
        let a = surface(vec![Some(1.0)]);
        let b = surface(vec![Some(1.0), Some(2.0)]);
        assert_eq!(SurfaceComparison::between(&a, &b).co_defined, 0);
    }
}
