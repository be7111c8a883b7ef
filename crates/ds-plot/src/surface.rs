use std::fs;
use std::path::{Path, PathBuf};

use ds_core::errors::{DsError, ErrorInfo};
use ds_space::{DecisionSpace, Surface};
use plotters::backend::SVGBackend;
use plotters::chart::ChartBuilder;
use plotters::drawing::IntoDrawingArea;
use plotters::element::Polygon;
use plotters::style::colors::{BLACK, WHITE};
use plotters::style::Color;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::colormap::Colormap;

fn draw_error(path: &Path, err: impl ToString) -> DsError {
    DsError::Plot(
        ErrorInfo::new("plot-draw", "failed to render surface")
            .with_context("path", path.display().to_string())
            .with_hint(err.to_string()),
    )
}

/// Canvas size and camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotStyle {
    /// Canvas width in pixels.
    #[serde(default = "PlotStyle::default_width")]
    pub width: u32,
    /// Canvas height in pixels.
    #[serde(default = "PlotStyle::default_height")]
    pub height: u32,
    /// Camera rotation around the vertical axis, radians.
    #[serde(default = "PlotStyle::default_yaw")]
    pub yaw: f64,
    /// Camera elevation, radians.
    #[serde(default = "PlotStyle::default_pitch")]
    pub pitch: f64,
    /// Zoom factor.
    #[serde(default = "PlotStyle::default_scale")]
    pub scale: f64,
}

impl PlotStyle {
    fn default_width() -> u32 {
        1024
    }
    fn default_height() -> u32 {
        768
    }
    fn default_yaw() -> f64 {
        0.5
    }
    fn default_pitch() -> f64 {
        0.3
    }
    fn default_scale() -> f64 {
        0.9
    }
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            width: Self::default_width(),
            height: Self::default_height(),
            yaw: Self::default_yaw(),
            pitch: Self::default_pitch(),
            scale: Self::default_scale(),
        }
    }
}

/// Pads a value range, widening degenerate ranges to a unit span.
fn padded_range(min: f64, max: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let padding = if span < 1e-9 { 0.5 } else { span * 0.05 };
    (min - padding, max + padding)
}

fn corner_extent(quads: &[Quad], pick: impl Fn(&(f64, f64, f64)) -> f64) -> (f64, f64) {
    quads
        .iter()
        .flat_map(|quad| quad.corners.iter())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), c| {
            (lo.min(pick(c)), hi.max(pick(c)))
        })
}

struct Quad {
    corners: [(f64, f64, f64); 4],
    height: f64,
}

/// Renders decision-space surfaces.
#[derive(Debug, Clone, Default)]
pub struct DsPlotter {
    style: PlotStyle,
}

impl DsPlotter {
    /// Plotter with the given style.
    pub fn new(style: PlotStyle) -> Self {
        Self { style }
    }

    /// Active style.
    pub fn style(&self) -> &PlotStyle {
        &self.style
    }

    /// Renders `field` over the meshgrid `(x_grid, y_grid)` as an SVG surface.
    ///
    /// Each 2x2 block of defined grid points becomes one filled quad colored
    /// by its mean height; defined points outside every block are drawn as
    /// flat tiles one cell wide. Returns the written path.
    pub fn plot_surface(
        &self,
        x_grid: &[Vec<f64>],
        y_grid: &[Vec<f64>],
        field: &Surface,
        colormap: Colormap,
        out: &Path,
        title: &str,
    ) -> Result<PathBuf, DsError> {
        check_shape("x_grid", x_grid, field)?;
        check_shape("y_grid", y_grid, field)?;

        let quads = collect_quads(x_grid, y_grid, field);
        if quads.is_empty() {
            return Err(DsError::Plot(
                ErrorInfo::new("plot-empty", "surface has no defined cells")
                    .with_context("path", out.display().to_string())
                    .with_context("defined", field.defined_cells().to_string()),
            ));
        }

        let (x_lo, x_hi) = corner_extent(&quads, |c| c.0);
        let (z_min, z_max) = corner_extent(&quads, |c| c.1);
        let (y_lo, y_hi) = corner_extent(&quads, |c| c.2);
        let (x_lo, x_hi) = padded_range(x_lo, x_hi);
        let (y_lo, y_hi) = padded_range(y_lo, y_hi);
        let (z_lo, z_hi) = padded_range(z_min, z_max);
        let z_span = if z_max > z_min { z_max - z_min } else { 1.0 };

        if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| draw_error(out, err))?;
        }

        let root = SVGBackend::new(out, (self.style.width, self.style.height)).into_drawing_area();
        root.fill(&WHITE).map_err(|err| draw_error(out, err))?;
        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 22))
            .margin(20)
            .build_cartesian_3d(x_lo..x_hi, z_lo..z_hi, y_lo..y_hi)
            .map_err(|err| draw_error(out, err))?;
        let (yaw, pitch, scale) = (self.style.yaw, self.style.pitch, self.style.scale);
        chart.with_projection(|mut pb| {
            pb.yaw = yaw;
            pb.pitch = pitch;
            pb.scale = scale;
            pb.into_matrix()
        });
        chart
            .configure_axes()
            .light_grid_style(BLACK.mix(0.15))
            .max_light_lines(3)
            .draw()
            .map_err(|err| draw_error(out, err))?;

        let quad_count = quads.len();
        chart
            .draw_series(quads.into_iter().map(|quad| {
                let color = colormap.color_at((quad.height - z_min) / z_span);
                Polygon::new(quad.corners.to_vec(), color.mix(0.9).filled())
            }))
            .map_err(|err| draw_error(out, err))?;
        root.present().map_err(|err| draw_error(out, err))?;

        info!(path = %out.display(), quads = quad_count, colormap = colormap.label(), "rendered surface");
        Ok(out.to_path_buf())
    }

    /// Renders a generated decision space.
    pub fn plot_decision_space(
        &self,
        ds: &DecisionSpace,
        colormap: Colormap,
        out: &Path,
        title: &str,
    ) -> Result<PathBuf, DsError> {
        self.plot_surface(&ds.x_grid(), &ds.y_grid(), &ds.field, colormap, out, title)
    }
}

fn check_shape(name: &str, grid: &[Vec<f64>], field: &Surface) -> Result<(), DsError> {
    let rows_ok = grid.len() == field.rows;
    let cols_ok = grid.iter().all(|row| row.len() == field.cols);
    if rows_ok && cols_ok {
        return Ok(());
    }
    Err(DsError::Plot(
        ErrorInfo::new("plot-shape", "grid and field shapes differ")
            .with_context("grid", name)
            .with_context("grid_rows", grid.len().to_string())
            .with_context("field", format!("{}x{}", field.rows, field.cols)),
    ))
}

fn collect_quads(x_grid: &[Vec<f64>], y_grid: &[Vec<f64>], field: &Surface) -> Vec<Quad> {
    let mut quads = Vec::new();
    let mut covered = vec![false; field.rows * field.cols];
    for row in 0..field.rows.saturating_sub(1) {
        for col in 0..field.cols.saturating_sub(1) {
            let cells = [(row, col), (row, col + 1), (row + 1, col + 1), (row + 1, col)];
            let heights: Option<Vec<f64>> =
                cells.iter().map(|&(r, c)| field.get(r, c)).collect();
            let Some(heights) = heights else {
                continue;
            };
            let mut corners = [(0.0, 0.0, 0.0); 4];
            for (slot, (&(r, c), &z)) in corners.iter_mut().zip(cells.iter().zip(&heights)) {
                *slot = (x_grid[r][c], z, y_grid[r][c]);
                covered[r * field.cols + c] = true;
            }
            quads.push(Quad {
                corners,
                height: heights.iter().sum::<f64>() / 4.0,
            });
        }
    }

    // Cells without a fully defined neighbourhood become flat tiles.
    for row in 0..field.rows {
        for col in 0..field.cols {
            let Some(z) = field.get(row, col) else {
                continue;
            };
            if covered[row * field.cols + col] {
                continue;
            }
            let (x, y) = (x_grid[row][col], y_grid[row][col]);
            let hx = half_spacing(&x_grid[row], col);
            let column: Vec<f64> = y_grid.iter().map(|r| r[col]).collect();
            let hy = half_spacing(&column, row);
            quads.push(Quad {
                corners: [
                    (x - hx, z, y - hy),
                    (x + hx, z, y - hy),
                    (x + hx, z, y + hy),
                    (x - hx, z, y + hy),
                ],
                height: z,
            });
        }
    }
    quads
}

/// Half the distance to the nearest neighbour along a grid line.
fn half_spacing(line: &[f64], idx: usize) -> f64 {
    let prev = idx.checked_sub(1).map(|i| (line[idx] - line[i]).abs());
    let next = line.get(idx + 1).map(|v| (v - line[idx]).abs());
    match (prev, next) {
        (Some(a), Some(b)) => a.min(b) / 2.0,
        (Some(d), None) | (None, Some(d)) => d / 2.0,
        (None, None) => 0.5,
    }
}
