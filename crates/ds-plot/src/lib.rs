#![deny(missing_docs)]
#![doc = "Renders decision-space surfaces as 3D SVG plots."]

/// Named colormaps.
pub mod colormap;
/// Surface plotter.
pub mod surface;

pub use colormap::Colormap;
pub use surface::{DsPlotter, PlotStyle};
