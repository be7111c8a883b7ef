#![deny(missing_docs)]
#![doc = "Decision-space generation: bins trajectory samples on an (x, y) grid and averages a response per cell."]

/// Row-wise and cell-wise aggregation.
pub mod generator;
/// Grid specification, binning and meshes.
pub mod grid;
/// Summary statistics over surfaces.
pub mod stat;
/// Scalar fields over a grid.
pub mod surface;

pub use generator::{Aggregation, DecisionSpace, DecisionSpaceGenerator, FieldColumn};
pub use grid::{Axis, Binning, GridSpec, Mesh};
pub use stat::{SurfaceComparison, SurfaceSummary};
pub use surface::Surface;
