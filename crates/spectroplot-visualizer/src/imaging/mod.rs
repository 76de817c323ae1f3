//! Scan image model
//!
//! - [`scan_image`]: the cell grid and its normalized rendering
//! - [`processing`]: spectrum preprocessing and aggregation hooks
//! - [`field`]: the rendered scalar raster
//! - [`workspace`]: coordinate space and image kept in step

pub mod field;
pub mod processing;
pub mod scan_image;
pub mod workspace;

pub use field::Field2D;
pub use processing::{
    fill_invalid_nearest, finite_mean, IdentityProcessor, NearestFillProcessor, SpectrumProcessor,
};
pub use scan_image::{percentile, Cell, ScanImage, DEFAULT_HIGH_PERCENTILE, DEFAULT_LOW_PERCENTILE};
pub use workspace::ScanWorkspace;
