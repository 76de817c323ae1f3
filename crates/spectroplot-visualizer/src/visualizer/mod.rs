//! Coordinate spaces and frame rendering
//!
//! - [`viewport`]: workspace, cell grid and display transforms
//! - [`canvas_renderer`]: raster renderer and PNG encoding
//! - [`frame_generator`]: frame assembly with machine-state metadata

pub mod canvas_renderer;
pub mod frame_generator;
pub mod viewport;

pub use canvas_renderer::{EncodedImage, FrameRenderer, PngFrameRenderer};
pub use frame_generator::{FrameGenerator, RenderFrame};
pub use viewport::{
    CanvasLayout, CoordinateSpace, Margins, PlotterMetadata, RenderTransform, XyPair,
    CELL_EPSILON_MM, MAX_CELLS,
};
