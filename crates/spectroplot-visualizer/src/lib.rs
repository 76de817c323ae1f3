//! # SpectroPlot Visualizer
//!
//! Scan image model, coordinate transforms and frame rendering for
//! SpectroPlot. The [`ScanImage`] accumulates per-cell scans, the
//! [`CoordinateSpace`] maps between workspace, cells and display pixels, and
//! the [`FrameGenerator`] turns both into encoded frames with a cursor.

pub mod imaging;
pub mod visualizer;

pub use imaging::{
    fill_invalid_nearest, finite_mean, percentile, Cell, Field2D, IdentityProcessor,
    NearestFillProcessor, ScanImage, ScanWorkspace, SpectrumProcessor, DEFAULT_HIGH_PERCENTILE,
    DEFAULT_LOW_PERCENTILE,
};

pub use visualizer::{
    CanvasLayout, CoordinateSpace, EncodedImage, FrameGenerator, FrameRenderer, Margins,
    PlotterMetadata, PngFrameRenderer, RenderFrame, RenderTransform, XyPair, CELL_EPSILON_MM,
    MAX_CELLS,
};
