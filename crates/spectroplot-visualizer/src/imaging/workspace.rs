//! Scan placement
//!
//! [`ScanWorkspace`] pairs the coordinate space with the scan image so a
//! pixel-size change replaces both together, and scans are placed through
//! the same grid they are stored in.

use super::processing::SpectrumProcessor;
use super::scan_image::ScanImage;
use crate::visualizer::viewport::{CanvasLayout, CoordinateSpace, PlotterMetadata, XyPair};
use spectroplot_core::{ImagingError, ScanResult};

/// Coordinate space and scan image for the current pixel size
#[derive(Debug)]
pub struct ScanWorkspace {
    max_workspace_mm: XyPair<f64>,
    layout: CanvasLayout,
    space: CoordinateSpace,
    image: ScanImage,
}

impl ScanWorkspace {
    /// Build the grid for `pixel_size_mm` inside the maximum workspace
    pub fn new(
        max_workspace_mm: XyPair<f64>,
        pixel_size_mm: XyPair<f64>,
        layout: CanvasLayout,
        processor: Box<dyn SpectrumProcessor>,
        percentiles: (f64, f64),
    ) -> Result<Self, ImagingError> {
        let space = CoordinateSpace::configure(max_workspace_mm, pixel_size_mm, &layout)?;
        let resolution = space.resolution();
        let image = ScanImage::with_processor(resolution.x, resolution.y, processor)
            .with_percentiles(percentiles.0, percentiles.1);
        Ok(Self {
            max_workspace_mm,
            layout,
            space,
            image,
        })
    }

    pub fn space(&self) -> &CoordinateSpace {
        &self.space
    }

    pub fn image(&self) -> &ScanImage {
        &self.image
    }

    pub fn max_workspace_mm(&self) -> XyPair<f64> {
        self.max_workspace_mm
    }

    pub fn metadata(&self) -> PlotterMetadata {
        self.space.metadata()
    }

    /// Switch to a new pixel size.
    ///
    /// The grid, transform and image are rebuilt and every stored scan is
    /// discarded. On error nothing changes.
    pub fn set_pixel_size(
        &mut self,
        pixel_size_mm: XyPair<f64>,
    ) -> Result<PlotterMetadata, ImagingError> {
        let space =
            CoordinateSpace::configure(self.max_workspace_mm, pixel_size_mm, &self.layout)?;
        let resolution = space.resolution();

        self.image.resize(resolution.x, resolution.y)?;
        self.space = space;

        tracing::info!(
            "Pixel size {}x{} mm: {}x{} cells over {}x{} mm",
            pixel_size_mm.x,
            pixel_size_mm.y,
            resolution.x,
            resolution.y,
            self.space.workspace_size_mm().x,
            self.space.workspace_size_mm().y
        );
        Ok(self.space.metadata())
    }

    /// Store a scan at the cell containing a workspace position and
    /// aggregate. Returns the cell.
    pub fn store_at_position(
        &mut self,
        wx: f64,
        wy: f64,
        raw: ScanResult,
    ) -> Result<(usize, usize), ImagingError> {
        let (ix, iy) = self.space.checked_cell(wx, wy)?;
        self.store_at_cell(ix as i64, iy as i64, raw)?;
        Ok((ix, iy))
    }

    /// Store a scan at an explicit cell and aggregate
    pub fn store_at_cell(
        &mut self,
        ix: i64,
        iy: i64,
        raw: ScanResult,
    ) -> Result<(), ImagingError> {
        self.image.set_pixel_data(ix, iy, raw)?;
        self.image.parse_all_pixels();
        Ok(())
    }
}
