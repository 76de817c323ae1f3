//! Coordinate spaces shared by scan placement and rendering.
//!
//! Three spaces are involved:
//! - workspace millimetres, origin at the plotter's work origin;
//! - the cell grid of the scanned image, `(ix, iy)` with `iy` growing away
//!   from the origin;
//! - display pixels of the rendered canvas, origin top-left.
//!
//! The canvas places the workspace inside a margin box, with workspace
//! `(0, 0)` drawn at the top-left corner of that box.

use serde::{Deserialize, Serialize};
use spectroplot_core::ImagingError;

/// Slack added before flooring a workspace coordinate into a cell, capped
/// at a quarter pixel so cell centres always land in their own cell.
pub const CELL_EPSILON_MM: f64 = 0.1;

/// Largest grid [`CoordinateSpace::configure`] will build
pub const MAX_CELLS: usize = 16 * 1024 * 1024;

/// A value per planar axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct XyPair<T> {
    pub x: T,
    pub y: T,
}

impl<T> XyPair<T> {
    pub fn new(x: T, y: T) -> Self {
        Self { x, y }
    }
}

/// Fractions of the canvas occupied by the plot box.
///
/// `bottom` and `top` are measured from the bottom edge of the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
    pub top: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            left: 0.04,
            right: 0.93,
            bottom: 0.04,
            top: 0.93,
        }
    }
}

impl Margins {
    /// Whether the margins describe a non-empty box inside the canvas
    pub fn is_valid(&self) -> bool {
        let in_unit = |v: f64| v.is_finite() && (0.0..=1.0).contains(&v);
        in_unit(self.left)
            && in_unit(self.right)
            && in_unit(self.bottom)
            && in_unit(self.top)
            && self.left < self.right
            && self.bottom < self.top
    }
}

/// Canvas geometry: fixed width, height following the workspace aspect
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasLayout {
    pub width_px: u32,
    pub margins: Margins,
}

impl Default for CanvasLayout {
    fn default() -> Self {
        Self {
            width_px: 1000,
            margins: Margins::default(),
        }
    }
}

/// Affine map between workspace millimetres and canvas pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderTransform {
    canvas_width: u32,
    canvas_height: u32,
    box_left: f64,
    box_right: f64,
    box_bottom: f64,
    box_top: f64,
    workspace: XyPair<f64>,
}

impl RenderTransform {
    /// Lay out a canvas for a workspace
    pub fn new(workspace: XyPair<f64>, layout: &CanvasLayout) -> Result<Self, ImagingError> {
        if !(workspace.x > 0.0 && workspace.y > 0.0) {
            return Err(ImagingError::DimensionMismatch {
                reason: format!(
                    "workspace {}x{} mm is not positive",
                    workspace.x, workspace.y
                ),
            });
        }
        if layout.width_px == 0 || !layout.margins.is_valid() {
            return Err(ImagingError::DimensionMismatch {
                reason: "canvas layout does not form a positive plot box".to_string(),
            });
        }

        let width = f64::from(layout.width_px);
        let height = width * workspace.y / workspace.x;
        let m = layout.margins;
        Ok(Self {
            canvas_width: layout.width_px,
            canvas_height: (height as u32).max(1),
            box_left: m.left * width,
            box_right: m.right * width,
            box_bottom: m.bottom * height,
            box_top: m.top * height,
            workspace,
        })
    }

    /// Canvas size in pixels
    pub fn canvas_size(&self) -> (u32, u32) {
        (self.canvas_width, self.canvas_height)
    }

    /// Plot box in display pixels: `(left, top, right, bottom)`
    pub fn plot_box(&self) -> (f64, f64, f64, f64) {
        let h = f64::from(self.canvas_height);
        (
            self.box_left,
            h - self.box_top,
            self.box_right,
            h - self.box_bottom,
        )
    }

    /// Workspace millimetres to display pixels
    pub fn workspace_to_display(&self, wx: f64, wy: f64) -> (f64, f64) {
        let dx = self.box_left + wx / self.workspace.x * (self.box_right - self.box_left);
        // y axis is inverted: workspace 0 sits at the top of the box
        let ty = self.box_top - wy / self.workspace.y * (self.box_top - self.box_bottom);
        (dx, f64::from(self.canvas_height) - ty)
    }

    /// Display pixels to workspace millimetres
    pub fn display_to_workspace(&self, dx: f64, dy: f64) -> (f64, f64) {
        let ty = f64::from(self.canvas_height) - dy;
        let wx = (dx - self.box_left) / (self.box_right - self.box_left) * self.workspace.x;
        let wy = (self.box_top - ty) / (self.box_top - self.box_bottom) * self.workspace.y;
        (wx, wy)
    }
}

/// Layout and scale information handed to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotterMetadata {
    pub workspace_size_mm: XyPair<f64>,
    pub pixel_size_mm: XyPair<f64>,
    pub output_resolution: XyPair<usize>,
    /// Display position of the workspace origin
    pub original_point_coordinates: XyPair<f64>,
    /// Display pixels per millimetre
    pub xy_factors: XyPair<f64>,
}

/// Workspace, pixel grid and render transform for one pixel size
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateSpace {
    workspace_size_mm: XyPair<f64>,
    pixel_size_mm: XyPair<f64>,
    resolution: XyPair<usize>,
    transform: RenderTransform,
}

impl CoordinateSpace {
    /// Derive the grid from the largest usable workspace and a pixel size.
    ///
    /// `resolution = floor(max / pixel)` per axis and the workspace shrinks to
    /// `pixel * resolution` so it is covered by whole cells.
    pub fn configure(
        max_workspace_mm: XyPair<f64>,
        pixel_size_mm: XyPair<f64>,
        layout: &CanvasLayout,
    ) -> Result<Self, ImagingError> {
        check_positive("pixel size", pixel_size_mm)?;
        check_positive("maximum workspace", max_workspace_mm)?;

        let cells_x = (max_workspace_mm.x / pixel_size_mm.x).floor();
        let cells_y = (max_workspace_mm.y / pixel_size_mm.y).floor();
        let limit = MAX_CELLS as f64;
        if cells_x > limit || cells_y > limit {
            return Err(too_many_cells(pixel_size_mm));
        }
        let resolution = XyPair::new(cells_x as usize, cells_y as usize);
        match resolution.x.checked_mul(resolution.y) {
            Some(count) if count <= MAX_CELLS => {}
            _ => return Err(too_many_cells(pixel_size_mm)),
        }
        if resolution.x == 0 || resolution.y == 0 {
            return Err(ImagingError::DimensionMismatch {
                reason: format!(
                    "pixel size {}x{} mm exceeds workspace {}x{} mm",
                    pixel_size_mm.x, pixel_size_mm.y, max_workspace_mm.x, max_workspace_mm.y
                ),
            });
        }

        let workspace = XyPair::new(
            pixel_size_mm.x * resolution.x as f64,
            pixel_size_mm.y * resolution.y as f64,
        );
        Self::from_parts(workspace, pixel_size_mm, resolution, layout)
    }

    /// Build from explicit parts, checking `pixel * resolution == workspace`
    pub fn from_parts(
        workspace_size_mm: XyPair<f64>,
        pixel_size_mm: XyPair<f64>,
        resolution: XyPair<usize>,
        layout: &CanvasLayout,
    ) -> Result<Self, ImagingError> {
        check_positive("pixel size", pixel_size_mm)?;
        check_positive("workspace", workspace_size_mm)?;

        let matches_x = is_close(pixel_size_mm.x * resolution.x as f64, workspace_size_mm.x);
        let matches_y = is_close(pixel_size_mm.y * resolution.y as f64, workspace_size_mm.y);
        if resolution.x == 0 || resolution.y == 0 || !matches_x || !matches_y {
            return Err(ImagingError::DimensionMismatch {
                reason: format!(
                    "{}x{} cells of {}x{} mm do not cover {}x{} mm",
                    resolution.x,
                    resolution.y,
                    pixel_size_mm.x,
                    pixel_size_mm.y,
                    workspace_size_mm.x,
                    workspace_size_mm.y
                ),
            });
        }

        Ok(Self {
            workspace_size_mm,
            pixel_size_mm,
            resolution,
            transform: RenderTransform::new(workspace_size_mm, layout)?,
        })
    }

    pub fn workspace_size_mm(&self) -> XyPair<f64> {
        self.workspace_size_mm
    }

    pub fn pixel_size_mm(&self) -> XyPair<f64> {
        self.pixel_size_mm
    }

    pub fn resolution(&self) -> XyPair<usize> {
        self.resolution
    }

    pub fn transform(&self) -> &RenderTransform {
        &self.transform
    }

    /// Cell containing a workspace point. Not bounds-checked.
    pub fn workspace_to_cell(&self, wx: f64, wy: f64) -> (i64, i64) {
        let eps_x = CELL_EPSILON_MM.min(self.pixel_size_mm.x / 4.0);
        let eps_y = CELL_EPSILON_MM.min(self.pixel_size_mm.y / 4.0);
        (
            ((wx + eps_x) / self.pixel_size_mm.x).floor() as i64,
            ((wy + eps_y) / self.pixel_size_mm.y).floor() as i64,
        )
    }

    /// Cell containing a workspace point, or `OutOfBounds`
    pub fn checked_cell(&self, wx: f64, wy: f64) -> Result<(usize, usize), ImagingError> {
        let (ix, iy) = self.workspace_to_cell(wx, wy);
        self.check_cell(ix, iy)
    }

    /// Validate a signed cell index against the grid
    pub fn check_cell(&self, ix: i64, iy: i64) -> Result<(usize, usize), ImagingError> {
        let in_range =
            |i: i64, n: usize| usize::try_from(i).ok().filter(|&i| i < n);
        match (in_range(ix, self.resolution.x), in_range(iy, self.resolution.y)) {
            (Some(x), Some(y)) => Ok((x, y)),
            _ => Err(ImagingError::OutOfBounds {
                ix,
                iy,
                width: self.resolution.x,
                height: self.resolution.y,
            }),
        }
    }

    /// Workspace position of a cell centre
    pub fn cell_to_workspace(&self, ix: i64, iy: i64) -> (f64, f64) {
        (
            (ix as f64 + 0.5) * self.pixel_size_mm.x,
            (iy as f64 + 0.5) * self.pixel_size_mm.y,
        )
    }

    pub fn workspace_to_display(&self, wx: f64, wy: f64) -> (f64, f64) {
        self.transform.workspace_to_display(wx, wy)
    }

    pub fn display_to_workspace(&self, dx: f64, dy: f64) -> (f64, f64) {
        self.transform.display_to_workspace(dx, dy)
    }

    /// Cell under a display position (e.g. a cursor)
    pub fn display_to_cell(&self, dx: f64, dy: f64) -> (i64, i64) {
        let (wx, wy) = self.display_to_workspace(dx, dy);
        self.workspace_to_cell(wx, wy)
    }

    /// Display position of a cell centre
    pub fn cell_to_display(&self, ix: i64, iy: i64) -> (f64, f64) {
        let (wx, wy) = self.cell_to_workspace(ix, iy);
        self.workspace_to_display(wx, wy)
    }

    /// Layout summary for clients
    pub fn metadata(&self) -> PlotterMetadata {
        let origin = self.workspace_to_display(0.0, 0.0);
        let far = self.workspace_to_display(self.workspace_size_mm.x, self.workspace_size_mm.y);
        PlotterMetadata {
            workspace_size_mm: self.workspace_size_mm,
            pixel_size_mm: self.pixel_size_mm,
            output_resolution: self.resolution,
            original_point_coordinates: XyPair::new(origin.0, origin.1),
            xy_factors: XyPair::new(
                (far.0 - origin.0).abs() / self.workspace_size_mm.x,
                (far.1 - origin.1).abs() / self.workspace_size_mm.y,
            ),
        }
    }
}

fn too_many_cells(pixel_size_mm: XyPair<f64>) -> ImagingError {
    ImagingError::DimensionMismatch {
        reason: format!(
            "pixel size {}x{} mm needs more than {} cells",
            pixel_size_mm.x, pixel_size_mm.y, MAX_CELLS
        ),
    }
}

fn check_positive(what: &str, size: XyPair<f64>) -> Result<(), ImagingError> {
    if size.x.is_finite() && size.y.is_finite() && size.x > 0.0 && size.y > 0.0 {
        Ok(())
    } else {
        Err(ImagingError::DimensionMismatch {
            reason: format!("{} {}x{} mm is not positive", what, size.x, size.y),
        })
    }
}

/// `|a - b| <= atol + rtol * |b|` with rtol 1e-5, atol 1e-8
fn is_close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-8 + 1e-5 * b.abs()
}
