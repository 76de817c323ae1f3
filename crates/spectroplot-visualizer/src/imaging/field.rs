//! Scalar raster produced by rendering a scan image.

/// Row-major grid of normalized values in `[0, 1]`.
///
/// Row `iy` is the `iy`-th cell row away from the workspace origin, which is
/// also the `iy`-th row from the top of the rendered frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Field2D {
    width: usize,
    height: usize,
    data: Vec<f64>,
}

impl Field2D {
    /// All-zero field
    pub fn zeros(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width * height],
        }
    }

    /// Wrap row-major values. Returns `None` if the length does not match.
    pub fn from_vec(width: usize, height: usize, data: Vec<f64>) -> Option<Self> {
        (data.len() == width * height).then_some(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Value at a cell, `None` outside the grid
    pub fn get(&self, ix: usize, iy: usize) -> Option<f64> {
        (ix < self.width && iy < self.height).then(|| self.data[iy * self.width + ix])
    }

    pub(crate) fn set(&mut self, ix: usize, iy: usize, value: f64) {
        self.data[iy * self.width + ix] = value;
    }

    /// One row of values
    pub fn row(&self, iy: usize) -> &[f64] {
        &self.data[iy * self.width..(iy + 1) * self.width]
    }

    pub fn values(&self) -> &[f64] {
        &self.data
    }

    /// True when every value is zero
    pub fn is_blank(&self) -> bool {
        self.data.iter().all(|&v| v == 0.0)
    }
}
