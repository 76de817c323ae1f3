//! Scanned image model
//!
//! Each cell keeps the last raw scan stored at it, the processed spectrum,
//! the aggregated value and two flags: `scanned` (ever written) and `dirty`
//! (written since the last aggregation pass).

use super::field::Field2D;
use super::processing::{IdentityProcessor, SpectrumProcessor};
use spectroplot_core::{ImagingError, ScanResult};

/// Default lower clipping percentile
pub const DEFAULT_LOW_PERCENTILE: f64 = 2.0;
/// Default upper clipping percentile
pub const DEFAULT_HIGH_PERCENTILE: f64 = 98.0;

/// One grid cell
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cell {
    raw: Option<ScanResult>,
    processed: Option<Vec<f64>>,
    value: Option<f64>,
    scanned: bool,
    dirty: bool,
}

impl Cell {
    pub fn raw(&self) -> Option<&ScanResult> {
        self.raw.as_ref()
    }

    pub fn processed(&self) -> Option<&[f64]> {
        self.processed.as_deref()
    }

    /// Aggregated value, set by [`ScanImage::parse_all_pixels`]
    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn is_scanned(&self) -> bool {
        self.scanned
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

/// Grid of scan cells
pub struct ScanImage {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    processor: Box<dyn SpectrumProcessor>,
    low_percentile: f64,
    high_percentile: f64,
}

impl std::fmt::Debug for ScanImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("scanned", &self.scanned_count())
            .field("low_percentile", &self.low_percentile)
            .field("high_percentile", &self.high_percentile)
            .finish()
    }
}

impl ScanImage {
    /// Empty grid using the identity processor and 2/98 percentiles
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_processor(width, height, Box::new(IdentityProcessor))
    }

    /// Empty grid with a custom processor
    pub fn with_processor(
        width: usize,
        height: usize,
        processor: Box<dyn SpectrumProcessor>,
    ) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); width * height],
            processor,
            low_percentile: DEFAULT_LOW_PERCENTILE,
            high_percentile: DEFAULT_HIGH_PERCENTILE,
        }
    }

    /// Clear to an empty grid of a new size keeping the processor and
    /// percentiles.
    ///
    /// Every stored scan is discarded. An overflowing size leaves the image
    /// untouched.
    pub fn resize(&mut self, width: usize, height: usize) -> Result<(), ImagingError> {
        let count = width
            .checked_mul(height)
            .ok_or_else(|| ImagingError::DimensionMismatch {
                reason: format!("{}x{} cells overflow", width, height),
            })?;
        let cells = vec![Cell::default(); count];
        self.width = width;
        self.height = height;
        self.cells = cells;
        Ok(())
    }

    /// Percentiles used by [`render`](Self::render)
    pub fn with_percentiles(mut self, low: f64, high: f64) -> Self {
        self.low_percentile = low;
        self.high_percentile = high;
        self
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn percentiles(&self) -> (f64, f64) {
        (self.low_percentile, self.high_percentile)
    }

    /// Cell at an index, `None` outside the grid
    pub fn cell(&self, ix: usize, iy: usize) -> Option<&Cell> {
        (ix < self.width && iy < self.height).then(|| &self.cells[iy * self.width + ix])
    }

    /// Number of cells that hold a scan
    pub fn scanned_count(&self) -> usize {
        self.cells.iter().filter(|c| c.scanned).count()
    }

    /// Number of cells waiting for aggregation
    pub fn dirty_count(&self) -> usize {
        self.cells.iter().filter(|c| c.dirty).count()
    }

    fn index(&self, ix: i64, iy: i64) -> Result<usize, ImagingError> {
        let col = usize::try_from(ix).ok().filter(|&i| i < self.width);
        let row = usize::try_from(iy).ok().filter(|&i| i < self.height);
        match (col, row) {
            (Some(col), Some(row)) => Ok(row * self.width + col),
            _ => Err(ImagingError::OutOfBounds {
                ix,
                iy,
                width: self.width,
                height: self.height,
            }),
        }
    }

    /// Store a scan at a cell, replacing whatever was there.
    ///
    /// The cell becomes scanned and dirty. Out-of-range indices and scans
    /// without a finite processed value leave the grid untouched.
    pub fn set_pixel_data(
        &mut self,
        ix: i64,
        iy: i64,
        raw: ScanResult,
    ) -> Result<(), ImagingError> {
        let index = self.index(ix, iy)?;
        let processed = self.processor.process(&raw);
        if !processed.iter().any(|v| v.is_finite()) {
            return Err(ImagingError::EmptyMeasurement {
                ix: index % self.width,
                iy: index / self.width,
            });
        }

        let cell = &mut self.cells[index];
        cell.raw = Some(raw);
        cell.processed = Some(processed);
        cell.scanned = true;
        cell.dirty = true;
        Ok(())
    }

    /// Aggregate every dirty cell and clear its flag.
    ///
    /// Returns the number of cells updated; a second call with no new data
    /// returns 0 and changes nothing.
    pub fn parse_all_pixels(&mut self) -> usize {
        let mut updated = 0;
        for (index, cell) in self.cells.iter_mut().enumerate() {
            if !cell.dirty {
                continue;
            }
            if let Some(processed) = &cell.processed {
                let value = self.processor.aggregate(processed);
                tracing::trace!(
                    "Cell ({}, {}) = {}",
                    index % self.width,
                    index / self.width,
                    value
                );
                cell.value = Some(value);
            }
            cell.dirty = false;
            updated += 1;
        }
        updated
    }

    /// Render with the configured percentiles
    pub fn render(&self) -> Field2D {
        self.render_with(self.low_percentile, self.high_percentile)
    }

    /// Normalized field of aggregated values.
    ///
    /// Scanned values are clipped to their `[low, high]` percentiles,
    /// min-max normalized and inverted so the weakest signal maps to 1.
    /// Unscanned cells are 0. With nothing scanned, or when every clipped
    /// value is equal, the whole field is 0.
    pub fn render_with(&self, low: f64, high: f64) -> Field2D {
        let mut field = Field2D::zeros(self.width, self.height);

        let scanned: Vec<(usize, f64)> = self
            .cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.scanned)
            .filter_map(|(i, c)| c.value.filter(|v| v.is_finite()).map(|v| (i, v)))
            .collect();
        if scanned.is_empty() {
            return field;
        }

        let mut sorted: Vec<f64> = scanned.iter().map(|&(_, v)| v).collect();
        sorted.sort_by(f64::total_cmp);
        let low_edge = percentile(&sorted, low);
        let high_edge = percentile(&sorted, high);

        let clip = |v: f64| v.max(low_edge).min(high_edge);
        let min = clip(sorted[0]);
        let max = clip(sorted[sorted.len() - 1]);
        if min == max {
            return field;
        }

        for (index, value) in scanned {
            let normalized = (clip(value) - min) / (max - min);
            field.set(index % self.width, index / self.width, 1.0 - normalized);
        }
        field
    }
}

/// Percentile of sorted data with linear interpolation between ranks
pub fn percentile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let rank = (q.clamp(0.0, 100.0) / 100.0) * (n - 1) as f64;
            let lower = rank.floor() as usize;
            let upper = rank.ceil() as usize;
            let frac = rank - lower as f64;
            sorted[lower] + (sorted[upper] - sorted[lower]) * frac
        }
    }
}
