//! Per-cell spectrum processing.
//!
//! A [`SpectrumProcessor`] turns a raw [`ScanResult`] into the processed
//! vector stored with the cell, and reduces that vector to the scalar drawn
//! in the image.

use spectroplot_core::ScanResult;

/// Preprocessing and aggregation of one cell's spectrum
pub trait SpectrumProcessor: Send {
    /// Derive the processed spectrum from a raw scan
    fn process(&self, raw: &ScanResult) -> Vec<f64>;

    /// Reduce a processed spectrum to the cell value.
    ///
    /// Defaults to the arithmetic mean of the finite values.
    fn aggregate(&self, processed: &[f64]) -> f64 {
        finite_mean(processed).unwrap_or(f64::NAN)
    }
}

/// Uses the intensity vector unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityProcessor;

impl SpectrumProcessor for IdentityProcessor {
    fn process(&self, raw: &ScanResult) -> Vec<f64> {
        raw.intensity.clone()
    }
}

/// Replaces NaN/inf runs in the intensity with the nearest finite neighbour.
///
/// A run between two finite values is split at its midpoint: the left half
/// takes the left neighbour, the right half (midpoint included) the right
/// one. Leading and trailing runs take the single neighbour they touch.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestFillProcessor;

impl SpectrumProcessor for NearestFillProcessor {
    fn process(&self, raw: &ScanResult) -> Vec<f64> {
        fill_invalid_nearest(&raw.intensity)
    }
}

/// Mean of the finite values, `None` if there are none
pub fn finite_mean(values: &[f64]) -> Option<f64> {
    let (sum, count) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (count > 0).then(|| sum / count as f64)
}

/// See [`NearestFillProcessor`]
pub fn fill_invalid_nearest(signal: &[f64]) -> Vec<f64> {
    let mut filled = signal.to_vec();
    let mut last_valid: Option<usize> = None;
    let mut i = 0;

    while i < signal.len() {
        if signal[i].is_finite() {
            last_valid = Some(i);
            i += 1;
            continue;
        }

        let run_start = i;
        while i < signal.len() && !signal[i].is_finite() {
            i += 1;
        }
        let next_valid = (i < signal.len()).then_some(i);

        match (last_valid, next_valid) {
            (Some(left), Some(right)) => {
                let mid = (left + right).div_ceil(2);
                for slot in &mut filled[run_start..mid] {
                    *slot = signal[left];
                }
                for slot in &mut filled[mid..right] {
                    *slot = signal[right];
                }
            }
            (None, Some(right)) => {
                for slot in &mut filled[run_start..right] {
                    *slot = signal[right];
                }
            }
            (Some(left), None) => {
                for slot in &mut filled[run_start..] {
                    *slot = signal[left];
                }
            }
            (None, None) => {}
        }
    }

    filled
}
