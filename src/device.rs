//! Placeholder spectrometer
//!
//! Used when the binary runs without a spectrometer driver: plotter control
//! and rendering work, scans fail with a device error.

use spectroplot_core::{DeviceError, Result, ScanResult, Spectrometer};

/// Spectrometer stand-in that rejects scans
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedSpectrometer;

impl Spectrometer for DetachedSpectrometer {
    fn scan(&mut self, _num_repeats: u32, _pga_gain: Option<u8>) -> Result<ScanResult> {
        Err(DeviceError::ScanFailed {
            reason: "no spectrometer attached".to_string(),
        }
        .into())
    }

    fn set_lamp(&mut self, on: bool) -> Result<()> {
        tracing::debug!("Lamp {} ignored: no spectrometer attached", on);
        Ok(())
    }

    fn clear_error(&mut self) -> Result<()> {
        Ok(())
    }
}
