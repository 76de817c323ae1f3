//! Device traits
//!
//! The spectrometer driver lives outside this workspace; the service only
//! needs the operations below.

use crate::data::ScanResult;
use crate::error::Result;

/// Point spectrometer mounted on the plotter head
pub trait Spectrometer: Send {
    /// Take `num_repeats` averaged scans, optionally setting the PGA gain first.
    fn scan(&mut self, num_repeats: u32, pga_gain: Option<u8>) -> Result<ScanResult>;

    /// Keep the lamp on between scans, or let the driver switch it off.
    fn set_lamp(&mut self, on: bool) -> Result<()>;

    /// Clear a latched device error.
    fn clear_error(&mut self) -> Result<()>;
}
