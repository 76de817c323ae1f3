//! Communication layer
//!
//! - [`serial`]: port discovery and the low-level port trait
//! - [`telemetry`]: bounded buffer of raw device lines
//! - [`link`]: the link lock guarding port, machine state and telemetry
//! - [`monitor`]: background status polling thread

pub mod link;
pub mod monitor;
pub mod serial;
pub mod telemetry;

use serde::{Deserialize, Serialize};

/// Port name that asks discovery to pick the plotter port.
pub const AUTO_PORT: &str = "Auto";

/// Serial parity setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SerialParity {
    /// No parity bit
    #[default]
    None,
    /// Even parity
    Even,
    /// Odd parity
    Odd,
}

/// Parameters used to open the plotter link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionParams {
    /// Port name, or [`AUTO_PORT`]
    pub port: String,
    /// Baud rate
    pub baud_rate: u32,
    /// Read timeout in milliseconds; a read with no data returns after this
    pub timeout_ms: u64,
    /// Data bits (5-8)
    pub data_bits: u8,
    /// Stop bits (1 or 2)
    pub stop_bits: u8,
    /// Parity
    pub parity: SerialParity,
    /// Hardware flow control
    pub flow_control: bool,
}

impl Default for ConnectionParams {
    fn default() -> Self {
        Self {
            port: AUTO_PORT.to_string(),
            baud_rate: 115200,
            timeout_ms: 10,
            data_bits: 8,
            stop_bits: 1,
            parity: SerialParity::None,
            flow_control: false,
        }
    }
}

impl ConnectionParams {
    /// Parameters for a named port with default framing
    pub fn for_port(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            ..Default::default()
        }
    }

    /// Whether the port should be discovered
    pub fn is_auto(&self) -> bool {
        self.port.eq_ignore_ascii_case(AUTO_PORT)
    }
}
