//! Data models for positions, machine state, and scan results
//!
//! This module provides:
//! - Three-axis positions in workspace millimeters
//! - Partial position updates for selective axis changes
//! - The shared machine state record and its snapshot form
//! - Move kinds for motion commands
//! - Raw spectrometer scan results

use crate::error::ControllerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Components in `[-NEAR_ZERO_TOLERANCE, 0]` are reported as exactly zero.
pub const NEAR_ZERO_TOLERANCE: f64 = 0.01;

/// Status token reported by the device when it can accept relative moves.
pub const STATUS_IDLE: &str = "Idle";

/// Status token set locally once the link has been lost.
pub const STATUS_DISCONNECTED: &str = "Disconnected";

/// Snap small negative device noise to zero.
///
/// Only values in `-0.01..=0.0` are affected; `-0.02` and `0.005` pass through.
#[inline]
pub fn snap_near_zero(value: f64) -> f64 {
    if (-NEAR_ZERO_TOLERANCE..=0.0).contains(&value) {
        0.0
    } else {
        value
    }
}

/// Plotter axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// X axis
    X,
    /// Y axis
    Y,
    /// Z axis
    Z,
}

impl Axis {
    /// All axes in reporting order
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// G-code word letter for this axis
    pub fn letter(self) -> char {
        match self {
            Axis::X => 'X',
            Axis::Y => 'Y',
            Axis::Z => 'Z',
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Three-axis position in workspace millimeters
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position3 {
    /// X-axis position
    pub x: f64,
    /// Y-axis position
    pub y: f64,
    /// Z-axis position
    pub z: f64,
}

impl Position3 {
    /// Create a position from its components
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Copy with near-zero negative components snapped to zero
    pub fn snapped(self) -> Self {
        Self::new(
            snap_near_zero(self.x),
            snap_near_zero(self.y),
            snap_near_zero(self.z),
        )
    }

    /// Read one axis
    pub fn get(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Write one axis
    pub fn set(&mut self, axis: Axis, value: f64) {
        match axis {
            Axis::X => self.x = value,
            Axis::Y => self.y = value,
            Axis::Z => self.z = value,
        }
    }
}

impl fmt::Display for Position3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "X:{:.3} Y:{:.3} Z:{:.3}", self.x, self.y, self.z)
    }
}

/// Partial position for selective axis updates
///
/// Used by motion commands where only some axes are given.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PartialPosition {
    /// X-axis position (if Some, move this axis)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    /// Y-axis position (if Some, move this axis)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    /// Z-axis position (if Some, move this axis)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
}

impl PartialPosition {
    /// Create a new empty partial position (all axes None)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a partial position with only X axis set
    pub fn x_only(x: f64) -> Self {
        Self {
            x: Some(x),
            ..Default::default()
        }
    }

    /// Create a partial position with only Y axis set
    pub fn y_only(y: f64) -> Self {
        Self {
            y: Some(y),
            ..Default::default()
        }
    }

    /// Create a partial position with XY axes set
    pub fn xy(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Default::default()
        }
    }

    /// Create a partial position with XYZ axes set
    pub fn xyz(x: f64, y: f64, z: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            z: Some(z),
        }
    }

    /// Value for one axis, if given
    pub fn get(&self, axis: Axis) -> Option<f64> {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Provided axes in X, Y, Z order
    pub fn axes(&self) -> impl Iterator<Item = (Axis, f64)> + '_ {
        Axis::ALL
            .into_iter()
            .filter_map(move |axis| self.get(axis).map(|v| (axis, v)))
    }

    /// True when no axis is given
    pub fn is_empty(&self) -> bool {
        self.x.is_none() && self.y.is_none() && self.z.is_none()
    }
}

/// Coordinate mode of a motion command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveKind {
    /// Absolute coordinates (G90)
    Absolute,
    /// Relative coordinates (G91), issued only once the machine is idle
    Incremental,
}

impl FromStr for MoveKind {
    type Err = ControllerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "absolute" => Ok(MoveKind::Absolute),
            "incremental" => Ok(MoveKind::Incremental),
            _ => Err(ControllerError::UnknownMoveKind {
                kind: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for MoveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveKind::Absolute => write!(f, "absolute"),
            MoveKind::Incremental => write!(f, "incremental"),
        }
    }
}

/// Live machine state shared between the link monitor and the controller
///
/// `status` and `position` come from status frames; `targeting` is the last
/// commanded destination and is only a local prediction. Positions are
/// snapped on every write.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MachineState {
    status: String,
    position: Position3,
    targeting: Position3,
}

impl MachineState {
    /// Create an empty state (no status yet, all axes at zero)
    pub fn new() -> Self {
        Self::default()
    }

    /// Last status token, empty until the first frame arrives
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Last reported machine position
    pub fn position(&self) -> Position3 {
        self.position
    }

    /// Last commanded destination
    pub fn targeting(&self) -> Position3 {
        self.targeting
    }

    /// Replace the status token
    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    /// Replace the reported position
    pub fn set_position(&mut self, position: Position3) {
        self.position = position.snapped();
    }

    /// Record the commanded destination for one axis
    pub fn set_target_axis(&mut self, axis: Axis, value: f64) {
        self.targeting.set(axis, snap_near_zero(value));
    }

    /// Whether the device reported `Idle` (case-insensitive)
    pub fn is_idle(&self) -> bool {
        self.status.eq_ignore_ascii_case(STATUS_IDLE)
    }

    /// Whether the link has been lost
    pub fn is_disconnected(&self) -> bool {
        self.status == STATUS_DISCONNECTED
    }

    /// Copy of the state for readers outside the link lock
    pub fn snapshot(&self) -> MachineStateSnapshot {
        MachineStateSnapshot {
            state: self.status.clone(),
            position: self.position,
            targeting: self.targeting,
        }
    }
}

/// Serializable copy of [`MachineState`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MachineStateSnapshot {
    /// Status token
    pub state: String,
    /// Reported position
    pub position: Position3,
    /// Commanded destination
    pub targeting: Position3,
}

/// Raw spectrometer scan result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    /// Measured intensity per wavelength bin
    pub intensity: Vec<f64>,
    /// Reference spectrum captured with the scan
    #[serde(default)]
    pub reference: Vec<f64>,
}

impl ScanResult {
    /// Create a scan result from its spectra
    pub fn new(intensity: Vec<f64>, reference: Vec<f64>) -> Self {
        Self {
            intensity,
            reference,
        }
    }

    /// Whether at least one intensity value is finite
    pub fn has_measurement(&self) -> bool {
        self.intensity.iter().any(|v| v.is_finite())
    }
}
