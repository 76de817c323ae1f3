//! # SpectroPlot Core
//!
//! Core types, traits, and utilities for SpectroPlot.
//! Provides the shared machine state model, the error taxonomy used by
//! every layer, and the device traits the service talks to.

pub mod data;
pub mod device;
pub mod error;
pub mod types;

pub use data::{
    snap_near_zero, Axis, MachineState, MachineStateSnapshot, MoveKind, PartialPosition,
    Position3, ScanResult, NEAR_ZERO_TOLERANCE, STATUS_DISCONNECTED, STATUS_IDLE,
};

pub use device::Spectrometer;

pub use error::{
    ConnectionError, ControllerError, DeviceError, Error, ImagingError, ProtocolError, Result,
};

pub use types::{cancel_flag, thread_safe, CancelFlag, ThreadSafe};
