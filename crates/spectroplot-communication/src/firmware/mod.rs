//! Firmware protocol support
//!
//! The plotter runs a GRBL-compatible controller; see [`grbl`].

pub mod grbl;
