//! # SpectroPlot Communication
//!
//! Serial link handling and GRBL-style plotter control for SpectroPlot.
//! A background [`LinkMonitor`] polls the plotter status over the shared
//! [`Link`], while the [`PlotterController`] issues motion and control
//! commands through the same link lock.

pub mod communication;
pub mod firmware;

pub use communication::{
    link::{Link, LinkInner, PollOutcome},
    monitor::LinkMonitor,
    serial::{list_ports, open_port, RealSerialPort, SerialPort, SerialPortInfo},
    telemetry::TelemetryBuffer,
    ConnectionParams, SerialParity, AUTO_PORT,
};

pub use firmware::grbl::{
    command_creator::CommandCreator,
    controller::{PlotterController, PlotterControllerConfig},
    status_parser::{StatusFrame, StatusParser},
    utils::{classify_line, LineKind},
};
