//! # SpectroPlot
//!
//! Drives a GRBL-style XY plotter over a serial link and builds a raster
//! image from point scans taken by a spectrometer on the plotter head.
//!
//! ## Architecture
//!
//! SpectroPlot is organized as a workspace with multiple crates:
//!
//! 1. **spectroplot-core** - Errors, machine state, scan results, device traits
//! 2. **spectroplot-communication** - Serial link, status monitor, plotter control
//! 3. **spectroplot-visualizer** - Coordinate space, scan image, frame rendering
//! 4. **spectroplot-settings** - Configuration files and validation
//! 5. **spectroplot** - [`PlotterService`] and the binary
//!
//! The service holds three locks, always taken in this order when nested:
//! render lock, imaging lock, link lock.

pub mod device;
pub mod service;

pub use device::DetachedSpectrometer;
pub use service::{connection_params, PlotterService, ScanOutcome};

pub use spectroplot_communication::{
    list_ports, CommandCreator, ConnectionParams, Link, LinkMonitor, PlotterController,
    PlotterControllerConfig, SerialPort, SerialPortInfo,
};

pub use spectroplot_core::{
    Axis, ConnectionError, ControllerError, DeviceError, Error, ImagingError, MachineState,
    MachineStateSnapshot, MoveKind, PartialPosition, Position3, Result, ScanResult, Spectrometer,
};

pub use spectroplot_settings::{default_config_path, Config, SettingsError};

pub use spectroplot_visualizer::{
    CoordinateSpace, FrameGenerator, PlotterMetadata, RenderFrame, ScanImage, ScanWorkspace,
    SpectrumProcessor, XyPair,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support
/// - Thread names, so `link-monitor` lines stand out
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(tracing::Level::INFO.to_string()));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
