//! Error handling for SpectroPlot
//!
//! Provides error types for all layers of the service:
//! - Connection errors (serial link)
//! - Controller errors (motion commands)
//! - Protocol errors (status frames)
//! - Imaging errors (grid addressing and configuration)
//! - Device errors (spectrometer)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Connection error type
///
/// Represents errors related to the serial link to the plotter.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConnectionError {
    /// The link could not be opened. Fatal at startup.
    #[error("Link unavailable on {port}: {reason}")]
    LinkUnavailable {
        /// The port that failed to open.
        port: String,
        /// The reason the port failed to open.
        reason: String,
    },

    /// Port discovery found nothing that looks like a plotter.
    #[error("No plotter serial port found")]
    NoPortFound,

    /// The link was lost or has been closed.
    #[error("Link disconnected: {reason}")]
    Disconnected {
        /// The reason the link went away.
        reason: String,
    },

    /// I/O error on an open link
    #[error("I/O error: {reason}")]
    IoError {
        /// The reason for the I/O error.
        reason: String,
    },
}

/// Controller error type
///
/// Represents errors raised while building or issuing plotter commands.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ControllerError {
    /// Move kind is neither absolute nor incremental
    #[error("Unknown movement type: {kind}. Acceptable types: incremental, absolute")]
    UnknownMoveKind {
        /// The rejected move kind.
        kind: String,
    },

    /// Waiting for the machine to become idle timed out
    #[error("Controller operation timed out after {timeout_ms}ms")]
    Timeout {
        /// The timeout duration in milliseconds.
        timeout_ms: u64,
    },

    /// The operation was cancelled by the caller
    #[error("Controller operation cancelled")]
    Cancelled,

    /// The link is not connected
    #[error("Controller not connected")]
    NotConnected,

    /// Command rejected before it reached the link
    #[error("Invalid command: {reason}")]
    InvalidCommand {
        /// The reason the command was rejected.
        reason: String,
    },
}

/// Protocol error type
///
/// Status frames that cannot be parsed. Always recovered locally.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
    /// Malformed status frame
    #[error("Failed to parse status frame '{frame}': {reason}")]
    FrameParse {
        /// The offending frame.
        frame: String,
        /// The reason parsing failed.
        reason: String,
    },
}

/// Imaging error type
///
/// Errors raised by the coordinate space and the scanned image grid.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ImagingError {
    /// Cell index outside the grid
    #[error("Cell ({ix}, {iy}) outside {width}x{height} grid")]
    OutOfBounds {
        /// Requested column.
        ix: i64,
        /// Requested row.
        iy: i64,
        /// Grid width in cells.
        width: usize,
        /// Grid height in cells.
        height: usize,
    },

    /// Workspace, pixel size and resolution disagree
    #[error("Dimension mismatch: {reason}")]
    DimensionMismatch {
        /// Description of the mismatch.
        reason: String,
    },

    /// Scan result carries no usable measurement
    #[error("Scan result for cell ({ix}, {iy}) has no finite intensity values")]
    EmptyMeasurement {
        /// Target column.
        ix: usize,
        /// Target row.
        iy: usize,
    },

    /// Rendered frame could not be encoded
    #[error("Frame encoding failed: {reason}")]
    Encode {
        /// Encoder message.
        reason: String,
    },
}

/// Device error type
///
/// Errors reported by the spectrometer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeviceError {
    /// Scan did not complete
    #[error("Scan failed: {reason}")]
    ScanFailed {
        /// The reason the scan failed.
        reason: String,
    },

    /// Generic device error
    #[error("Device error: {message}")]
    Other {
        /// The error message.
        message: String,
    },
}

/// Main error type for SpectroPlot
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Connection error
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// Controller error
    #[error(transparent)]
    Controller(#[from] ControllerError),

    /// Protocol error
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Imaging error
    #[error(transparent)]
    Imaging(#[from] ImagingError),

    /// Device error
    #[error(transparent)]
    Device(#[from] DeviceError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Controller(ControllerError::Timeout { .. }))
    }

    /// Check if this is a connection error
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Error::Connection(_))
    }

    /// Check if this is an imaging error
    pub fn is_imaging_error(&self) -> bool {
        matches!(self, Error::Imaging(_))
    }

    /// Check if the error came from a cell outside the grid
    pub fn is_out_of_bounds(&self) -> bool {
        matches!(self, Error::Imaging(ImagingError::OutOfBounds { .. }))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
