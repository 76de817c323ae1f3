//! The link lock
//!
//! [`Link`] guards the serial port, the [`MachineState`] and the
//! [`TelemetryBuffer`] behind one mutex. Status polls, command writes,
//! state snapshots and telemetry drains all go through it, so a query and
//! its response never interleave with a command from another thread.

use crate::communication::serial::SerialPort;
use crate::communication::telemetry::TelemetryBuffer;
use crate::firmware::grbl::command_creator::CommandCreator;
use crate::firmware::grbl::status_parser::StatusParser;
use crate::firmware::grbl::utils::{classify_line, get_state_name, is_error_state, LineKind};
use parking_lot::{Mutex, MutexGuard};
use spectroplot_core::{
    ConnectionError, Error, MachineState, MachineStateSnapshot, Result, STATUS_DISCONNECTED,
};
use std::io;

/// Read chunk size for the inner drain
const READ_CHUNK: usize = 256;

/// Upper bound on bytes consumed by a single drain so a chatty device
/// cannot keep the link lock forever
const MAX_DRAIN_BYTES: usize = 64 * 1024;

/// Longest partial line held while waiting for its newline. Past this the
/// bytes are flushed to telemetry as one line.
const MAX_LINE_BYTES: usize = 4096;

/// Result of one poll cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollOutcome {
    /// Status frames applied to the machine state
    pub frames: usize,
    /// Raw lines pushed to telemetry
    pub telemetry_lines: usize,
    /// Malformed status frames that were dropped
    pub dropped: usize,
}

/// State guarded by the link lock
pub struct LinkInner {
    port: Option<Box<dyn SerialPort>>,
    port_name: String,
    state: MachineState,
    telemetry: TelemetryBuffer,
    pending: Vec<u8>,
}

impl LinkInner {
    /// Current machine state
    pub fn state(&self) -> &MachineState {
        &self.state
    }

    /// Mutable machine state, used by the controller to record targets
    pub fn state_mut(&mut self) -> &mut MachineState {
        &mut self.state
    }

    /// Whether the port is still open
    pub fn is_connected(&self) -> bool {
        self.port.is_some()
    }

    /// Name of the underlying port
    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    /// Buffered telemetry
    pub fn telemetry(&self) -> &TelemetryBuffer {
        &self.telemetry
    }

    /// Write raw bytes to the device.
    ///
    /// A write failure marks the link disconnected.
    pub fn write_line(&mut self, data: &[u8]) -> Result<()> {
        let Some(port) = self.port.as_mut() else {
            return Err(ConnectionError::Disconnected {
                reason: "link closed".to_string(),
            }
            .into());
        };

        match port.write(data) {
            Ok(_) => {
                tracing::trace!("-> {:?}", String::from_utf8_lossy(data));
                Ok(())
            }
            Err(e) => Err(self.mark_disconnected(&e)),
        }
    }

    /// One monitor cycle: send the status query, then drain input
    pub fn poll(&mut self) -> Result<PollOutcome> {
        self.write_line(CommandCreator::status_query())?;
        self.drain_input()
    }

    /// Read every immediately available line and dispatch it
    pub fn drain_input(&mut self) -> Result<PollOutcome> {
        let mut outcome = PollOutcome::default();
        let mut buf = [0u8; READ_CHUNK];
        let mut consumed = 0usize;

        while consumed < MAX_DRAIN_BYTES {
            let Some(port) = self.port.as_mut() else {
                break;
            };
            match port.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    consumed += n;
                    self.pending.extend_from_slice(&buf[..n]);
                    self.dispatch_complete_lines(&mut outcome);
                }
                Err(e)
                    if matches!(
                        e.kind(),
                        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
                    ) =>
                {
                    break
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(self.mark_disconnected(&e)),
            }
        }

        Ok(outcome)
    }

    fn dispatch_complete_lines(&mut self, outcome: &mut PollOutcome) {
        while let Some(end) = self.pending.iter().position(|&b| b == b'\n') {
            let bytes: Vec<u8> = self.pending.drain(..=end).collect();
            self.handle_line(&String::from_utf8_lossy(&bytes), outcome);
        }

        if self.pending.len() > MAX_LINE_BYTES {
            let bytes = std::mem::take(&mut self.pending);
            tracing::warn!(
                "No line ending after {} bytes from {}; flushing to telemetry",
                bytes.len(),
                self.port_name
            );
            self.telemetry
                .push(String::from_utf8_lossy(&bytes).trim_end_matches('\r'));
            outcome.telemetry_lines += 1;
        }
    }

    fn handle_line(&mut self, raw: &str, outcome: &mut PollOutcome) {
        let line = raw.trim_end_matches(['\r', '\n']);
        match classify_line(line) {
            LineKind::Blank => {}
            LineKind::StatusFrame => match StatusParser::parse_frame(line) {
                Ok(frame) => {
                    tracing::debug!("Status {} at {}", frame.state, frame.position);
                    if frame.state != self.state.status() {
                        self.log_transition(&frame.state);
                    }
                    self.state.set_status(frame.state);
                    self.state.set_position(frame.position);
                    outcome.frames += 1;
                }
                Err(e) => {
                    tracing::warn!("Dropping status frame: {}", e);
                    outcome.dropped += 1;
                }
            },
            LineKind::Telemetry => {
                self.telemetry.push(line);
                outcome.telemetry_lines += 1;
            }
        }
    }

    fn log_transition(&self, next: &str) {
        if is_error_state(next) {
            tracing::warn!("Plotter entered {} ({})", get_state_name(next), next);
        } else {
            tracing::info!(
                "Plotter state {} -> {}",
                get_state_name(self.state.status()),
                get_state_name(next)
            );
        }
    }

    fn mark_disconnected(&mut self, cause: &io::Error) -> Error {
        tracing::error!("Link {} failed: {}", self.port_name, cause);
        self.state.set_status(STATUS_DISCONNECTED);
        self.close_port();
        ConnectionError::Disconnected {
            reason: cause.to_string(),
        }
        .into()
    }

    fn close_port(&mut self) -> bool {
        match self.port.take() {
            Some(mut port) => {
                if let Err(e) = port.close() {
                    tracing::warn!("Error closing {}: {}", self.port_name, e);
                }
                tracing::info!("Link {} closed", self.port_name);
                true
            }
            None => false,
        }
    }
}

/// Shared serial link plus the state it feeds
pub struct Link {
    inner: Mutex<LinkInner>,
}

impl Link {
    /// Wrap an open port
    pub fn new(port: Box<dyn SerialPort>, telemetry_capacity: usize) -> Self {
        let port_name = port.name();
        Self {
            inner: Mutex::new(LinkInner {
                port: Some(port),
                port_name,
                state: MachineState::new(),
                telemetry: TelemetryBuffer::new(telemetry_capacity),
                pending: Vec::new(),
            }),
        }
    }

    /// Acquire the link lock
    pub fn lock(&self) -> MutexGuard<'_, LinkInner> {
        self.inner.lock()
    }

    /// Consistent copy of the machine state
    pub fn snapshot(&self) -> MachineStateSnapshot {
        self.inner.lock().state.snapshot()
    }

    /// Atomically take every buffered telemetry line
    pub fn drain_telemetry(&self) -> Vec<String> {
        self.inner.lock().telemetry.drain()
    }

    /// Write a command under the link lock
    pub fn write_command(&self, command: &str) -> Result<()> {
        self.inner.lock().write_line(command.as_bytes())
    }

    /// Run one poll cycle under the link lock
    pub fn poll_once(&self) -> Result<PollOutcome> {
        self.inner.lock().poll()
    }

    /// Whether the port is still open
    pub fn is_connected(&self) -> bool {
        self.inner.lock().is_connected()
    }

    /// Close the port. Returns `true` only for the call that actually closed it.
    pub fn close(&self) -> bool {
        self.inner.lock().close_port()
    }
}
