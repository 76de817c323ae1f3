//! GRBL Plotter Controller
//!
//! Issues motion and control commands through the shared [`Link`]. Every
//! write happens under the link lock, so commands never interleave with the
//! monitor's status polls.

use crate::communication::link::{Link, LinkInner};
use crate::firmware::grbl::command_creator::CommandCreator;
use spectroplot_core::{
    Axis, CancelFlag, ControllerError, MachineStateSnapshot, MoveKind, PartialPosition, Result,
};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Controller timing configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlotterControllerConfig {
    /// Backoff between idle checks during an incremental move
    pub idle_poll: Duration,
    /// Give up waiting for idle after this long; `None` waits forever
    pub idle_timeout: Option<Duration>,
}

impl Default for PlotterControllerConfig {
    fn default() -> Self {
        Self {
            idle_poll: Duration::from_millis(200),
            idle_timeout: Some(Duration::from_secs(30)),
        }
    }
}

/// Motion and control front end for the plotter
pub struct PlotterController {
    link: Arc<Link>,
    config: PlotterControllerConfig,
}

impl PlotterController {
    /// Create a controller over an open link
    pub fn new(link: Arc<Link>, config: PlotterControllerConfig) -> Self {
        Self { link, config }
    }

    /// The shared link
    pub fn link(&self) -> &Arc<Link> {
        &self.link
    }

    /// Timing configuration
    pub fn config(&self) -> &PlotterControllerConfig {
        &self.config
    }

    /// Machine state copy taken under the link lock
    pub fn snapshot(&self) -> MachineStateSnapshot {
        self.link.snapshot()
    }

    /// Move with a textual kind (`"absolute"` / `"incremental"`)
    pub fn move_named(&self, kind: &str, target: &PartialPosition, feed: u32) -> Result<String> {
        let kind: MoveKind = kind.parse()?;
        self.move_plotter(kind, target, feed)
    }

    /// Move without external cancellation; returns the emitted command
    pub fn move_plotter(
        &self,
        kind: MoveKind,
        target: &PartialPosition,
        feed: u32,
    ) -> Result<String> {
        let never = spectroplot_core::cancel_flag();
        self.move_plotter_with_cancel(kind, target, feed, &never)
    }

    /// Move the plotter.
    ///
    /// Absolute moves are written immediately and record each given axis as
    /// the target. Incremental moves wait until the device reports `Idle`,
    /// then write the command and record `position at idle + delta` as the
    /// target for every axis (an omitted axis has a zero delta). The wait
    /// gives up with [`ControllerError::Timeout`] or
    /// [`ControllerError::Cancelled`].
    pub fn move_plotter_with_cancel(
        &self,
        kind: MoveKind,
        target: &PartialPosition,
        feed: u32,
        cancel: &CancelFlag,
    ) -> Result<String> {
        if let Some((axis, value)) = target.axes().find(|(_, v)| !v.is_finite()) {
            return Err(ControllerError::InvalidCommand {
                reason: format!("{} axis value {} is not finite", axis.letter(), value),
            }
            .into());
        }

        let command = CommandCreator::motion(kind, target, feed);
        match kind {
            MoveKind::Absolute => {
                let mut link = self.link.lock();
                ensure_connected(&link)?;
                link.write_line(command.as_bytes())?;
                for (axis, value) in target.axes() {
                    link.state_mut().set_target_axis(axis, value);
                }
                tracing::debug!("Absolute move: {}", command.trim_end());
                Ok(command)
            }
            MoveKind::Incremental => self.move_when_idle(command, target, cancel),
        }
    }

    fn move_when_idle(
        &self,
        command: String,
        target: &PartialPosition,
        cancel: &CancelFlag,
    ) -> Result<String> {
        let started = Instant::now();
        loop {
            if cancel.load(Ordering::SeqCst) {
                return Err(ControllerError::Cancelled.into());
            }

            {
                let mut link = self.link.lock();
                ensure_connected(&link)?;
                if link.state().is_idle() {
                    let origin = link.state().position();
                    link.write_line(command.as_bytes())?;
                    // Every axis is retargeted from the idle position. An
                    // omitted axis does not move, so an earlier absolute
                    // target it never reached is replaced by where it is.
                    for axis in Axis::ALL {
                        let delta = target.get(axis).unwrap_or(0.0);
                        link.state_mut()
                            .set_target_axis(axis, origin.get(axis) + delta);
                    }
                    tracing::debug!("Incremental move from {}: {}", origin, command.trim_end());
                    return Ok(command);
                }
            }

            if let Some(timeout) = self.config.idle_timeout {
                if started.elapsed() >= timeout {
                    return Err(ControllerError::Timeout {
                        timeout_ms: timeout.as_millis() as u64,
                    }
                    .into());
                }
            }
            thread::sleep(self.config.idle_poll);
        }
    }

    /// Clear an alarm lock (`$X`)
    pub fn unlock(&self) -> Result<()> {
        tracing::info!("Unlocking plotter");
        self.write_checked(&CommandCreator::unlock())
    }

    /// Set the work origin on the listed axes only
    pub fn zero(&self, axes: &[Axis]) -> Result<()> {
        self.write_checked(&CommandCreator::set_work_origin(axes))
    }

    /// Forward a client command verbatim, newline-terminated
    pub fn write_raw(&self, command: &str) -> Result<()> {
        self.write_checked(&CommandCreator::ensure_newline(command))
    }

    fn write_checked(&self, command: &str) -> Result<()> {
        let mut link = self.link.lock();
        ensure_connected(&link)?;
        link.write_line(command.as_bytes())
    }
}

fn ensure_connected(link: &LinkInner) -> Result<()> {
    if link.is_connected() {
        Ok(())
    } else {
        Err(ControllerError::NotConnected.into())
    }
}
