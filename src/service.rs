//! Plotter service
//!
//! [`PlotterService`] owns everything the running process needs: the link
//! and its monitor thread, the controller, the scan workspace behind the
//! imaging lock, the frame generator behind the render lock, and the
//! spectrometer. Every client operation is a method on it.

use parking_lot::Mutex;
use serde::Serialize;
use spectroplot_communication::{
    open_port, ConnectionParams, Link, LinkMonitor, PlotterController, PlotterControllerConfig,
    SerialParity, SerialPort,
};
use spectroplot_core::{
    Axis, CancelFlag, MachineStateSnapshot, MoveKind, PartialPosition, Result, ScanResult,
    Spectrometer,
};
use spectroplot_settings::{
    Config, ConnectionSettings, ImagingSettings, MonitorSettings, ParitySetting,
};
use spectroplot_visualizer::{
    CanvasLayout, CoordinateSpace, FrameGenerator, IdentityProcessor, Margins, PlotterMetadata,
    RenderFrame, ScanWorkspace, SpectrumProcessor, XyPair,
};
use std::sync::Arc;
use std::time::Duration;

/// Result of a scan taken at the current plotter position
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanOutcome {
    /// Cell the scan was stored in
    pub cell: (usize, usize),
    pub data: ScanResult,
}

/// The running plotter service
pub struct PlotterService {
    link: Arc<Link>,
    monitor: Mutex<LinkMonitor>,
    controller: PlotterController,
    imaging: Mutex<ScanWorkspace>,
    render: Mutex<FrameGenerator>,
    spectrometer: Mutex<Box<dyn Spectrometer>>,
}

impl PlotterService {
    /// Open the configured serial port and start the service.
    ///
    /// Failing to open the port is fatal; nothing is started in that case.
    pub fn start(config: &Config, spectrometer: Box<dyn Spectrometer>) -> Result<Self> {
        let params = connection_params(&config.connection);
        let port = open_port(&params)?;
        Self::start_with_port(port, config, spectrometer, Box::new(IdentityProcessor))
    }

    /// Start the service over an already open port
    pub fn start_with_port(
        port: Box<dyn SerialPort>,
        config: &Config,
        spectrometer: Box<dyn Spectrometer>,
        processor: Box<dyn SpectrumProcessor>,
    ) -> Result<Self> {
        let imaging = &config.imaging;
        let workspace = ScanWorkspace::new(
            XyPair::new(imaging.max_workspace_mm.x, imaging.max_workspace_mm.y),
            XyPair::new(imaging.pixel_size_mm.x, imaging.pixel_size_mm.y),
            canvas_layout(imaging),
            processor,
            (imaging.low_percentile, imaging.high_percentile),
        )?;

        let port_name = port.name();
        let link = Arc::new(Link::new(port, config.monitor.telemetry_capacity));
        let controller = PlotterController::new(link.clone(), controller_config(&config.monitor));
        if config.monitor.unlock_on_connect {
            controller.unlock()?;
        }

        let monitor = LinkMonitor::spawn(
            link.clone(),
            Duration::from_millis(config.monitor.poll_interval_ms),
        )?;

        tracing::info!(
            "Plotter service started on {} ({}x{} cells)",
            port_name,
            workspace.space().resolution().x,
            workspace.space().resolution().y
        );

        Ok(Self {
            link,
            monitor: Mutex::new(monitor),
            controller,
            imaging: Mutex::new(workspace),
            render: Mutex::new(FrameGenerator::default()),
            spectrometer: Mutex::new(spectrometer),
        })
    }

    /// Current status, position and target
    pub fn snapshot(&self) -> MachineStateSnapshot {
        self.link.snapshot()
    }

    /// Take every buffered telemetry line, oldest first
    pub fn drain_telemetry(&self) -> Vec<String> {
        self.link.drain_telemetry()
    }

    pub fn is_connected(&self) -> bool {
        self.link.is_connected()
    }

    pub fn controller(&self) -> &PlotterController {
        &self.controller
    }

    /// Move the plotter; returns the command that was written
    pub fn move_plotter(
        &self,
        kind: MoveKind,
        target: &PartialPosition,
        feed: u32,
    ) -> Result<String> {
        self.controller.move_plotter(kind, target, feed)
    }

    /// Move with a textual kind (`"absolute"` / `"incremental"`)
    pub fn move_named(&self, kind: &str, target: &PartialPosition, feed: u32) -> Result<String> {
        self.controller.move_named(kind, target, feed)
    }

    /// Move, giving up on the idle wait when `cancel` is raised
    pub fn move_with_cancel(
        &self,
        kind: MoveKind,
        target: &PartialPosition,
        feed: u32,
        cancel: &CancelFlag,
    ) -> Result<String> {
        self.controller
            .move_plotter_with_cancel(kind, target, feed, cancel)
    }

    pub fn unlock(&self) -> Result<()> {
        self.controller.unlock()
    }

    /// Make the current position the work origin on the given axes
    pub fn zero(&self, axes: &[Axis]) -> Result<()> {
        self.controller.zero(axes)
    }

    pub fn write_raw(&self, command: &str) -> Result<()> {
        self.controller.write_raw(command)
    }

    /// Current layout metadata
    pub fn metadata(&self) -> PlotterMetadata {
        self.imaging.lock().metadata()
    }

    /// Copy of the current coordinate space
    pub fn coordinate_space(&self) -> CoordinateSpace {
        self.imaging.lock().space().clone()
    }

    /// Number of cells holding a scan
    pub fn scanned_cells(&self) -> usize {
        self.imaging.lock().image().scanned_count()
    }

    /// Change the pixel size. Stored scans are discarded.
    ///
    /// Holds the render lock so no frame is drawn against a half-rebuilt
    /// grid.
    pub fn set_pixel_size(&self, x: f64, y: f64) -> Result<PlotterMetadata> {
        let _render = self.render.lock();
        let mut imaging = self.imaging.lock();
        Ok(imaging.set_pixel_size(XyPair::new(x, y))?)
    }

    /// Scan at the current plotter position and store the result.
    ///
    /// A position outside the grid surfaces `OutOfBounds` and the scan is
    /// not stored.
    pub fn scan_here(&self, num_repeats: u32, pga_gain: Option<u8>) -> Result<ScanOutcome> {
        let data = self.spectrometer.lock().scan(num_repeats, pga_gain)?;
        let position = self.link.snapshot().position;

        let cell = self
            .imaging
            .lock()
            .store_at_position(position.x, position.y, data.clone())?;
        tracing::debug!(
            "Scan at ({}, {}) stored in cell ({}, {})",
            position.x,
            position.y,
            cell.0,
            cell.1
        );
        Ok(ScanOutcome { cell, data })
    }

    /// Store a scan result at an explicit cell
    pub fn set_pixel_data(&self, ix: i64, iy: i64, data: ScanResult) -> Result<()> {
        self.imaging.lock().store_at_cell(ix, iy, data)?;
        Ok(())
    }

    pub fn set_lamp(&self, on: bool) -> Result<()> {
        self.spectrometer.lock().set_lamp(on)
    }

    pub fn clear_error(&self) -> Result<()> {
        self.spectrometer.lock().clear_error()
    }

    /// Render the next frame with the cursor at the reported position
    pub fn render_frame(&self) -> Result<RenderFrame> {
        let mut render = self.render.lock();
        let imaging = self.imaging.lock();
        let state = self.link.snapshot();
        Ok(render.next_frame(imaging.image(), imaging.space(), state)?)
    }

    /// Stop the monitor and close the link. Safe to call more than once.
    pub fn shutdown(&self) {
        self.monitor.lock().shutdown();
    }

    /// Whether the monitor thread is still polling
    pub fn is_monitoring(&self) -> bool {
        self.monitor.lock().is_running()
    }
}

/// Serial parameters for the configured connection
pub fn connection_params(settings: &ConnectionSettings) -> ConnectionParams {
    ConnectionParams {
        port: settings.port.clone(),
        baud_rate: settings.baud_rate,
        timeout_ms: settings.timeout_ms,
        data_bits: settings.data_bits,
        stop_bits: settings.stop_bits,
        parity: match settings.parity {
            ParitySetting::None => SerialParity::None,
            ParitySetting::Even => SerialParity::Even,
            ParitySetting::Odd => SerialParity::Odd,
        },
        flow_control: false,
    }
}

fn controller_config(settings: &MonitorSettings) -> PlotterControllerConfig {
    PlotterControllerConfig {
        idle_poll: Duration::from_millis(settings.idle_poll_ms),
        idle_timeout: match settings.idle_timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        },
    }
}

fn canvas_layout(settings: &ImagingSettings) -> CanvasLayout {
    let margins = &settings.margins;
    CanvasLayout {
        width_px: settings.canvas_width_px,
        margins: Margins {
            left: margins.left,
            right: margins.right,
            bottom: margins.bottom,
            top: margins.top,
        },
    }
}
