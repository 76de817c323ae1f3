//! Configuration management for SpectroPlot
//!
//! Provides configuration file handling and validation. Supports JSON and
//! TOML files; the default location is the platform config directory.
//!
//! Configuration is organized into logical sections:
//! - Connection settings (port, baud rate, framing)
//! - Monitor settings (status polling, telemetry, idle waits)
//! - Imaging settings (workspace, pixel size, normalization, canvas)

use crate::error::{ConfigError, SettingsError, SettingsResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name used inside the config directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Serial parity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParitySetting {
    #[default]
    None,
    Even,
    Odd,
}

impl std::fmt::Display for ParitySetting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Even => write!(f, "even"),
            Self::Odd => write!(f, "odd"),
        }
    }
}

/// Connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    /// Serial port name, or `"Auto"` to pick the last discovered plotter port
    pub port: String,
    /// Baud rate
    pub baud_rate: u32,
    /// Read timeout in milliseconds
    pub timeout_ms: u64,
    pub data_bits: u8,
    pub stop_bits: u8,
    pub parity: ParitySetting,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            port: "Auto".to_string(),
            baud_rate: 115200,
            timeout_ms: 10,
            data_bits: 8,
            stop_bits: 1,
            parity: ParitySetting::None,
        }
    }
}

/// Status monitor and controller timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorSettings {
    /// Status poll period in milliseconds
    pub poll_interval_ms: u64,
    /// Maximum buffered telemetry lines
    pub telemetry_capacity: usize,
    /// Backoff between idle checks of an incremental move
    pub idle_poll_ms: u64,
    /// Idle wait bound for incremental moves; 0 waits forever
    pub idle_timeout_ms: u64,
    /// Send `$X` right after the link opens
    pub unlock_on_connect: bool,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
            telemetry_capacity: 100,
            idle_poll_ms: 200,
            idle_timeout_ms: 30_000,
            unlock_on_connect: true,
        }
    }
}

/// A value per planar axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisPair {
    pub x: f64,
    pub y: f64,
}

impl AxisPair {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn is_positive(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.x > 0.0 && self.y > 0.0
    }
}

/// Plot box margins as fractions of the canvas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarginSettings {
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
    pub top: f64,
}

impl Default for MarginSettings {
    fn default() -> Self {
        Self {
            left: 0.04,
            right: 0.93,
            bottom: 0.04,
            top: 0.93,
        }
    }
}

impl MarginSettings {
    /// Fractions lie in 0..=1 and form a box with positive area
    pub fn is_valid(&self) -> bool {
        let unit = |v: f64| (0.0..=1.0).contains(&v);
        unit(self.left)
            && unit(self.right)
            && unit(self.bottom)
            && unit(self.top)
            && self.left < self.right
            && self.bottom < self.top
    }
}

/// Scan image settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagingSettings {
    /// Maximum reachable workspace in millimetres
    pub max_workspace_mm: AxisPair,
    /// Initial pixel size in millimetres
    pub pixel_size_mm: AxisPair,
    /// Lower clip percentile used for normalization
    pub low_percentile: f64,
    /// Upper clip percentile used for normalization
    pub high_percentile: f64,
    /// Canvas width in display pixels
    pub canvas_width_px: u32,
    pub margins: MarginSettings,
}

impl Default for ImagingSettings {
    fn default() -> Self {
        Self {
            max_workspace_mm: AxisPair::new(200.0, 100.0),
            pixel_size_mm: AxisPair::new(2.0, 2.0),
            low_percentile: 2.0,
            high_percentile: 98.0,
            canvas_width_px: 1000,
            margins: MarginSettings::default(),
        }
    }
}

/// Complete service configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub connection: ConnectionSettings,
    pub monitor: MonitorSettings,
    pub imaging: ImagingSettings,
}

#[derive(Clone, Copy)]
enum FileFormat {
    Json,
    Toml,
}

impl FileFormat {
    fn from_path(path: &Path) -> SettingsResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )
            .into()),
        }
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = FileFormat::from_path(path)?;
        let content = std::fs::read_to_string(path).map_err(|e| {
            SettingsError::LoadError(format!("{}: {}", path.display(), e))
        })?;

        let config: Self = match format {
            FileFormat::Json => serde_json::from_str(&content)?,
            FileFormat::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load from `path` if it exists, defaults otherwise
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::info!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match FileFormat::from_path(path)? {
            FileFormat::Json => serde_json::to_string_pretty(self)?,
            FileFormat::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| SettingsError::ConfigDirectory(e.to_string()))?;
        }
        std::fs::write(path, content)
            .map_err(|e| SettingsError::SaveError(format!("{}: {}", path.display(), e)))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        let connection = &self.connection;
        if connection.port.trim().is_empty() {
            return Err(SettingsError::invalid("connection.port", "must not be empty"));
        }
        if connection.baud_rate == 0 {
            return Err(SettingsError::invalid("connection.baud_rate", "must be > 0"));
        }
        if connection.timeout_ms == 0 {
            return Err(SettingsError::invalid("connection.timeout_ms", "must be > 0"));
        }
        if !(5..=8).contains(&connection.data_bits) {
            return Err(SettingsError::invalid("connection.data_bits", "must be 5-8"));
        }
        if !matches!(connection.stop_bits, 1 | 2) {
            return Err(SettingsError::invalid("connection.stop_bits", "must be 1 or 2"));
        }

        let monitor = &self.monitor;
        if monitor.poll_interval_ms == 0 {
            return Err(SettingsError::invalid("monitor.poll_interval_ms", "must be > 0"));
        }
        if monitor.telemetry_capacity == 0 {
            return Err(SettingsError::invalid("monitor.telemetry_capacity", "must be > 0"));
        }
        if monitor.idle_poll_ms == 0 {
            return Err(SettingsError::invalid("monitor.idle_poll_ms", "must be > 0"));
        }

        let imaging = &self.imaging;
        if !imaging.max_workspace_mm.is_positive() {
            return Err(SettingsError::invalid(
                "imaging.max_workspace_mm",
                "both axes must be finite and > 0",
            ));
        }
        if !imaging.pixel_size_mm.is_positive() {
            return Err(SettingsError::invalid(
                "imaging.pixel_size_mm",
                "both axes must be finite and > 0",
            ));
        }
        if imaging.pixel_size_mm.x > imaging.max_workspace_mm.x
            || imaging.pixel_size_mm.y > imaging.max_workspace_mm.y
        {
            return Err(SettingsError::invalid(
                "imaging.pixel_size_mm",
                "must not exceed the workspace",
            ));
        }
        let percent = |v: f64| (0.0..=100.0).contains(&v);
        if !percent(imaging.low_percentile) || !percent(imaging.high_percentile) {
            return Err(SettingsError::invalid(
                "imaging.percentiles",
                "must lie in 0..=100",
            ));
        }
        if imaging.low_percentile >= imaging.high_percentile {
            return Err(SettingsError::invalid(
                "imaging.percentiles",
                "low percentile must be below high percentile",
            ));
        }
        if imaging.canvas_width_px == 0 {
            return Err(SettingsError::invalid("imaging.canvas_width_px", "must be > 0"));
        }
        if !imaging.margins.is_valid() {
            return Err(SettingsError::invalid(
                "imaging.margins",
                "must be fractions forming a box with positive area",
            ));
        }

        Ok(())
    }
}

/// Default config file location, e.g. `~/.config/spectroplot/config.toml`
pub fn default_config_path() -> SettingsResult<PathBuf> {
    let base = dirs::config_dir().ok_or_else(|| {
        SettingsError::Config(ConfigError::UnsupportedPlatform(
            "no config directory".to_string(),
        ))
    })?;
    Ok(base.join("spectroplot").join(CONFIG_FILE_NAME))
}
