//! SpectroPlot Settings Crate
//!
//! Handles service configuration: defaults, JSON/TOML files and validation.

pub mod config;
pub mod error;

pub use config::{
    default_config_path, AxisPair, Config, ConnectionSettings, ImagingSettings, MarginSettings,
    MonitorSettings, ParitySetting, CONFIG_FILE_NAME,
};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
