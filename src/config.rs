//! Configuration management for Ampswitch
//!
//! This module handles loading, validation, and management of the application
//! configuration from YAML files. Every field has a factory default, so a
//! missing file or a partial file is valid.

use crate::battery::ChargeBits;
use crate::controller::Availability;
use crate::error::{AmpswitchError, Result};
use crate::logging::parse_log_level;
use crate::peak::TimeWindow;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Locations searched by [`Config::load`], in order
pub const DEFAULT_CONFIG_PATHS: [&str; 3] = [
    "ampswitch.yaml",
    "/data/ampswitch.yaml",
    "/etc/ampswitch/config.yaml",
];

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The two recurring peak-pricing windows
    pub peak_windows: PeakWindowsConfig,

    /// Clock value at boot, epoch seconds
    pub boot_epoch: i64,

    /// Seconds between evaluations
    pub tick_interval_secs: u64,

    /// Scroll directives for the display
    pub display: DisplayConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Initial levels for the simulated sensing adapter
    pub sensors: SensorsConfig,
}

/// Evening and morning peak windows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeakWindowsConfig {
    pub evening: TimeWindow,
    pub morning: TimeWindow,
}

impl PeakWindowsConfig {
    pub fn windows(&self) -> Vec<TimeWindow> {
        vec![self.evening, self.morning]
    }
}

/// Scroll repeat count and speed handed to the presentation collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Times each banner scrolls
    pub repeat: u16,

    /// Scroll speed in milliseconds per step
    pub speed_ms: u16,

    /// Scroll speed for the battery banner after an automatic switch
    pub auto_switch_speed_ms: u16,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    pub level: String,

    /// Optional console-specific level, falls back to `level`
    pub console_level: Option<String>,

    /// Optional file-specific level, falls back to `level`
    pub file_level: Option<String>,

    /// Path to log file; empty disables file logging
    pub file: String,

    /// Number of rotated files to keep
    pub backup_count: u32,

    /// Whether to log to console
    pub console_output: bool,

    /// Whether to use JSON format
    pub json_format: bool,
}

/// Levels the simulated sensing adapter reports until changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorsConfig {
    pub ac_available: bool,
    pub solar: bool,
    pub wind: bool,
    /// Threshold bits b0..b3
    pub charge_bits: [bool; 4],
}

impl SensorsConfig {
    pub const fn availability(&self) -> Availability {
        Availability {
            ac_avail: self.ac_available,
            solar: self.solar,
            wind: self.wind,
        }
    }

    pub fn charge_bits(&self) -> ChargeBits {
        ChargeBits::from(self.charge_bits)
    }
}

impl Default for PeakWindowsConfig {
    fn default() -> Self {
        Self {
            // 17:00-20:00
            evening: TimeWindow {
                start: 1_607_205_600,
                end: 1_607_216_400,
            },
            // 06:00-09:00
            morning: TimeWindow {
                start: 1_607_252_400,
                end: 1_607_263_200,
            },
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            repeat: 1,
            speed_ms: 300,
            auto_switch_speed_ms: 400,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            console_level: None,
            file_level: None,
            file: "/tmp/ampswitch.log".to_string(),
            backup_count: 5,
            console_output: true,
            json_format: false,
        }
    }
}

impl Default for SensorsConfig {
    fn default() -> Self {
        Self {
            ac_available: true,
            solar: false,
            wind: false,
            charge_bits: [false; 4],
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            peak_windows: PeakWindowsConfig::default(),
            // 16:55, five minutes before the evening window
            boot_epoch: 1_607_205_300,
            tick_interval_secs: 300,
            display: DisplayConfig::default(),
            logging: LoggingConfig::default(),
            sensors: SensorsConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Load from the first default location that exists, else defaults
    pub fn load() -> Result<Self> {
        for path in &DEFAULT_CONFIG_PATHS {
            if Path::new(path).exists() {
                return Self::from_file(path);
            }
        }

        Ok(Self::default())
    }

    /// Load from an explicit path when given; the file must exist
    pub fn load_from(path: Option<PathBuf>) -> Result<Self> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(AmpswitchError::config(format!(
                        "Config file not found: {}",
                        p.display()
                    )));
                }
                Self::from_file(p)
            }
            None => Self::load(),
        }
    }

    /// Save configuration to a YAML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.peak_windows
            .evening
            .validate("peak_windows.evening")?;
        self.peak_windows
            .morning
            .validate("peak_windows.morning")?;

        if self.tick_interval_secs == 0 {
            return Err(AmpswitchError::validation(
                "tick_interval_secs",
                "Must be greater than 0",
            ));
        }

        if self.display.repeat == 0 {
            return Err(AmpswitchError::validation(
                "display.repeat",
                "Must be greater than 0",
            ));
        }

        if self.display.speed_ms == 0 || self.display.auto_switch_speed_ms == 0 {
            return Err(AmpswitchError::validation(
                "display.speed_ms",
                "Scroll speeds must be greater than 0",
            ));
        }

        parse_log_level(&self.logging.level)
            .map_err(|e| AmpswitchError::validation("logging.level", e.to_string()))?;
        for (field, level) in [
            ("logging.console_level", &self.logging.console_level),
            ("logging.file_level", &self.logging.file_level),
        ] {
            if let Some(level) = level {
                parse_log_level(level)
                    .map_err(|e| AmpswitchError::validation(field, e.to_string()))?;
            }
        }

        Ok(())
    }
}
