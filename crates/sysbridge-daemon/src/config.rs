//! Configuration management.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use sysbridge_sensors::native::HWMON_ROOT;
use sysbridge_sensors::VoltageAverage;
use tracing::warn;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Telemetry cycle interval in milliseconds
    #[serde(default = "default_interval")]
    pub interval: u64,

    /// External hardware monitor configuration
    #[serde(default)]
    pub hardware_monitor: HardwareMonitorConfig,

    /// Native sensor configuration
    #[serde(default)]
    pub native: NativeConfig,

    /// CPU aggregation configuration
    #[serde(default)]
    pub cpu: CpuConfig,

    /// Network configuration
    #[serde(default)]
    pub network: NetworkConfig,
}

/// External hardware monitor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HardwareMonitorConfig {
    /// Run the hardware monitor each cycle
    #[serde(default = "default_hardware_monitor_enable")]
    pub enable: bool,

    /// Executable path (empty disables the monitor)
    #[serde(default)]
    pub path: String,

    /// Arguments passed to the executable
    #[serde(default)]
    pub args: Vec<String>,

    /// Timeout in milliseconds
    #[serde(default = "default_hardware_monitor_timeout")]
    pub timeout: u64,
}

impl HardwareMonitorConfig {
    /// Returns true if the monitor should run.
    pub fn is_active(&self) -> bool {
        self.enable && !self.path.is_empty()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout)
    }
}

impl Default for HardwareMonitorConfig {
    fn default() -> Self {
        Self {
            enable: default_hardware_monitor_enable(),
            path: String::new(),
            args: Vec::new(),
            timeout: default_hardware_monitor_timeout(),
        }
    }
}

/// Native sensor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NativeConfig {
    /// hwmon class directory
    #[serde(default = "default_hwmon_root")]
    pub hwmon_root: String,
}

impl Default for NativeConfig {
    fn default() -> Self {
        Self {
            hwmon_root: default_hwmon_root(),
        }
    }
}

/// CPU aggregation configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CpuConfig {
    /// Average voltage denominator ("declared-cores" or "populated-cores")
    #[serde(default)]
    pub voltage_average: VoltageAverage,
}

/// Network configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Interface name prefixes to skip
    #[serde(default = "default_network_exclude")]
    pub exclude: Vec<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            exclude: default_network_exclude(),
        }
    }
}

// Default value functions
fn default_interval() -> u64 {
    5000
}

fn default_hardware_monitor_enable() -> bool {
    cfg!(windows)
}

fn default_hardware_monitor_timeout() -> u64 {
    10000
}

fn default_hwmon_root() -> String {
    HWMON_ROOT.to_string()
}

fn default_network_exclude() -> Vec<String> {
    vec!["lo".to_string()]
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content =
            std::fs::read_to_string(path.as_ref()).context("Failed to read configuration file")?;
        Self::parse(&content)
    }

    /// Loads configuration, falling back to defaults if the file is missing.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if !path.as_ref().exists() {
            warn!(
                "Configuration file {} not found, using defaults",
                path.as_ref().display()
            );
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Parses configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse configuration")
    }

    /// Serializes configuration to TOML text.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            hardware_monitor: HardwareMonitorConfig::default(),
            native: NativeConfig::default(),
            cpu: CpuConfig::default(),
            network: NetworkConfig::default(),
        }
    }
}
