//! System Bridge Sensors Library
//!
//! Normalizes heterogeneous hardware sensor sources (native hwmon chips and an
//! external hardware-monitor JSON tree) into canonical per-CPU physical
//! metrics: temperature, package and per-core power, average and per-core
//! voltage.

pub mod cpu;
pub mod error;
pub mod hardware_monitor;
pub mod index;
pub mod matcher;
pub mod model;
pub mod native;

pub use cpu::{
    CoreValues, CpuAggregator, CpuPhysicalMetrics, CpuSensorSnapshot, TemperatureSource,
    VoltageAverage,
};
pub use error::{Error, Result};
pub use hardware_monitor::HardwareMonitor;
pub use native::HwmonReader;
pub use model::{
    FanChip, FanReading, HardwareNode, HardwareTree, NativeFanMap, NativeTemperatureMap,
    SensorReading, TemperatureChip, TemperatureReading,
};

/// Sentinel written into per-core slots with no reading in the legacy array form.
pub const MISSING_READING: f64 = -1.0;
