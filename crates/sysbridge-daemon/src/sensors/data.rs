//! Telemetry records emitted each cycle.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sysbridge_sensors::{CpuPhysicalMetrics, NativeFanMap};

/// One telemetry cycle.
#[derive(Debug, Clone, Serialize)]
pub struct TelemetryRecord {
    pub timestamp: DateTime<Utc>,
    pub cpu: CpuRecord,
    pub memory: MemoryRecord,
    pub disks: Vec<DiskIoRecord>,
    pub networks: Vec<NetworkIoRecord>,
    /// Native fan speeds, absent where unsupported.
    pub fans: Option<NativeFanMap>,
}

/// CPU counters plus normalized physical metrics.
#[derive(Debug, Clone, Serialize)]
pub struct CpuRecord {
    /// Logical CPU count.
    pub count: usize,
    /// Overall usage percentage (0-100).
    pub usage: f64,
    pub usage_per_cpu: Vec<f64>,
    /// Mean of the 1, 5 and 15 minute load averages.
    pub load_average: Option<f64>,
    /// Current frequency in MHz per CPU.
    pub frequency_per_cpu: Vec<f64>,
    pub physical: Option<CpuPhysicalMetrics>,
}

/// CPU usage counters from one sample.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CpuUsage {
    pub count: usize,
    pub usage: f64,
    pub usage_per_cpu: Vec<f64>,
    pub load_average: Option<f64>,
    pub frequency_per_cpu: Vec<f64>,
}

/// Virtual memory and swap, in bytes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MemoryRecord {
    #[serde(rename = "virtual")]
    pub virtual_memory: VirtualMemory,
    pub swap: SwapMemory,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VirtualMemory {
    pub total: u64,
    pub available: u64,
    pub used: u64,
    pub free: u64,
    pub percent: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SwapMemory {
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub percent: f64,
}

/// Cumulative I/O counters for one block device.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiskIoRecord {
    pub name: String,
    pub read_count: u64,
    pub write_count: u64,
    pub read_bytes: u64,
    pub write_bytes: u64,
    /// Milliseconds spent reading.
    pub read_time: u64,
    /// Milliseconds spent writing.
    pub write_time: u64,
}

/// Cumulative I/O counters for one network interface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkIoRecord {
    pub name: String,
    pub bytes_sent: u64,
    pub bytes_recv: u64,
    pub packets_sent: u64,
    pub packets_recv: u64,
    pub errin: u64,
    pub errout: u64,
    pub dropin: u64,
    pub dropout: u64,
}

/// Percentage of `part` in `total`, 0 when `total` is 0.
pub fn percent(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * (part as f64 / total as f64)
    }
}
