//! CPU usage, load and frequency sensor.

use super::data::CpuUsage;
use super::Sensor;
use std::fs;

/// Idle and total jiffies for one `/proc/stat` cpu line.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct CpuTimes {
    idle: u64,
    total: u64,
}

impl CpuTimes {
    /// Usage percentage between `last` and `self`.
    fn usage_since(&self, last: &CpuTimes) -> f64 {
        let idle_delta = self.idle.saturating_sub(last.idle);
        let total_delta = self.total.saturating_sub(last.total);
        if total_delta > 0 && last.total > 0 {
            100.0 * (1.0 - (idle_delta as f64 / total_delta as f64))
        } else {
            0.0
        }
    }
}

/// CPU usage sensor.
pub struct CpuSensor {
    name: String,
    last_total: CpuTimes,
    last_per_cpu: Vec<CpuTimes>,
}

impl CpuSensor {
    /// Creates a new CPU sensor.
    pub fn new() -> Self {
        Self {
            name: "cpu".to_string(),
            last_total: CpuTimes::default(),
            last_per_cpu: Vec::new(),
        }
    }

    /// Parses `/proc/stat` into the aggregate line and one entry per CPU.
    fn parse_stat(content: &str) -> Option<(CpuTimes, Vec<CpuTimes>)> {
        let mut total = None;
        let mut per_cpu = Vec::new();

        for line in content.lines() {
            let mut fields = line.split_whitespace();
            let Some(label) = fields.next() else {
                continue;
            };
            if !label.starts_with("cpu") {
                continue;
            }
            let parts: Vec<u64> = fields.filter_map(|s| s.parse().ok()).collect();
            if parts.len() < 4 {
                continue;
            }
            let times = CpuTimes {
                idle: parts[3],
                total: parts.iter().sum(),
            };
            if label == "cpu" {
                total = Some(times);
            } else {
                per_cpu.push(times);
            }
        }

        total.map(|t| (t, per_cpu))
    }

    /// Mean of the three `/proc/loadavg` values.
    fn parse_loadavg(content: &str) -> Option<f64> {
        let values: Vec<f64> = content
            .split_whitespace()
            .take(3)
            .filter_map(|s| s.parse().ok())
            .collect();
        if values.len() == 3 {
            Some(values.iter().sum::<f64>() / 3.0)
        } else {
            None
        }
    }

    /// Current "cpu MHz" of every processor in `/proc/cpuinfo`.
    fn parse_frequencies(content: &str) -> Vec<f64> {
        content
            .lines()
            .filter(|line| line.starts_with("cpu MHz"))
            .filter_map(|line| line.split(':').nth(1))
            .filter_map(|value| value.trim().parse().ok())
            .collect()
    }

    fn fallback_count() -> usize {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }
}

impl Default for CpuSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl Sensor for CpuSensor {
    type Output = CpuUsage;

    fn name(&self) -> &str {
        &self.name
    }

    fn sample(&mut self) -> CpuUsage {
        let mut usage = CpuUsage::default();

        if let Some((total, per_cpu)) = fs::read_to_string("/proc/stat")
            .ok()
            .and_then(|content| Self::parse_stat(&content))
        {
            usage.usage = total.usage_since(&self.last_total);
            usage.usage_per_cpu = per_cpu
                .iter()
                .enumerate()
                .map(|(i, times)| {
                    self.last_per_cpu
                        .get(i)
                        .map(|last| times.usage_since(last))
                        .unwrap_or(0.0)
                })
                .collect();
            usage.count = per_cpu.len();
            self.last_total = total;
            self.last_per_cpu = per_cpu;
        }

        if usage.count == 0 {
            usage.count = Self::fallback_count();
        }
        usage.load_average = fs::read_to_string("/proc/loadavg")
            .ok()
            .and_then(|content| Self::parse_loadavg(&content));
        usage.frequency_per_cpu = fs::read_to_string("/proc/cpuinfo")
            .map(|content| Self::parse_frequencies(&content))
            .unwrap_or_default();

        usage
    }
}
