//! Memory and swap sensor.

use super::data::{percent, MemoryRecord, SwapMemory, VirtualMemory};
use super::Sensor;
use std::fs;

/// Memory sensor reading `/proc/meminfo`.
pub struct MemorySensor {
    name: String,
}

impl MemorySensor {
    /// Creates a new memory sensor.
    pub fn new() -> Self {
        Self {
            name: "memory".to_string(),
        }
    }

    /// Returns a `/proc/meminfo` field in bytes.
    fn field(content: &str, key: &str) -> Option<u64> {
        for line in content.lines() {
            if let Some(rest) = line.strip_prefix(key) {
                let Some(rest) = rest.strip_prefix(':') else {
                    continue;
                };
                let kb: u64 = rest.split_whitespace().next()?.parse().ok()?;
                return Some(kb * 1024);
            }
        }
        None
    }

    fn parse(content: &str) -> MemoryRecord {
        let total = Self::field(content, "MemTotal").unwrap_or(0);
        let free = Self::field(content, "MemFree").unwrap_or(0);
        let available = Self::field(content, "MemAvailable").unwrap_or(free);
        let used = total.saturating_sub(available);

        let swap_total = Self::field(content, "SwapTotal").unwrap_or(0);
        let swap_free = Self::field(content, "SwapFree").unwrap_or(0);
        let swap_used = swap_total.saturating_sub(swap_free);

        MemoryRecord {
            virtual_memory: VirtualMemory {
                total,
                available,
                used,
                free,
                percent: percent(used, total),
            },
            swap: SwapMemory {
                total: swap_total,
                used: swap_used,
                free: swap_free,
                percent: percent(swap_used, swap_total),
            },
        }
    }
}

impl Default for MemorySensor {
    fn default() -> Self {
        Self::new()
    }
}

impl Sensor for MemorySensor {
    type Output = MemoryRecord;

    fn name(&self) -> &str {
        &self.name
    }

    fn sample(&mut self) -> MemoryRecord {
        fs::read_to_string("/proc/meminfo")
            .map(|content| Self::parse(&content))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MEMINFO: &str = "MemTotal:       16000000 kB\n\
                           MemFree:         2000000 kB\n\
                           MemAvailable:    8000000 kB\n\
                           Buffers:          500000 kB\n\
                           SwapTotal:       4000000 kB\n\
                           SwapFree:        3000000 kB\n";

    #[test]
    fn test_parse_meminfo() {
        let record = MemorySensor::parse(MEMINFO);
        let memory = &record.virtual_memory;
        assert_eq!(memory.total, 16_000_000 * 1024);
        assert_eq!(memory.available, 8_000_000 * 1024);
        assert_eq!(memory.used, 8_000_000 * 1024);
        assert_eq!(memory.free, 2_000_000 * 1024);
        assert_eq!(memory.percent, 50.0);

        assert_eq!(record.swap.used, 1_000_000 * 1024);
        assert_eq!(record.swap.percent, 25.0);
    }

    #[test]
    fn test_missing_available_uses_free() {
        let record = MemorySensor::parse("MemTotal: 1000 kB\nMemFree: 250 kB\n");
        assert_eq!(record.virtual_memory.available, 250 * 1024);
        assert_eq!(record.virtual_memory.percent, 75.0);
        assert_eq!(record.swap, SwapMemory::default());
    }
}
