//! Disk I/O counter sensor.

use super::data::DiskIoRecord;
use super::Sensor;
use std::fs;

/// Sectors in /proc/diskstats are always 512 bytes.
const SECTOR_SIZE: u64 = 512;

/// Device name prefixes that are not real disks.
const VIRTUAL_PREFIXES: &[&str] = &["loop", "ram"];

/// Disk I/O sensor that reads from /proc/diskstats.
pub struct DiskSensor {
    name: String,
}

impl DiskSensor {
    /// Creates a new disk sensor.
    pub fn new() -> Self {
        Self {
            name: "disks".to_string(),
        }
    }

    /// Parses /proc/diskstats.
    ///
    /// Format: https://www.kernel.org/doc/Documentation/ABI/testing/procfs-diskstats
    /// Fields: major minor name reads_completed reads_merged sectors_read time_reading
    ///         writes_completed writes_merged sectors_written time_writing ...
    fn parse(content: &str) -> Vec<DiskIoRecord> {
        content
            .lines()
            .filter_map(|line| {
                let parts: Vec<&str> = line.split_whitespace().collect();
                if parts.len() < 11 {
                    return None;
                }
                let name = parts[2];
                if VIRTUAL_PREFIXES.iter().any(|p| name.starts_with(p)) {
                    return None;
                }
                let field = |i: usize| parts[i].parse::<u64>().ok();
                Some(DiskIoRecord {
                    name: name.to_string(),
                    read_count: field(3)?,
                    read_bytes: field(5)? * SECTOR_SIZE,
                    read_time: field(6)?,
                    write_count: field(7)?,
                    write_bytes: field(9)? * SECTOR_SIZE,
                    write_time: field(10)?,
                })
            })
            .collect()
    }
}

impl Default for DiskSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl Sensor for DiskSensor {
    type Output = Vec<DiskIoRecord>;

    fn name(&self) -> &str {
        &self.name
    }

    fn sample(&mut self) -> Vec<DiskIoRecord> {
        fs::read_to_string("/proc/diskstats")
            .map(|content| Self::parse(&content))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DISKSTATS: &str = "   7       0 loop0 52 0 2082 13 0 0 0 0 0 40 13 0 0 0 0\n\
                             259       0 nvme0n1 180000 4000 9000000 40000 250000 90000 12000000 300000 0 200000 340000 0 0 0 0\n\
                             259       1 nvme0n1p1 300 0 8000 50 2 0 2 0 0 80 50 0 0 0 0\n\
                             8        0 sda broken\n";

    #[test]
    fn test_parse_diskstats() {
        let disks = DiskSensor::parse(DISKSTATS);
        assert_eq!(disks.len(), 2);

        let nvme = &disks[0];
        assert_eq!(nvme.name, "nvme0n1");
        assert_eq!(nvme.read_count, 180000);
        assert_eq!(nvme.read_bytes, 9_000_000 * 512);
        assert_eq!(nvme.read_time, 40000);
        assert_eq!(nvme.write_count, 250000);
        assert_eq!(nvme.write_bytes, 12_000_000 * 512);
        assert_eq!(nvme.write_time, 300000);

        assert_eq!(disks[1].name, "nvme0n1p1");
    }
}
