//! Network I/O counter sensor.

use super::data::NetworkIoRecord;
use super::Sensor;
use std::fs;
use tracing::info;

/// Network sensor reading /proc/net/dev.
pub struct NetworkSensor {
    name: String,
    exclude: Vec<String>,
}

impl NetworkSensor {
    /// Creates a sensor skipping interfaces whose name starts with any of `exclude`.
    pub fn new(exclude: &[String]) -> Self {
        info!("Network sensor excluding interfaces: {:?}", exclude);
        Self {
            name: "networks".to_string(),
            exclude: exclude.to_vec(),
        }
    }

    fn is_excluded(&self, interface: &str) -> bool {
        self.exclude
            .iter()
            .any(|prefix| interface.starts_with(prefix.as_str()))
    }

    /// Parses /proc/net/dev.
    ///
    /// After two header lines each row is `iface: rx_bytes rx_packets rx_errs
    /// rx_drop rx_fifo rx_frame rx_compressed rx_multicast tx_bytes tx_packets
    /// tx_errs tx_drop ...`.
    fn parse(&self, content: &str) -> Vec<NetworkIoRecord> {
        content
            .lines()
            .skip(2)
            .filter_map(|line| {
                let (interface, counters) = line.split_once(':')?;
                let interface = interface.trim();
                if self.is_excluded(interface) {
                    return None;
                }
                let fields: Vec<u64> = counters
                    .split_whitespace()
                    .map(|s| s.parse().ok())
                    .collect::<Option<Vec<u64>>>()?;
                if fields.len() < 12 {
                    return None;
                }
                Some(NetworkIoRecord {
                    name: interface.to_string(),
                    bytes_recv: fields[0],
                    packets_recv: fields[1],
                    errin: fields[2],
                    dropin: fields[3],
                    bytes_sent: fields[8],
                    packets_sent: fields[9],
                    errout: fields[10],
                    dropout: fields[11],
                })
            })
            .collect()
    }
}

impl Sensor for NetworkSensor {
    type Output = Vec<NetworkIoRecord>;

    fn name(&self) -> &str {
        &self.name
    }

    fn sample(&mut self) -> Vec<NetworkIoRecord> {
        fs::read_to_string("/proc/net/dev")
            .map(|content| self.parse(&content))
            .unwrap_or_default()
    }
}
