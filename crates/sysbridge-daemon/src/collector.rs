//! Telemetry cycle: sample every source and assemble one record.

use chrono::Utc;
use sysbridge_sensors::{
    CpuAggregator, CpuPhysicalMetrics, CpuSensorSnapshot, HardwareMonitor, HardwareNode,
    HwmonReader, NativeTemperatureMap,
};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::sensors::data::{CpuRecord, TelemetryRecord};
use crate::sensors::{CpuSensor, DiskSensor, MemorySensor, NetworkSensor, Sensor};

/// Counter sensors sampled every cycle.
struct Sensors {
    cpu: CpuSensor,
    memory: MemorySensor,
    disk: DiskSensor,
    network: NetworkSensor,
}

impl Sensors {
    fn new(network_exclude: &[String]) -> Self {
        let sensors = Self {
            cpu: CpuSensor::new(),
            memory: MemorySensor::new(),
            disk: DiskSensor::new(),
            network: NetworkSensor::new(network_exclude),
        };
        info!(
            "Sensors: {}, {}, {}, {}",
            sensors.cpu.name(),
            sensors.memory.name(),
            sensors.disk.name(),
            sensors.network.name()
        );
        sensors
    }
}

/// Collects telemetry records.
pub struct Collector {
    sensors: Sensors,
    hwmon: HwmonReader,
    hardware_monitor: Option<HardwareMonitor>,
    aggregator: CpuAggregator,
}

impl Collector {
    /// Creates a collector from configuration.
    pub fn new(config: &Config) -> Self {
        let hardware_monitor = if config.hardware_monitor.is_active() {
            info!("Hardware monitor: {}", config.hardware_monitor.path);
            Some(
                HardwareMonitor::new(
                    &config.hardware_monitor.path,
                    config.hardware_monitor.timeout(),
                )
                .with_args(config.hardware_monitor.args.clone()),
            )
        } else {
            info!("Hardware monitor disabled");
            None
        };

        Self {
            sensors: Sensors::new(&config.network.exclude),
            hwmon: HwmonReader::new(&config.native.hwmon_root),
            hardware_monitor,
            aggregator: CpuAggregator::new().with_voltage_average(config.cpu.voltage_average),
        }
    }

    /// Runs one telemetry cycle.
    pub async fn collect(&mut self) -> TelemetryRecord {
        let usage = self.sensors.cpu.sample();
        let temperatures = self.hwmon.temperatures();
        let hardware_tree = match &self.hardware_monitor {
            Some(monitor) => monitor.read_tree().await,
            None => None,
        };
        let physical = self.physical(usage.count, temperatures, hardware_tree);

        let record = TelemetryRecord {
            timestamp: Utc::now(),
            cpu: CpuRecord {
                count: usage.count,
                usage: usage.usage,
                usage_per_cpu: usage.usage_per_cpu,
                load_average: usage.load_average,
                frequency_per_cpu: usage.frequency_per_cpu,
                physical,
            },
            memory: self.sensors.memory.sample(),
            disks: self.sensors.disk.sample(),
            networks: self.sensors.network.sample(),
            fans: self.hwmon.fans(),
        };
        debug!(
            "Collected {} disks, {} networks",
            record.disks.len(),
            record.networks.len()
        );
        record
    }

    /// Aggregates CPU physical metrics for this cycle's sensor data.
    fn physical(
        &self,
        core_count: usize,
        temperatures: Option<NativeTemperatureMap>,
        hardware_tree: Option<Vec<HardwareNode>>,
    ) -> Option<CpuPhysicalMetrics> {
        match CpuSensorSnapshot::new(core_count) {
            Ok(snapshot) => {
                let snapshot = snapshot
                    .with_native_temperatures(temperatures)
                    .with_hardware_tree(hardware_tree);
                Some(self.aggregator.aggregate(&snapshot))
            }
            Err(e) => {
                warn!("Skipping CPU sensor aggregation: {}", e);
                None
            }
        }
    }
}
