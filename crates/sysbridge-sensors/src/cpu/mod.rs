//! CPU telemetry aggregation.
//!
//! Combines the native temperature map and the external hardware tree into
//! one [`CpuPhysicalMetrics`] per telemetry cycle. Aggregation is a pure
//! function of the snapshot: missing or malformed data degrades to absent
//! values, never to an error.

mod power;
mod temperature;
mod voltage;

use serde::{Deserialize, Serialize};

use crate::matcher::is_cpu_hardware;
use crate::model::{HardwareNode, NativeTemperatureMap};
use crate::{Error, Result, MISSING_READING};

pub use temperature::TemperatureSource;

/// Input to one aggregation, assembled by the caller each cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CpuSensorSnapshot {
    core_count: usize,
    /// Native per-chip temperatures, `None` where the platform has none.
    pub native_temperatures: Option<NativeTemperatureMap>,
    /// External hardware tree, `None` when the monitor is unavailable.
    pub hardware_tree: Option<Vec<HardwareNode>>,
}

impl CpuSensorSnapshot {
    /// Creates an empty snapshot for `core_count` cores.
    pub fn new(core_count: usize) -> Result<Self> {
        if core_count == 0 {
            return Err(Error::InvalidCoreCount(core_count));
        }
        Ok(Self {
            core_count,
            native_temperatures: None,
            hardware_tree: None,
        })
    }

    /// Sets the native temperature map.
    pub fn with_native_temperatures(mut self, temperatures: Option<NativeTemperatureMap>) -> Self {
        self.native_temperatures = temperatures;
        self
    }

    /// Sets the external hardware tree.
    pub fn with_hardware_tree(mut self, tree: Option<Vec<HardwareNode>>) -> Self {
        self.hardware_tree = tree;
        self
    }

    /// Returns the declared core count.
    pub fn core_count(&self) -> usize {
        self.core_count
    }

    /// Iterates the CPU nodes of the hardware tree, in tree order.
    pub(crate) fn cpu_nodes(&self) -> impl Iterator<Item = &HardwareNode> {
        self.hardware_tree
            .iter()
            .flatten()
            .filter(|node| is_cpu_hardware(&node.hardware_type))
    }
}

/// Fixed-length per-core values; `None` marks a core with no reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoreValues(Vec<Option<f64>>);

impl CoreValues {
    /// Creates `core_count` empty slots.
    pub fn empty(core_count: usize) -> Self {
        Self(vec![None; core_count])
    }

    /// Stores a value; returns false if `index` is out of range.
    pub fn set(&mut self, index: usize, value: f64) -> bool {
        match self.0.get_mut(index) {
            Some(slot) => {
                *slot = Some(value);
                true
            }
            None => false,
        }
    }

    /// Returns the value for a core, if one was read.
    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Option<f64>] {
        &self.0
    }

    /// Iterates `(core, value)` for populated slots.
    pub fn populated(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.map(|v| (i, v)))
    }

    /// Number of populated slots.
    pub fn populated_count(&self) -> usize {
        self.0.iter().filter(|v| v.is_some()).count()
    }

    /// Renders the legacy form with [`MISSING_READING`] in empty slots.
    pub fn to_sentinel(&self) -> Vec<f64> {
        self.0
            .iter()
            .map(|v| v.unwrap_or(MISSING_READING))
            .collect()
    }
}

/// Denominator used for the average voltage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VoltageAverage {
    /// Divide by the declared core count; empty cores count as zero.
    #[default]
    DeclaredCores,
    /// Divide by the number of cores that reported a voltage.
    PopulatedCores,
}

/// Canonical CPU physical metrics for one cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CpuPhysicalMetrics {
    /// Degrees Celsius.
    pub temperature: Option<f64>,
    /// Which sensor produced the temperature.
    pub temperature_source: Option<TemperatureSource>,
    /// Watts.
    pub power_package: Option<f64>,
    /// Watts per core; `None` when the hardware tree is unavailable.
    pub power_per_core: Option<CoreValues>,
    /// Volts.
    pub voltage_average: Option<f64>,
    /// Volts per core.
    pub voltage_per_core: CoreValues,
}

/// Stateless CPU metrics aggregator.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuAggregator {
    voltage_average: VoltageAverage,
}

impl CpuAggregator {
    /// Creates an aggregator with the default averaging policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the voltage averaging policy.
    pub fn with_voltage_average(mut self, policy: VoltageAverage) -> Self {
        self.voltage_average = policy;
        self
    }

    /// Resolves every metric from the snapshot.
    pub fn aggregate(&self, snapshot: &CpuSensorSnapshot) -> CpuPhysicalMetrics {
        let (temperature, temperature_source) = match self.temperature(snapshot) {
            Some((value, source)) => (Some(value), Some(source)),
            None => (None, None),
        };
        let (voltage_average, voltage_per_core) = self.voltages(snapshot);

        CpuPhysicalMetrics {
            temperature,
            temperature_source,
            power_package: self.power_package(snapshot),
            power_per_core: self.power_per_core(snapshot),
            voltage_average,
            voltage_per_core,
        }
    }

    /// Resolves the CPU temperature and where it came from.
    pub fn temperature(&self, snapshot: &CpuSensorSnapshot) -> Option<(f64, TemperatureSource)> {
        temperature::resolve(snapshot)
    }

    /// Resolves the CPU package power.
    pub fn power_package(&self, snapshot: &CpuSensorSnapshot) -> Option<f64> {
        power::package(snapshot)
    }

    /// Resolves per-core power.
    pub fn power_per_core(&self, snapshot: &CpuSensorSnapshot) -> Option<CoreValues> {
        power::per_core(snapshot)
    }

    /// Resolves average and per-core voltage.
    pub fn voltages(&self, snapshot: &CpuSensorSnapshot) -> (Option<f64>, CoreValues) {
        voltage::resolve(snapshot, self.voltage_average)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SensorReading, TemperatureReading};

    fn ryzen_tree() -> Vec<HardwareNode> {
        vec![
            HardwareNode::new(
                "Motherboard",
                vec![SensorReading::new("Voltage", "Vcore", "/lpc/0/voltage/0", 9.9)],
            ),
            HardwareNode::new(
                "Cpu",
                vec![
                    SensorReading::new("Power", "Package", "/amdcpu/0/power/0", 88.0),
                    SensorReading::new("Power", "Core #1", "/amdcpu/0/power/1", 10.0),
                    SensorReading::new("Power", "Core #2", "/amdcpu/0/power/2", 12.0),
                    SensorReading::new("Voltage", "Core #1", "/amdcpu/0/voltage/0", 1.2),
                    SensorReading::new("Voltage", "Core #2", "/amdcpu/0/voltage/1", 1.1),
                    SensorReading::new(
                        "Temperature",
                        "Core (Tctl/Tdie)",
                        "/amdcpu/0/temperature/2",
                        65.0,
                    ),
                    SensorReading::new("Temperature", "Package", "/amdcpu/0/temperature/0", 62.5),
                ],
            ),
        ]
    }

    #[test]
    fn test_invalid_core_count() {
        assert!(matches!(
            CpuSensorSnapshot::new(0),
            Err(Error::InvalidCoreCount(0))
        ));
    }

    #[test]
    fn test_no_sources_is_fully_absent() {
        let snapshot = CpuSensorSnapshot::new(4).unwrap();
        let metrics = CpuAggregator::new().aggregate(&snapshot);

        assert_eq!(metrics.temperature, None);
        assert_eq!(metrics.temperature_source, None);
        assert_eq!(metrics.power_package, None);
        assert_eq!(metrics.power_per_core, None);
        assert_eq!(metrics.voltage_average, None);
        assert_eq!(metrics.voltage_per_core, CoreValues::empty(4));
        assert_eq!(metrics.voltage_per_core.to_sentinel(), vec![-1.0; 4]);
    }

    #[test]
    fn test_full_tree() {
        let snapshot = CpuSensorSnapshot::new(3)
            .unwrap()
            .with_hardware_tree(Some(ryzen_tree()));
        let metrics = CpuAggregator::new().aggregate(&snapshot);

        assert_eq!(metrics.temperature, Some(62.5));
        assert!(matches!(
            metrics.temperature_source,
            Some(TemperatureSource::HardwareTree { .. })
        ));
        assert_eq!(metrics.power_package, Some(88.0));
        let power = metrics.power_per_core.unwrap();
        assert_eq!(power.to_sentinel(), vec![-1.0, 10.0, 12.0]);
        assert_eq!(metrics.voltage_per_core.to_sentinel(), vec![1.2, 1.1, -1.0]);
        let average = metrics.voltage_average.unwrap();
        assert!((average - 2.3 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_per_core_lengths_match_core_count() {
        for cores in [1, 2, 8, 64] {
            let snapshot = CpuSensorSnapshot::new(cores)
                .unwrap()
                .with_hardware_tree(Some(ryzen_tree()));
            let metrics = CpuAggregator::new().aggregate(&snapshot);
            assert_eq!(metrics.power_per_core.unwrap().len(), cores);
            assert_eq!(metrics.voltage_per_core.len(), cores);
        }
    }

    #[test]
    fn test_idempotent() {
        let mut native = NativeTemperatureMap::new();
        native.insert("coretemp", TemperatureReading::new("Core 0", 48.0));
        let snapshot = CpuSensorSnapshot::new(2)
            .unwrap()
            .with_native_temperatures(Some(native))
            .with_hardware_tree(Some(ryzen_tree()));
        let aggregator = CpuAggregator::new();

        let first = aggregator.aggregate(&snapshot);
        let second = aggregator.aggregate(&snapshot);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_native_temperature_preferred_over_tree() {
        let mut native = NativeTemperatureMap::new();
        native.insert("k10temp", TemperatureReading::new("Tdie", 55.0));
        let snapshot = CpuSensorSnapshot::new(3)
            .unwrap()
            .with_native_temperatures(Some(native))
            .with_hardware_tree(Some(ryzen_tree()));
        let metrics = CpuAggregator::new().aggregate(&snapshot);
        assert_eq!(metrics.temperature, Some(55.0));
    }

    #[test]
    fn test_core_values() {
        let mut values = CoreValues::empty(3);
        assert!(values.set(0, 3.3));
        assert!(values.set(2, 1.1));
        assert!(!values.set(3, 9.0));
        assert_eq!(values.get(1), None);
        assert_eq!(values.populated_count(), 2);
        assert_eq!(values.populated().collect::<Vec<_>>(), vec![(0, 3.3), (2, 1.1)]);
        assert_eq!(values.to_sentinel(), vec![3.3, -1.0, 1.1]);
        assert_eq!(serde_json::to_string(&values).unwrap(), "[3.3,null,1.1]");
    }

    #[test]
    fn test_voltage_average_policy_from_config() {
        let policy: VoltageAverage = serde_json::from_str("\"populated-cores\"").unwrap();
        assert_eq!(policy, VoltageAverage::PopulatedCores);
        assert_eq!(VoltageAverage::default(), VoltageAverage::DeclaredCores);
    }
}
