//! CPU voltage resolution from the external hardware tree.

use tracing::debug;

use super::{CoreValues, CpuSensorSnapshot, VoltageAverage};
use crate::index::core_slot;
use crate::matcher::is_voltage;
use crate::model::SensorReading;

/// Returns `(average, per_core)`.
///
/// Per-core slots are filled by identifier index, later readings overwriting
/// earlier ones. The average is the positive sum of populated slots divided
/// per `policy`; with no positive sum it falls back to the first collected
/// voltage, placed or not.
pub(super) fn resolve(
    snapshot: &CpuSensorSnapshot,
    policy: VoltageAverage,
) -> (Option<f64>, CoreValues) {
    let core_count = snapshot.core_count();
    let mut voltages = CoreValues::empty(core_count);

    let collected: Vec<(&SensorReading, f64)> = snapshot
        .cpu_nodes()
        .flat_map(|node| node.sensors.iter())
        .filter(|sensor| is_voltage(*sensor))
        .filter_map(|sensor| sensor.numeric_value().map(|value| (sensor, value)))
        .collect();

    let Some(&(_, first)) = collected.first() else {
        return (None, voltages);
    };

    for (sensor, value) in &collected {
        debug!(
            "Found CPU voltage: {} ({}) = {}",
            sensor.name, sensor.identifier, value
        );
        if let Some(index) = core_slot(&sensor.identifier, core_count) {
            voltages.set(index, *value);
        }
    }

    let sum: f64 = voltages.populated().map(|(_, v)| v).sum();
    let average = if sum > 0.0 {
        let divisor = match policy {
            VoltageAverage::DeclaredCores => core_count,
            VoltageAverage::PopulatedCores => voltages.populated_count(),
        };
        sum / divisor as f64
    } else {
        debug!("No positive per-core voltage, using first reading {}", first);
        first
    };

    (Some(average), voltages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HardwareNode;

    fn snapshot(cores: usize, sensors: Vec<SensorReading>) -> CpuSensorSnapshot {
        CpuSensorSnapshot::new(cores)
            .unwrap()
            .with_hardware_tree(Some(vec![HardwareNode::new("Cpu", sensors)]))
    }

    fn volt(identifier: &str, value: f64) -> SensorReading {
        SensorReading::new("Voltage", "Core", identifier, value)
    }

    #[test]
    fn test_average_over_declared_cores() {
        let snapshot = snapshot(
            3,
            vec![volt("/amdcpu/0/voltage/0", 3.3), volt("/amdcpu/0/voltage/2", 1.1)],
        );
        let (average, per_core) = resolve(&snapshot, VoltageAverage::DeclaredCores);
        assert_eq!(per_core.to_sentinel(), vec![3.3, -1.0, 1.1]);
        assert!((average.unwrap() - 1.4666666).abs() < 1e-6);
    }

    #[test]
    fn test_average_over_populated_cores() {
        let snapshot = snapshot(
            3,
            vec![volt("/amdcpu/0/voltage/0", 3.3), volt("/amdcpu/0/voltage/2", 1.1)],
        );
        let (average, _) = resolve(&snapshot, VoltageAverage::PopulatedCores);
        assert!((average.unwrap() - 2.2).abs() < 1e-9);
    }

    #[test]
    fn test_fallback_to_first_unplaced_reading() {
        let snapshot = snapshot(
            2,
            vec![volt("/amdcpu/0/voltage/16", 1.35), volt("/amdcpu/0/voltage/abc", 1.2)],
        );
        let (average, per_core) = resolve(&snapshot, VoltageAverage::DeclaredCores);
        assert_eq!(average, Some(1.35));
        assert_eq!(per_core, CoreValues::empty(2));
    }

    #[test]
    fn test_zero_readings_fall_back() {
        let snapshot = snapshot(
            2,
            vec![volt("/amdcpu/0/voltage/0", 0.0), volt("/amdcpu/0/voltage/1", 0.0)],
        );
        let (average, per_core) = resolve(&snapshot, VoltageAverage::DeclaredCores);
        assert_eq!(average, Some(0.0));
        assert_eq!(per_core.to_sentinel(), vec![0.0, 0.0]);
    }

    #[test]
    fn test_last_write_wins() {
        let snapshot = snapshot(
            1,
            vec![volt("/amdcpu/0/voltage/0", 1.0), volt("/amdcpu/0/voltage/0", 1.25)],
        );
        let (average, per_core) = resolve(&snapshot, VoltageAverage::DeclaredCores);
        assert_eq!(per_core.get(0), Some(1.25));
        assert_eq!(average, Some(1.25));
    }

    #[test]
    fn test_null_values_not_collected() {
        let snapshot = snapshot(
            2,
            vec![
                SensorReading::with_raw_value("Voltage", "Core", "/amdcpu/0/voltage/0", None),
                SensorReading::new("Power", "Core", "/amdcpu/0/power/0", 4.0),
            ],
        );
        let (average, per_core) = resolve(&snapshot, VoltageAverage::DeclaredCores);
        assert_eq!(average, None);
        assert_eq!(per_core.len(), 2);
    }

    #[test]
    fn test_no_tree() {
        let snapshot = CpuSensorSnapshot::new(3).unwrap();
        let (average, per_core) = resolve(&snapshot, VoltageAverage::DeclaredCores);
        assert_eq!(average, None);
        assert_eq!(per_core.to_sentinel(), vec![-1.0; 3]);
    }
}
