//! CPU temperature resolution.
//!
//! Ordered fallback chain, first success wins:
//! 1. native vendor chips (`k10temp`, `coretemp`, `atk0110`), see
//!    [`NATIVE_CPU_CHIPS`];
//! 2. the first reading of the first native chip, flagged as unidentified;
//! 3. the first package/average temperature of a CPU node in the hardware tree.

use serde::Serialize;
use tracing::{debug, warn};

use super::CpuSensorSnapshot;
use crate::matcher::{is_temperature_package_or_average, NATIVE_CPU_CHIPS};

/// Provenance of a resolved temperature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum TemperatureSource {
    /// Known CPU sensor chip.
    Native { chip: String, label: String },
    /// First available native sensor; may not be the CPU.
    Unidentified { chip: String, label: String },
    /// CPU node of the external hardware tree.
    HardwareTree { hardware: String, sensor: String },
}

impl TemperatureSource {
    /// Returns true if the value came from an unidentified sensor.
    pub fn is_low_confidence(&self) -> bool {
        matches!(self, TemperatureSource::Unidentified { .. })
    }
}

pub(super) fn resolve(snapshot: &CpuSensorSnapshot) -> Option<(f64, TemperatureSource)> {
    if let Some(native) = &snapshot.native_temperatures {
        for rule in NATIVE_CPU_CHIPS {
            let Some(readings) = native.get(rule.chip) else {
                continue;
            };
            debug!("{}: {:?}", rule.chip, readings);
            if let Some(reading) = rule.find(readings) {
                debug!("Found CPU temperature ({}): {:?}", rule.chip, reading);
                return Some((
                    reading.current,
                    TemperatureSource::Native {
                        chip: rule.chip.to_string(),
                        label: reading.label.clone(),
                    },
                ));
            }
        }

        if let Some((chip, reading)) = native.first_reading() {
            warn!(
                "Unknown sensor used for CPU temperature (may not be correct): {} {:?}",
                chip, reading
            );
            return Some((
                reading.current,
                TemperatureSource::Unidentified {
                    chip: chip.to_string(),
                    label: reading.label.clone(),
                },
            ));
        }
    }

    for node in snapshot.cpu_nodes() {
        for sensor in &node.sensors {
            if !is_temperature_package_or_average(sensor) {
                continue;
            }
            match sensor.lenient_value() {
                Some(value) => {
                    debug!("Found CPU temperature: {} = {}", sensor.name, value);
                    return Some((
                        value,
                        TemperatureSource::HardwareTree {
                            hardware: node.name.clone(),
                            sensor: sensor.name.clone(),
                        },
                    ));
                }
                None if sensor.has_value() => {
                    debug!("Ignoring non-numeric temperature {}: {:?}", sensor.name, sensor.value);
                }
                None => {}
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HardwareNode, NativeTemperatureMap, SensorReading, TemperatureReading};
    use serde_json::Value;

    fn snapshot(
        native: Option<NativeTemperatureMap>,
        tree: Option<Vec<HardwareNode>>,
    ) -> CpuSensorSnapshot {
        CpuSensorSnapshot::new(4)
            .unwrap()
            .with_native_temperatures(native)
            .with_hardware_tree(tree)
    }

    fn native(entries: &[(&str, &str, f64)]) -> NativeTemperatureMap {
        entries
            .iter()
            .map(|(chip, label, value)| (chip.to_string(), TemperatureReading::new(label, *value)))
            .collect()
    }

    #[test]
    fn test_k10temp_wins_over_coretemp() {
        let map = native(&[
            ("coretemp", "Package id 0", 40.0),
            ("k10temp", "Tctl", 71.0),
            ("k10temp", "Tdie", 61.0),
        ]);
        let (value, source) = resolve(&snapshot(Some(map), None)).unwrap();
        assert_eq!(value, 61.0);
        assert_eq!(
            source,
            TemperatureSource::Native {
                chip: "k10temp".into(),
                label: "Tdie".into()
            }
        );
    }

    #[test]
    fn test_k10temp_tccd1() {
        let map = native(&[("k10temp", "Tccd2", 50.0), ("k10temp", "Tccd1", 52.0)]);
        let (value, _) = resolve(&snapshot(Some(map), None)).unwrap();
        assert_eq!(value, 52.0);
    }

    #[test]
    fn test_coretemp_labels() {
        let map = native(&[
            ("coretemp", "Core 1", 47.0),
            ("coretemp", "Core 0", 45.0),
            ("coretemp", "Package id 0", 49.0),
        ]);
        let (value, _) = resolve(&snapshot(Some(map), None)).unwrap();
        assert_eq!(value, 49.0);
    }

    #[test]
    fn test_atk0110() {
        let map = native(&[
            ("atk0110", "MB Temperature", 35.0),
            ("atk0110", "CPU Temperature", 44.0),
        ]);
        let (value, _) = resolve(&snapshot(Some(map), None)).unwrap();
        assert_eq!(value, 44.0);
    }

    #[test]
    fn test_unidentified_fallback_uses_first_chip() {
        let mut map = NativeTemperatureMap::new();
        map.insert("acpitz", TemperatureReading::new("acpitz", 27.8));
        map.insert("nvme", TemperatureReading::new("Composite", 38.9));
        let (value, source) = resolve(&snapshot(Some(map), None)).unwrap();
        assert_eq!(value, 27.8);
        assert!(source.is_low_confidence());
    }

    #[test]
    fn test_unmatched_vendor_chip_falls_back() {
        let map = native(&[("nvme", "Composite", 38.0), ("k10temp", "Tccd3", 50.0)]);
        let (value, source) = resolve(&snapshot(Some(map), None)).unwrap();
        assert_eq!(value, 38.0);
        assert!(source.is_low_confidence());
    }

    #[test]
    fn test_empty_native_map_uses_tree() {
        let tree = vec![HardwareNode::new(
            "Cpu",
            vec![SensorReading::new(
                "Temperature",
                "Core Average",
                "/intelcpu/0/temperature/9",
                57.0,
            )],
        )];
        let snapshot = snapshot(Some(NativeTemperatureMap::new()), Some(tree));
        let (value, source) = resolve(&snapshot).unwrap();
        assert_eq!(value, 57.0);
        assert!(!source.is_low_confidence());
    }

    #[test]
    fn test_tree_skips_non_cpu_and_mismatched_values() {
        let tree = vec![
            HardwareNode::new(
                "GpuNvidia",
                vec![SensorReading::new(
                    "Temperature",
                    "GPU Package",
                    "/gpu/0/temperature/0",
                    70.0,
                )],
            ),
            HardwareNode::new(
                "Cpu",
                vec![
                    SensorReading::with_raw_value(
                        "Temperature",
                        "CPU Package",
                        "/intelcpu/0/temperature/0",
                        Some(Value::Bool(false)),
                    ),
                    SensorReading::with_raw_value(
                        "Temperature",
                        "Core Average",
                        "/intelcpu/0/temperature/1",
                        Some(Value::String("58.5".into())),
                    ),
                ],
            ),
        ];
        let (value, _) = resolve(&snapshot(None, Some(tree))).unwrap();
        assert_eq!(value, 58.5);
    }

    #[test]
    fn test_nothing_available() {
        assert!(resolve(&snapshot(None, None)).is_none());
        assert!(resolve(&snapshot(None, Some(vec![]))).is_none());
    }
}
