//! CPU power resolution from the external hardware tree.

use tracing::debug;

use super::{CoreValues, CpuSensorSnapshot};
use crate::index::core_slot;
use crate::matcher::{is_power_core, is_power_non_package, is_power_package};

/// First numeric package power reading of any CPU node.
pub(super) fn package(snapshot: &CpuSensorSnapshot) -> Option<f64> {
    for node in snapshot.cpu_nodes() {
        for sensor in &node.sensors {
            if !is_power_package(sensor) {
                continue;
            }
            if let Some(value) = sensor.numeric_value() {
                debug!("Found CPU package power: {} = {}", sensor.name, value);
                return Some(value);
            }
        }
    }
    None
}

/// Per-core power.
///
/// A node reports per-core power only if it has a populated core power
/// sensor. Once triggered, every non-package power sensor of that node is
/// placed by the index in its identifier.
pub(super) fn per_core(snapshot: &CpuSensorSnapshot) -> Option<CoreValues> {
    snapshot.hardware_tree.as_ref()?;

    let core_count = snapshot.core_count();
    let mut powers = CoreValues::empty(core_count);

    for node in snapshot.cpu_nodes() {
        let Some(trigger) = node
            .sensors
            .iter()
            .find(|s| is_power_core(*s) && s.has_value())
        else {
            continue;
        };
        debug!(
            "Found CPU core power: {} ({}) = {:?}",
            trigger.name, trigger.identifier, trigger.value
        );

        for sensor in node.sensors.iter().filter(|s| is_power_non_package(*s)) {
            let Some(value) = sensor.numeric_value() else {
                continue;
            };
            if let Some(index) = core_slot(&sensor.identifier, core_count) {
                debug!(
                    "CPU power: {} ({}) = {}",
                    sensor.name, sensor.identifier, value
                );
                powers.set(index, value);
            }
        }
    }

    Some(powers)
}
