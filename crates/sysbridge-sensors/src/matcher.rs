//! Sensor classification.
//!
//! Sensors are classified by case-insensitive substring rules over their
//! free-text type and name. Rules are plain data so their precedence can be
//! read (and tested) in one place.

use crate::model::{SensorReading, TemperatureReading};

/// Anything with a free-text type and name that rules can classify.
pub trait Classify {
    /// Sensor category, e.g. "Power".
    fn sensor_type(&self) -> &str;

    /// Sensor label, e.g. "CPU Package".
    fn sensor_name(&self) -> &str;
}

impl Classify for SensorReading {
    fn sensor_type(&self) -> &str {
        &self.sensor_type
    }

    fn sensor_name(&self) -> &str {
        &self.name
    }
}

impl Classify for TemperatureReading {
    fn sensor_type(&self) -> &str {
        "Temperature"
    }

    fn sensor_name(&self) -> &str {
        &self.label
    }
}

/// Semantic role assigned by a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorRole {
    PowerPackage,
    PowerCore,
    PowerNonPackage,
    Voltage,
    TemperaturePackageOrAverage,
}

/// Constraint on the uppercased sensor name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameRule {
    /// Any name.
    Any,
    /// Name contains at least one of these.
    ContainsAny(&'static [&'static str]),
    /// Name does not contain this.
    Excludes(&'static str),
}

/// A classification rule: type substring plus a name constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorRule {
    pub role: SensorRole,
    /// Uppercase substring required in the sensor type.
    pub sensor_type: &'static str,
    pub name: NameRule,
}

impl SensorRule {
    /// Returns true if the sensor satisfies this rule.
    pub fn matches<S: Classify + ?Sized>(&self, sensor: &S) -> bool {
        if !contains_upper(sensor.sensor_type(), self.sensor_type) {
            return false;
        }
        match self.name {
            NameRule::Any => true,
            NameRule::ContainsAny(needles) => needles
                .iter()
                .any(|needle| contains_upper(sensor.sensor_name(), needle)),
            NameRule::Excludes(needle) => !contains_upper(sensor.sensor_name(), needle),
        }
    }
}

pub const POWER_PACKAGE: SensorRule = SensorRule {
    role: SensorRole::PowerPackage,
    sensor_type: "POWER",
    name: NameRule::ContainsAny(&["PACKAGE"]),
};

pub const POWER_CORE: SensorRule = SensorRule {
    role: SensorRole::PowerCore,
    sensor_type: "POWER",
    name: NameRule::ContainsAny(&["CORE"]),
};

pub const POWER_NON_PACKAGE: SensorRule = SensorRule {
    role: SensorRole::PowerNonPackage,
    sensor_type: "POWER",
    name: NameRule::Excludes("PACKAGE"),
};

pub const VOLTAGE: SensorRule = SensorRule {
    role: SensorRole::Voltage,
    sensor_type: "VOLTAGE",
    name: NameRule::Any,
};

pub const TEMPERATURE_PACKAGE_OR_AVERAGE: SensorRule = SensorRule {
    role: SensorRole::TemperaturePackageOrAverage,
    sensor_type: "TEMPERATURE",
    name: NameRule::ContainsAny(&["PACKAGE", "AVERAGE"]),
};

/// All hardware-tree rules.
pub const RULES: &[SensorRule] = &[
    POWER_PACKAGE,
    POWER_CORE,
    POWER_NON_PACKAGE,
    VOLTAGE,
    TEMPERATURE_PACKAGE_OR_AVERAGE,
];

/// Native chips trusted for CPU temperature, in precedence order.
///
/// Within a chip the label needles are tried in order, each against every
/// reading, before moving on to the next needle. Label matching is
/// case-sensitive, as the kernel drivers report fixed labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChipRule {
    pub chip: &'static str,
    pub labels: &'static [&'static str],
}

pub const NATIVE_CPU_CHIPS: &[ChipRule] = &[
    ChipRule {
        chip: "k10temp",
        labels: &["Tdie", "Tctl", "Tccd1"],
    },
    ChipRule {
        chip: "coretemp",
        labels: &["Package id 0", "Physical id 0", "Core 0"],
    },
    ChipRule {
        chip: "atk0110",
        labels: &["CPU"],
    },
];

impl ChipRule {
    /// Returns the first reading matching the earliest label needle.
    pub fn find<'a>(&self, readings: &'a [TemperatureReading]) -> Option<&'a TemperatureReading> {
        self.labels
            .iter()
            .find_map(|needle| readings.iter().find(|r| r.label.contains(needle)))
    }
}

fn contains_upper(haystack: &str, needle: &str) -> bool {
    haystack.to_uppercase().contains(needle)
}

/// Returns true if the hardware node type denotes a CPU.
pub fn is_cpu_hardware(hardware_type: &str) -> bool {
    contains_upper(hardware_type, "CPU")
}

pub fn is_power_package<S: Classify + ?Sized>(sensor: &S) -> bool {
    POWER_PACKAGE.matches(sensor)
}

pub fn is_power_core<S: Classify + ?Sized>(sensor: &S) -> bool {
    POWER_CORE.matches(sensor)
}

pub fn is_power_non_package<S: Classify + ?Sized>(sensor: &S) -> bool {
    POWER_NON_PACKAGE.matches(sensor)
}

pub fn is_voltage<S: Classify + ?Sized>(sensor: &S) -> bool {
    VOLTAGE.matches(sensor)
}

pub fn is_temperature_package_or_average<S: Classify + ?Sized>(sensor: &S) -> bool {
    TEMPERATURE_PACKAGE_OR_AVERAGE.matches(sensor)
}

/// Returns the roles of every rule the sensor satisfies, in rule order.
pub fn classify<S: Classify + ?Sized>(sensor: &S) -> Vec<SensorRole> {
    RULES
        .iter()
        .filter(|rule| rule.matches(sensor))
        .map(|rule| rule.role)
        .collect()
}
