//! Sensor tree model.
//!
//! Two read-only shapes feed the aggregator:
//! - the external hardware-monitor tree (hardware nodes holding free-text
//!   typed sensor readings), decoded from JSON;
//! - the native per-chip maps reported by the operating system.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Leaf of the external hardware tree.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SensorReading {
    /// Free-text category, e.g. "Temperature", "Power", "Voltage".
    #[serde(rename = "type", default)]
    pub sensor_type: String,

    /// Free-text label, e.g. "CPU Package", "Core #1".
    #[serde(default)]
    pub name: String,

    /// Slash-delimited path such as `/amdcpu/0/voltage/16`.
    #[serde(default, alias = "id")]
    pub identifier: String,

    /// Raw value as reported; may be null, a number, or occasionally a string.
    #[serde(default)]
    pub value: Option<Value>,
}

impl SensorReading {
    /// Creates a reading with a numeric value.
    pub fn new(sensor_type: &str, name: &str, identifier: &str, value: f64) -> Self {
        Self {
            sensor_type: sensor_type.to_string(),
            name: name.to_string(),
            identifier: identifier.to_string(),
            value: serde_json::Number::from_f64(value).map(Value::Number),
        }
    }

    /// Creates a reading carrying an arbitrary raw value.
    pub fn with_raw_value(
        sensor_type: &str,
        name: &str,
        identifier: &str,
        value: Option<Value>,
    ) -> Self {
        Self {
            sensor_type: sensor_type.to_string(),
            name: name.to_string(),
            identifier: identifier.to_string(),
            value,
        }
    }

    /// Returns true if the reading carries any non-null value.
    pub fn has_value(&self) -> bool {
        !matches!(self.value, None | Some(Value::Null))
    }

    /// Returns the value if it is a JSON number.
    pub fn numeric_value(&self) -> Option<f64> {
        match &self.value {
            Some(Value::Number(n)) => n.as_f64(),
            _ => None,
        }
    }

    /// Returns the value if it is a number or a string holding one.
    pub fn lenient_value(&self) -> Option<f64> {
        match &self.value {
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => self.numeric_value(),
        }
    }
}

/// Branch of the external hardware tree.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HardwareNode {
    /// Subsystem category, e.g. "CPU", "GPU", "Motherboard".
    #[serde(rename = "type", default)]
    pub hardware_type: String,

    /// Product name, e.g. "AMD Ryzen 7 5800X".
    #[serde(default)]
    pub name: String,

    /// Sensors in reporting order.
    #[serde(default)]
    pub sensors: Vec<SensorReading>,
}

impl HardwareNode {
    /// Creates a hardware node from its type and sensors.
    pub fn new(hardware_type: &str, sensors: Vec<SensorReading>) -> Self {
        Self {
            hardware_type: hardware_type.to_string(),
            name: String::new(),
            sensors,
        }
    }
}

/// Top-level document emitted by the external hardware monitor.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HardwareTree {
    #[serde(default)]
    pub hardware: Option<Vec<HardwareNode>>,
}

impl HardwareTree {
    /// Decodes a hardware monitor document.
    pub fn from_slice(bytes: &[u8]) -> crate::Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Returns the hardware nodes, or `None` when the document carried none.
    pub fn into_nodes(self) -> Option<Vec<HardwareNode>> {
        self.hardware
    }
}

/// One native temperature entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureReading {
    pub label: String,
    /// Degrees Celsius.
    pub current: f64,
    pub high: Option<f64>,
    pub critical: Option<f64>,
}

impl TemperatureReading {
    /// Creates a reading with no thresholds.
    pub fn new(label: &str, current: f64) -> Self {
        Self {
            label: label.to_string(),
            current,
            high: None,
            critical: None,
        }
    }
}

/// One native fan entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FanReading {
    pub label: String,
    /// Revolutions per minute.
    pub current: u64,
}

/// Readings reported by one sensor chip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chip<R> {
    /// Platform chip name, e.g. "k10temp", "coretemp".
    pub name: String,
    pub readings: Vec<R>,
}

pub type TemperatureChip = Chip<TemperatureReading>;
pub type FanChip = Chip<FanReading>;

/// Chip name to readings, kept in insertion order.
///
/// Iteration order is the order chips were first inserted. The temperature
/// fallback relies on this to pick "the first chip".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChipMap<R> {
    chips: Vec<Chip<R>>,
}

pub type NativeTemperatureMap = ChipMap<TemperatureReading>;
pub type NativeFanMap = ChipMap<FanReading>;

impl<R> Default for ChipMap<R> {
    fn default() -> Self {
        Self { chips: Vec::new() }
    }
}

impl<R> ChipMap<R> {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a reading to `chip`, creating the chip at the end if unseen.
    pub fn insert(&mut self, chip: &str, reading: R) {
        match self.chips.iter_mut().find(|c| c.name == chip) {
            Some(existing) => existing.readings.push(reading),
            None => self.chips.push(Chip {
                name: chip.to_string(),
                readings: vec![reading],
            }),
        }
    }

    /// Returns the readings of a chip by exact name.
    pub fn get(&self, chip: &str) -> Option<&[R]> {
        self.chips
            .iter()
            .find(|c| c.name == chip)
            .map(|c| c.readings.as_slice())
    }

    /// Returns true if the chip is present.
    pub fn contains(&self, chip: &str) -> bool {
        self.get(chip).is_some()
    }

    /// Iterates chips in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Chip<R>> {
        self.chips.iter()
    }

    /// Returns the first reading of the first chip that has any.
    pub fn first_reading(&self) -> Option<(&str, &R)> {
        self.chips
            .iter()
            .find_map(|c| c.readings.first().map(|r| (c.name.as_str(), r)))
    }

    /// Number of chips.
    pub fn len(&self) -> usize {
        self.chips.len()
    }

    /// Returns true if no chips were reported.
    pub fn is_empty(&self) -> bool {
        self.chips.is_empty()
    }
}

impl<R> FromIterator<(String, R)> for ChipMap<R> {
    fn from_iter<I: IntoIterator<Item = (String, R)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (chip, reading) in iter {
            map.insert(&chip, reading);
        }
        map
    }
}
