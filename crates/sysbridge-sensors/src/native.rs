//! Native sensor provider backed by the Linux hwmon sysfs tree.
//!
//! Layout: `<root>/hwmonN/name` holds the chip name, `tempK_input` and
//! `fanK_input` hold readings (millidegrees Celsius and RPM), with optional
//! `tempK_label`, `tempK_max`, `tempK_crit` and `fanK_label` alongside.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::model::{FanReading, NativeFanMap, NativeTemperatureMap, TemperatureReading};

/// Default hwmon class directory.
pub const HWMON_ROOT: &str = "/sys/class/hwmon";

/// Reads native temperature and fan sensors.
#[derive(Debug, Clone)]
pub struct HwmonReader {
    root: PathBuf,
}

impl HwmonReader {
    /// Creates a reader rooted at `root`.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Returns the chip temperatures, or `None` if hwmon is unsupported here.
    pub fn temperatures(&self) -> Option<NativeTemperatureMap> {
        let mut map = NativeTemperatureMap::new();
        for (chip, dir) in self.chips()? {
            for (index, input) in Self::inputs(&dir, "temp") {
                let Some(millis) = read_number(&input) else {
                    continue;
                };
                let attr = |suffix: &str| dir.join(format!("temp{}_{}", index, suffix));
                map.insert(
                    &chip,
                    TemperatureReading {
                        label: read_trimmed(&attr("label")).unwrap_or_default(),
                        current: millis / 1000.0,
                        high: read_number(&attr("max")).map(|v| v / 1000.0),
                        critical: read_number(&attr("crit")).map(|v| v / 1000.0),
                    },
                );
            }
        }
        debug!("Read {} temperature chips from {:?}", map.len(), self.root);
        Some(map)
    }

    /// Returns the chip fan speeds, or `None` if hwmon is unsupported here.
    pub fn fans(&self) -> Option<NativeFanMap> {
        let mut map = NativeFanMap::new();
        for (chip, dir) in self.chips()? {
            for (index, input) in Self::inputs(&dir, "fan") {
                let Some(rpm) = read_trimmed(&input).and_then(|s| s.parse::<u64>().ok()) else {
                    continue;
                };
                map.insert(
                    &chip,
                    FanReading {
                        label: read_trimmed(&dir.join(format!("fan{}_label", index)))
                            .unwrap_or_default(),
                        current: rpm,
                    },
                );
            }
        }
        Some(map)
    }

    /// Lists `(chip name, directory)` ordered by hwmon number.
    fn chips(&self) -> Option<Vec<(String, PathBuf)>> {
        let entries = fs::read_dir(&self.root).ok()?;
        let mut chips: Vec<(u32, String, PathBuf)> = entries
            .flatten()
            .filter_map(|entry| {
                let file_name = entry.file_name().to_string_lossy().to_string();
                let number = file_name.strip_prefix("hwmon")?.parse().ok()?;
                let dir = entry.path();
                let name = read_trimmed(&dir.join("name"))?;
                Some((number, name, dir))
            })
            .collect();
        chips.sort_by_key(|(number, _, _)| *number);
        Some(chips.into_iter().map(|(_, name, dir)| (name, dir)).collect())
    }

    /// Lists `(index, path)` of `<kind>K_input` files ordered by K.
    fn inputs(dir: &Path, kind: &str) -> Vec<(u32, PathBuf)> {
        let Ok(entries) = fs::read_dir(dir) else {
            return Vec::new();
        };
        let mut inputs: Vec<(u32, PathBuf)> = entries
            .flatten()
            .filter_map(|entry| {
                let file_name = entry.file_name().to_string_lossy().to_string();
                let index = file_name
                    .strip_prefix(kind)?
                    .strip_suffix("_input")?
                    .parse()
                    .ok()?;
                Some((index, entry.path()))
            })
            .collect();
        inputs.sort_by_key(|(index, _)| *index);
        inputs
    }
}

impl Default for HwmonReader {
    fn default() -> Self {
        Self::new(HWMON_ROOT)
    }
}

fn read_trimmed(path: &Path) -> Option<String> {
    fs::read_to_string(path).ok().map(|s| s.trim().to_string())
}

fn read_number(path: &Path) -> Option<f64> {
    read_trimmed(path)?.parse().ok()
}
