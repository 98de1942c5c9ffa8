// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Linux sysfs battery sensor.
//!
//! Reads the first `BAT*` supply under `/sys/class/power_supply` for the
//! charge level and the `Mains` supply for AC status. The sysfs root is
//! injectable so tests can run against a temp directory.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::SensorError;
use crate::sensor::BatterySensor;
use crate::types::BatteryPercent;

const POWER_SUPPLY_DIR: &str = "class/power_supply";

/// Battery sensor backed by Linux sysfs.
///
/// # Examples
///
/// ```no_run
/// use chargectl::sensor::{BatterySensor, SysfsBattery};
///
/// let sensor = SysfsBattery::new();
/// let level = sensor.percent()?;
/// println!("battery at {level}");
/// # Ok::<(), chargectl::error::SensorError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SysfsBattery {
    root: PathBuf,
}

impl SysfsBattery {
    /// Creates a sensor reading from the real `/sys` tree.
    #[must_use]
    pub fn new() -> Self {
        Self::with_root("/sys")
    }

    /// Creates a sensor rooted at an alternative sysfs path.
    #[must_use]
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Finds the first power supply whose name matches the predicate on name
    /// or whose `type` attribute matches the wanted type.
    fn find_supply(
        &self,
        name_prefix: &str,
        supply_type: &str,
    ) -> Result<Option<PathBuf>, SensorError> {
        let dir = self.root.join(POWER_SUPPLY_DIR);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SensorError::Io(e)),
        };

        let mut candidates: Vec<PathBuf> = Vec::new();
        for entry in entries {
            let entry = entry.map_err(SensorError::Io)?;
            candidates.push(entry.path());
        }
        // Deterministic pick when several supplies exist (BAT0 before BAT1).
        candidates.sort();

        for path in candidates {
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default();
            if name.starts_with(name_prefix) {
                return Ok(Some(path));
            }
            if read_attribute(&path, "type")?.as_deref() == Some(supply_type) {
                return Ok(Some(path));
            }
        }
        Ok(None)
    }
}

impl Default for SysfsBattery {
    fn default() -> Self {
        Self::new()
    }
}

impl BatterySensor for SysfsBattery {
    fn percent(&self) -> Result<BatteryPercent, SensorError> {
        let supply = self
            .find_supply("BAT", "Battery")?
            .ok_or(SensorError::NoBattery)?;

        let raw = read_attribute(&supply, "capacity")?.ok_or(SensorError::NoBattery)?;
        let value: u8 = raw.parse().map_err(|_| SensorError::InvalidReading {
            attribute: "capacity",
            value: raw.clone(),
        })?;
        // The kernel occasionally reports >100 during calibration; clamp
        // rather than fail the poll.
        BatteryPercent::new(value.min(BatteryPercent::MAX)).map_err(|_| {
            SensorError::InvalidReading {
                attribute: "capacity",
                value: raw,
            }
        })
    }

    fn ac_online(&self) -> Result<bool, SensorError> {
        let supply = self
            .find_supply("AC", "Mains")?
            .ok_or(SensorError::NoBattery)?;
        let raw = read_attribute(&supply, "online")?.unwrap_or_default();
        match raw.as_str() {
            "1" => Ok(true),
            "0" => Ok(false),
            _ => Err(SensorError::InvalidReading {
                attribute: "online",
                value: raw,
            }),
        }
    }
}

fn read_attribute(supply: &Path, attribute: &str) -> Result<Option<String>, SensorError> {
    match fs::read_to_string(supply.join(attribute)) {
        Ok(raw) => Ok(Some(raw.trim().to_string())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(SensorError::Io(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_supply(root: &Path, name: &str, attributes: &[(&str, &str)]) {
        let dir = root.join(POWER_SUPPLY_DIR).join(name);
        fs::create_dir_all(&dir).unwrap();
        for (attribute, value) in attributes {
            fs::write(dir.join(attribute), format!("{value}\n")).unwrap();
        }
    }

    #[test]
    fn reads_battery_capacity() {
        let tmp = TempDir::new().unwrap();
        make_supply(tmp.path(), "BAT0", &[("type", "Battery"), ("capacity", "73")]);

        let sensor = SysfsBattery::with_root(tmp.path());
        assert_eq!(sensor.percent().unwrap().value(), 73);
    }

    #[test]
    fn prefers_first_battery() {
        let tmp = TempDir::new().unwrap();
        make_supply(tmp.path(), "BAT1", &[("type", "Battery"), ("capacity", "10")]);
        make_supply(tmp.path(), "BAT0", &[("type", "Battery"), ("capacity", "55")]);

        let sensor = SysfsBattery::with_root(tmp.path());
        assert_eq!(sensor.percent().unwrap().value(), 55);
    }

    #[test]
    fn no_battery_on_desktop() {
        let tmp = TempDir::new().unwrap();
        make_supply(tmp.path(), "AC", &[("type", "Mains"), ("online", "1")]);

        let sensor = SysfsBattery::with_root(tmp.path());
        assert!(matches!(
            sensor.percent().unwrap_err(),
            SensorError::NoBattery
        ));
    }

    #[test]
    fn no_power_supply_dir() {
        let tmp = TempDir::new().unwrap();
        let sensor = SysfsBattery::with_root(tmp.path());
        assert!(matches!(
            sensor.percent().unwrap_err(),
            SensorError::NoBattery
        ));
    }

    #[test]
    fn invalid_capacity() {
        let tmp = TempDir::new().unwrap();
        make_supply(
            tmp.path(),
            "BAT0",
            &[("type", "Battery"), ("capacity", "charged")],
        );

        let sensor = SysfsBattery::with_root(tmp.path());
        assert!(matches!(
            sensor.percent().unwrap_err(),
            SensorError::InvalidReading {
                attribute: "capacity",
                ..
            }
        ));
    }

    #[test]
    fn ac_online_states() {
        let tmp = TempDir::new().unwrap();
        make_supply(tmp.path(), "AC", &[("type", "Mains"), ("online", "1")]);
        let sensor = SysfsBattery::with_root(tmp.path());
        assert!(sensor.ac_online().unwrap());

        let tmp = TempDir::new().unwrap();
        make_supply(tmp.path(), "ADP1", &[("type", "Mains"), ("online", "0")]);
        let sensor = SysfsBattery::with_root(tmp.path());
        assert!(!sensor.ac_online().unwrap());
    }
}
