// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Battery charge percentage.

use std::fmt;

use crate::error::ConfigError;

/// A battery charge level in percent, validated to the range 0-100.
///
/// Used both for sensor readings and for the charge policy thresholds.
///
/// # Examples
///
/// ```
/// use chargectl::types::BatteryPercent;
///
/// let level = BatteryPercent::new(42).unwrap();
/// assert_eq!(level.value(), 42);
/// assert!(BatteryPercent::new(101).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BatteryPercent(u8);

impl BatteryPercent {
    /// Maximum valid percentage.
    pub const MAX: u8 = 100;

    /// Creates a new battery percentage.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::PercentOutOfRange` if the value exceeds 100.
    pub fn new(percent: u8) -> Result<Self, ConfigError> {
        if percent > Self::MAX {
            return Err(ConfigError::PercentOutOfRange {
                actual: u16::from(percent),
            });
        }
        Ok(Self(percent))
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Returns `true` if the battery is completely full.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.0 == Self::MAX
    }
}

impl fmt::Display for BatteryPercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl TryFrom<u8> for BatteryPercent {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_range() {
        for p in [0, 1, 40, 80, 100] {
            let level = BatteryPercent::new(p).unwrap();
            assert_eq!(level.value(), p);
        }
    }

    #[test]
    fn rejects_out_of_range() {
        let result = BatteryPercent::new(101);
        assert_eq!(
            result.unwrap_err(),
            ConfigError::PercentOutOfRange { actual: 101 }
        );
    }

    #[test]
    fn ordering() {
        let low = BatteryPercent::new(40).unwrap();
        let high = BatteryPercent::new(80).unwrap();
        assert!(low < high);
    }

    #[test]
    fn display() {
        assert_eq!(BatteryPercent::new(73).unwrap().to_string(), "73%");
    }

    #[test]
    fn is_full() {
        assert!(BatteryPercent::new(100).unwrap().is_full());
        assert!(!BatteryPercent::new(99).unwrap().is_full());
    }
}
