// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Power state of a smart plug.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// The power state of a smart plug relay.
///
/// An unknown state (before the first successful read, or after a failed
/// command) is represented as `Option<PlugState>` = `None` by callers.
///
/// # Examples
///
/// ```
/// use chargectl::types::PlugState;
///
/// assert_eq!(PlugState::On.as_str(), "ON");
/// assert_eq!("off".parse::<PlugState>().unwrap(), PlugState::Off);
/// assert_eq!(PlugState::from(true), PlugState::On);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlugState {
    /// The relay is off; the charger is not energized.
    Off,
    /// The relay is on; the charger is energized.
    On,
}

impl PlugState {
    /// Returns the display string for this state.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "OFF",
            Self::On => "ON",
        }
    }

    /// Returns the relay state value used by the vendor protocol.
    #[must_use]
    pub const fn as_relay_value(&self) -> u8 {
        match self {
            Self::Off => 0,
            Self::On => 1,
        }
    }

    /// Returns the opposite state.
    #[must_use]
    pub const fn inverted(&self) -> Self {
        match self {
            Self::Off => Self::On,
            Self::On => Self::Off,
        }
    }
}

impl fmt::Display for PlugState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PlugState {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "OFF" | "0" | "FALSE" => Ok(Self::Off),
            "ON" | "1" | "TRUE" => Ok(Self::On),
            _ => Err(ConfigError::InvalidValue {
                variable: "plug state",
                value: s.to_string(),
            }),
        }
    }
}

impl From<bool> for PlugState {
    fn from(value: bool) -> Self {
        if value { Self::On } else { Self::Off }
    }
}
