// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Hysteresis charge policy.
//!
//! Two thresholds instead of one: charge when the battery drops to the start
//! threshold, stop when it reaches the stop threshold, and do nothing in the
//! band between them. The deadband is what prevents the plug from chattering
//! on and off while the battery hovers near a single threshold.

use std::fmt;

use crate::error::ConfigError;
use crate::types::{BatteryPercent, PlugState};

/// The action a policy evaluation asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Energize the plug and start charging.
    TurnOn,
    /// De-energize the plug and stop charging.
    TurnOff,
    /// Leave the plug as it is.
    NoOp,
}

impl Action {
    /// Returns the plug state this action drives toward, if any.
    #[must_use]
    pub const fn target_state(&self) -> Option<PlugState> {
        match self {
            Self::TurnOn => Some(PlugState::On),
            Self::TurnOff => Some(PlugState::Off),
            Self::NoOp => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::TurnOn => "turn on",
            Self::TurnOff => "turn off",
            Self::NoOp => "no-op",
        };
        write!(f, "{s}")
    }
}

/// The outcome of a policy evaluation: an action and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    /// What to do with the plug.
    pub action: Action,
    /// Human-readable explanation of the decision.
    pub reason: String,
}

/// A validated pair of charge thresholds.
///
/// # Examples
///
/// ```
/// use chargectl::controller::{Action, ChargePolicy};
/// use chargectl::types::BatteryPercent;
///
/// let policy = ChargePolicy::new(
///     BatteryPercent::new(40).unwrap(),
///     BatteryPercent::new(80).unwrap(),
/// ).unwrap();
///
/// let decision = policy.evaluate(BatteryPercent::new(35).unwrap(), None);
/// assert_eq!(decision.action, Action::TurnOn);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChargePolicy {
    start_threshold: BatteryPercent,
    stop_threshold: BatteryPercent,
}

impl ChargePolicy {
    /// Creates a policy from a start (charge-below) and stop (charge-above)
    /// threshold.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ThresholdOrder` unless `start < stop`.
    pub fn new(
        start_threshold: BatteryPercent,
        stop_threshold: BatteryPercent,
    ) -> Result<Self, ConfigError> {
        if start_threshold >= stop_threshold {
            return Err(ConfigError::ThresholdOrder {
                start: start_threshold.value(),
                stop: stop_threshold.value(),
            });
        }
        Ok(Self {
            start_threshold,
            stop_threshold,
        })
    }

    /// Returns the start-charging threshold.
    #[must_use]
    pub const fn start_threshold(&self) -> BatteryPercent {
        self.start_threshold
    }

    /// Returns the stop-charging threshold.
    #[must_use]
    pub const fn stop_threshold(&self) -> BatteryPercent {
        self.stop_threshold
    }

    /// Evaluates the policy for a battery reading and the current plug state.
    ///
    /// Pure function of its inputs: at or below the start threshold the plug
    /// should be on, at or above the stop threshold it should be off, and in
    /// between the current state is preserved regardless of what it is.
    #[must_use]
    pub fn evaluate(&self, battery: BatteryPercent, current: Option<PlugState>) -> Decision {
        if battery <= self.start_threshold {
            Decision {
                action: Action::TurnOn,
                reason: format!(
                    "battery at {battery} (<= {}), charging should be on",
                    self.start_threshold
                ),
            }
        } else if battery >= self.stop_threshold {
            Decision {
                action: Action::TurnOff,
                reason: format!(
                    "battery at {battery} (>= {}), charging should be off",
                    self.stop_threshold
                ),
            }
        } else {
            let held = match current {
                Some(state) => format!("plug stays {state}"),
                None => "plug state unknown, leaving it alone".to_string(),
            };
            Decision {
                action: Action::NoOp,
                reason: format!(
                    "battery at {battery} (between {} and {}), {held}",
                    self.start_threshold, self.stop_threshold
                ),
            }
        }
    }
}
