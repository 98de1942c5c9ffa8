// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The polling loop around the charge policy.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::client::PlugClient;
use crate::controller::{Action, ChargePolicy};
use crate::sensor::BatterySensor;
use crate::types::{BatteryPercent, PlugState};

/// What a single poll step did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// A command was issued and acknowledged.
    Commanded {
        /// The state the plug was switched to.
        state: PlugState,
        /// Why the command was issued.
        reason: String,
    },
    /// No command was needed; the plug already matches the policy.
    Held {
        /// Why nothing was done.
        reason: String,
    },
    /// The battery could not be read; the poll was skipped.
    SensorUnavailable,
    /// A command was issued but failed; the recorded state is now unknown.
    CommandFailed,
}

/// Drives a plug from battery readings on a fixed interval.
///
/// The monitor owns all mutable state: the last commanded plug state
/// (`None` until the first successful read or command, and again after any
/// command failure) and the last observed battery level. Nothing is
/// persisted; on startup the state is rebuilt from what the device reports.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use tokio_util::sync::CancellationToken;
/// use chargectl::client::{CloudClient, CloudConfig};
/// use chargectl::config::Credentials;
/// use chargectl::controller::{ChargeMonitor, ChargePolicy};
/// use chargectl::sensor::SysfsBattery;
/// use chargectl::types::BatteryPercent;
///
/// # async fn example() -> chargectl::error::Result<()> {
/// let policy = ChargePolicy::new(
///     BatteryPercent::new(40)?,
///     BatteryPercent::new(80)?,
/// )?;
/// let client = CloudConfig::new(Credentials {
///     email: "user@example.com".into(),
///     password: "secret".into(),
/// })
/// .into_client()?;
///
/// let mut monitor = ChargeMonitor::new(
///     client,
///     SysfsBattery::new(),
///     policy,
///     Duration::from_secs(60),
/// );
/// monitor.run(CancellationToken::new()).await;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ChargeMonitor<C, S> {
    client: C,
    sensor: S,
    policy: ChargePolicy,
    check_interval: Duration,
    commanded: Option<PlugState>,
    last_battery: Option<BatteryPercent>,
}

impl<C: PlugClient, S: BatterySensor> ChargeMonitor<C, S> {
    /// Creates a monitor. State starts unknown.
    #[must_use]
    pub fn new(client: C, sensor: S, policy: ChargePolicy, check_interval: Duration) -> Self {
        Self {
            client,
            sensor,
            policy,
            check_interval,
            commanded: None,
            last_battery: None,
        }
    }

    /// Returns the last commanded plug state, if known.
    #[must_use]
    pub fn commanded_state(&self) -> Option<PlugState> {
        self.commanded
    }

    /// Returns the last observed battery level, if any.
    #[must_use]
    pub fn last_battery(&self) -> Option<BatteryPercent> {
        self.last_battery
    }

    /// Runs one poll step: read the battery, decide, and command the plug if
    /// the decision differs from the recorded state.
    ///
    /// Never fails: sensor and client errors are surfaced as warnings and
    /// reflected in the returned [`TickOutcome`], and the next scheduled poll
    /// retries.
    pub async fn tick(&mut self) -> TickOutcome {
        let battery = match self.sensor.percent() {
            Ok(level) => level,
            Err(e) => {
                warn!(error = %e, "skipping poll, battery unavailable");
                return TickOutcome::SensorUnavailable;
            }
        };
        self.last_battery = Some(battery);

        // Rebuild from the device's reported state when ours is unknown
        // (startup, or after a failed command). A failed read just leaves it
        // unknown for this round.
        if self.commanded.is_none() {
            match self.client.power_state().await {
                Ok(state) => {
                    self.commanded = state;
                    debug!(state = ?state, "refreshed plug state");
                }
                Err(e) => warn!(error = %e, "could not read plug state"),
            }
        }

        let decision = self.policy.evaluate(battery, self.commanded);
        debug!(battery = %battery, action = %decision.action, "{}", decision.reason);

        let target = match decision.action {
            Action::NoOp => {
                return TickOutcome::Held {
                    reason: decision.reason,
                };
            }
            Action::TurnOn => PlugState::On,
            Action::TurnOff => PlugState::Off,
        };

        if self.commanded == Some(target) {
            // Same directional crossing as a previous tick; nothing to send.
            return TickOutcome::Held {
                reason: format!("plug already {target}: {}", decision.reason),
            };
        }

        match self.client.set_power(target).await {
            Ok(()) => {
                info!(battery = %battery, plug = %target, "{}", decision.reason);
                self.commanded = Some(target);
                TickOutcome::Commanded {
                    state: target,
                    reason: decision.reason,
                }
            }
            Err(e) => {
                warn!(error = %e, plug = %target, "plug command failed, will retry next poll");
                self.commanded = None;
                TickOutcome::CommandFailed
            }
        }
    }

    /// Runs the poll loop until the token is cancelled.
    ///
    /// Cancellation is observed during the inter-poll sleep, so shutdown
    /// never waits out a full extra interval.
    pub async fn run(&mut self, cancel: CancellationToken) {
        info!(
            start = %self.policy.start_threshold(),
            stop = %self.policy.stop_threshold(),
            interval_secs = self.check_interval.as_secs(),
            "starting charge monitor"
        );
        loop {
            if cancel.is_cancelled() {
                break;
            }
            self.tick().await;
            tokio::select! {
                () = cancel.cancelled() => break,
                () = tokio::time::sleep(self.check_interval) => {}
            }
        }
        info!("charge monitor stopped");
    }
}
