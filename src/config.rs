// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Process configuration.
//!
//! Configuration is loaded once at startup from environment variables and
//! validated into a [`Settings`] value. The controller and client only ever
//! see validated values; every parse or ordering failure is a
//! [`ConfigError`] raised before the monitoring loop starts.

use std::env;
use std::time::Duration;

use crate::controller::ChargePolicy;
use crate::error::ConfigError;
use crate::types::BatteryPercent;

/// Environment variable holding the cloud account email.
pub const ENV_EMAIL: &str = "TP_LINK_EMAIL";
/// Environment variable holding the cloud account password.
pub const ENV_PASSWORD: &str = "TP_LINK_PASSWORD";
/// Environment variable holding the optional device alias.
pub const ENV_DEVICE_ALIAS: &str = "TAPO_DEVICE_ALIAS";
/// Environment variable holding the start-charging threshold in percent.
pub const ENV_START_THRESHOLD: &str = "BATTERY_START_THRESHOLD";
/// Environment variable holding the stop-charging threshold in percent.
pub const ENV_STOP_THRESHOLD: &str = "BATTERY_STOP_THRESHOLD";
/// Environment variable holding the poll interval in seconds.
pub const ENV_CHECK_INTERVAL: &str = "BATTERY_CHECK_INTERVAL";

const DEFAULT_START_THRESHOLD: u8 = 40;
const DEFAULT_STOP_THRESHOLD: u8 = 80;
const DEFAULT_CHECK_INTERVAL_SECS: u64 = 60;

/// Cloud account credentials, passed through to the device client.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Account email address.
    pub email: String,
    /// Account password.
    pub password: String,
}

/// Validated process settings.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use chargectl::config::{Credentials, Settings};
/// use chargectl::controller::ChargePolicy;
/// use chargectl::types::BatteryPercent;
///
/// let policy = ChargePolicy::new(
///     BatteryPercent::new(40).unwrap(),
///     BatteryPercent::new(80).unwrap(),
/// ).unwrap();
///
/// let settings = Settings {
///     credentials: Credentials {
///         email: "user@example.com".into(),
///         password: "secret".into(),
///     },
///     device_alias: None,
///     policy,
///     check_interval: Duration::from_secs(60),
/// };
/// assert_eq!(settings.check_interval, Duration::from_secs(60));
/// ```
#[derive(Debug, Clone)]
pub struct Settings {
    /// Cloud account credentials.
    pub credentials: Credentials,
    /// Alias of the plug to control. `None` selects the first device on the
    /// account.
    pub device_alias: Option<String>,
    /// The hysteresis charge policy.
    pub policy: ChargePolicy,
    /// Wait between successive polls.
    pub check_interval: Duration,
}

impl Settings {
    /// Loads settings from the process environment.
    ///
    /// Thresholds default to 40%/80% and the interval to 60 seconds when the
    /// corresponding variables are unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if credentials are missing, a numeric variable
    /// does not parse, a threshold is out of range or mis-ordered, or the
    /// interval is zero.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let email = lookup(ENV_EMAIL).ok_or(ConfigError::MissingVariable(ENV_EMAIL))?;
        let password = lookup(ENV_PASSWORD).ok_or(ConfigError::MissingVariable(ENV_PASSWORD))?;
        let device_alias = lookup(ENV_DEVICE_ALIAS).filter(|s| !s.is_empty());

        let start = parse_percent(&lookup, ENV_START_THRESHOLD, DEFAULT_START_THRESHOLD)?;
        let stop = parse_percent(&lookup, ENV_STOP_THRESHOLD, DEFAULT_STOP_THRESHOLD)?;
        let policy = ChargePolicy::new(start, stop)?;

        let interval_secs = match lookup(ENV_CHECK_INTERVAL) {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                variable: ENV_CHECK_INTERVAL,
                value: raw,
            })?,
            None => DEFAULT_CHECK_INTERVAL_SECS,
        };
        if interval_secs == 0 {
            return Err(ConfigError::ZeroInterval);
        }

        Ok(Self {
            credentials: Credentials { email, password },
            device_alias,
            policy,
            check_interval: Duration::from_secs(interval_secs),
        })
    }
}

fn parse_percent<F>(
    lookup: &F,
    variable: &'static str,
    default: u8,
) -> Result<BatteryPercent, ConfigError>
where
    F: Fn(&'static str) -> Option<String>,
{
    let value = match lookup(variable) {
        Some(raw) => raw.trim().parse::<u8>().map_err(|_| ConfigError::InvalidValue {
            variable,
            value: raw,
        })?,
        None => default,
    };
    BatteryPercent::new(value)
}
