// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for `chargectl`.
//!
//! This module provides the error hierarchy for the crate: configuration
//! validation, host battery sensor access, and cloud device communication.
//!
//! Only [`ConfigError`] is fatal; it is raised before the monitoring loop
//! starts. Sensor and client errors are recoverable — the loop surfaces them
//! as warnings and retries on the next scheduled poll.

use thiserror::Error;

/// The main error type for this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or missing configuration. Fatal at startup.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Host battery sensor failure.
    #[error("sensor error: {0}")]
    Sensor(#[from] SensorError),

    /// Cloud device client failure.
    #[error("client error: {0}")]
    Client(#[from] ClientError),
}

/// Errors raised while building or validating configuration.
///
/// Any of these prevents the monitoring loop from starting.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("missing environment variable: {0}")]
    MissingVariable(&'static str),

    /// An environment variable could not be parsed.
    #[error("invalid value for {variable}: {value:?}")]
    InvalidValue {
        /// The variable that failed to parse.
        variable: &'static str,
        /// The raw value that was provided.
        value: String,
    },

    /// A percentage value is outside the allowed range.
    #[error("percentage {actual} is out of range [0, 100]")]
    PercentOutOfRange {
        /// The actual value that was provided.
        actual: u16,
    },

    /// The start threshold is not below the stop threshold.
    #[error("start threshold {start}% must be below stop threshold {stop}%")]
    ThresholdOrder {
        /// The configured start (charge-below) threshold.
        start: u8,
        /// The configured stop (charge-above) threshold.
        stop: u8,
    },

    /// The poll interval is zero.
    #[error("check interval must be a positive number of seconds")]
    ZeroInterval,
}

/// Errors raised while reading the host battery sensor.
#[derive(Debug, Error)]
pub enum SensorError {
    /// No battery supply is present (e.g. desktop hardware).
    #[error("no battery found on this machine")]
    NoBattery,

    /// Reading a power-supply attribute failed.
    #[error("failed to read power supply data: {0}")]
    Io(#[from] std::io::Error),

    /// A power-supply attribute had an unexpected value.
    #[error("unexpected {attribute} reading: {value:?}")]
    InvalidReading {
        /// The sysfs attribute that failed to parse.
        attribute: &'static str,
        /// The raw value that was read.
        value: String,
    },
}

/// Errors raised while talking to the vendor cloud.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Cloud authentication was rejected.
    #[error("cloud authentication failed")]
    Auth,

    /// The HTTP request failed.
    #[error("network error: {0}")]
    Network(reqwest::Error),

    /// The request did not complete within the configured timeout.
    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// No device matched the requested alias, or the account has no devices.
    #[error("device not found")]
    DeviceNotFound {
        /// The alias that was searched for, if any.
        alias: Option<String>,
    },

    /// The cloud API returned a non-zero error code.
    #[error("cloud API error {code}: {message}")]
    Api {
        /// The vendor error code.
        code: i32,
        /// The vendor error message.
        message: String,
    },

    /// The response body did not have the expected shape.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
