// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `chargectl` - keep a laptop battery between charge thresholds with a
//! TP-Link cloud smart plug.
//!
//! The crate reads the host battery level from sysfs and switches the smart
//! plug feeding the laptop's charger through the vendor cloud API, using a
//! two-threshold hysteresis policy: start charging at or below the start
//! threshold, stop at or above the stop threshold, and leave the plug alone
//! in between so it never chatters around a single boundary.
//!
//! # Quick Start
//!
//! ```no_run
//! use tokio_util::sync::CancellationToken;
//! use chargectl::client::CloudConfig;
//! use chargectl::config::Settings;
//! use chargectl::controller::ChargeMonitor;
//! use chargectl::sensor::SysfsBattery;
//!
//! #[tokio::main]
//! async fn main() -> chargectl::error::Result<()> {
//!     // Validated up front; the loop never starts on bad thresholds.
//!     let settings = Settings::from_env()?;
//!
//!     let client = CloudConfig::new(settings.credentials.clone())
//!         .with_device_alias_opt(settings.device_alias.clone())
//!         .into_client()?;
//!
//!     let mut monitor = ChargeMonitor::new(
//!         client,
//!         SysfsBattery::new(),
//!         settings.policy,
//!         settings.check_interval,
//!     );
//!     monitor.run(CancellationToken::new()).await;
//!     Ok(())
//! }
//! ```
//!
//! # Design
//!
//! - The controller depends only on the [`client::PlugClient`] and
//!   [`sensor::BatterySensor`] traits, never on the vendor SDK; tests drive
//!   it with fakes and paused tokio time.
//! - The policy itself ([`controller::ChargePolicy::evaluate`]) is a pure
//!   function; all side effects live in the monitor's poll step.
//! - Sensor and cloud failures are warnings, not exits: the loop skips the
//!   poll or forgets its commanded state and retries on the next interval,
//!   and only cancellation stops it.

pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod sensor;
pub mod types;

pub use client::{CloudClient, CloudConfig, PlugClient};
pub use config::{Credentials, Settings};
pub use controller::{Action, ChargeMonitor, ChargePolicy, Decision, TickOutcome};
pub use error::{ClientError, ConfigError, Error, Result, SensorError};
pub use sensor::{BatterySensor, SysfsBattery};
pub use types::{BatteryPercent, PlugState};
