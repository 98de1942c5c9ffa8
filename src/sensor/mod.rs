// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host battery sensor capability.

mod sysfs;

pub use sysfs::SysfsBattery;

use crate::error::SensorError;
use crate::types::BatteryPercent;

/// Capability to read the host machine's battery.
pub trait BatterySensor {
    /// Reads the current charge level.
    ///
    /// # Errors
    ///
    /// Returns `SensorError::NoBattery` on machines without a battery, or an
    /// I/O or parse error when the reading fails.
    fn percent(&self) -> Result<BatteryPercent, SensorError>;

    /// Reports whether the machine is on mains power.
    ///
    /// # Errors
    ///
    /// Returns `SensorError` if no AC supply can be found or read.
    fn ac_online(&self) -> Result<bool, SensorError>;
}
