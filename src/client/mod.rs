// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device client capability.
//!
//! The controller only depends on the narrow [`PlugClient`] trait; the
//! concrete [`CloudClient`] adapts it onto the TP-Link cloud API. Tests
//! substitute their own implementations.

mod cloud;

pub use cloud::{CloudClient, CloudConfig, DeviceInfo};

use crate::error::ClientError;
use crate::types::PlugState;

/// Capability to observe and switch a single smart plug.
#[allow(async_fn_in_trait)]
pub trait PlugClient {
    /// Sets the plug to the given power state.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the command cannot be delivered or is
    /// rejected.
    async fn set_power(&self, state: PlugState) -> Result<(), ClientError>;

    /// Reads the plug's current power state.
    ///
    /// Returns `Ok(None)` when the device reports no usable relay state.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the state cannot be read.
    async fn power_state(&self) -> Result<Option<PlugState>, ClientError>;

    /// Turns the plug on.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the command fails.
    async fn turn_on(&self) -> Result<(), ClientError> {
        self.set_power(PlugState::On).await
    }

    /// Turns the plug off.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the command fails.
    async fn turn_off(&self) -> Result<(), ClientError> {
        self.set_power(PlugState::Off).await
    }
}
