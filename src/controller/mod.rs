// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The hysteresis charge controller.
//!
//! [`ChargePolicy`] is the pure decision rule; [`ChargeMonitor`] runs it in a
//! cancellable poll loop against a [`BatterySensor`](crate::sensor::BatterySensor)
//! and a [`PlugClient`](crate::client::PlugClient).

mod monitor;
mod policy;

pub use monitor::{ChargeMonitor, TickOutcome};
pub use policy::{Action, ChargePolicy, Decision};
