// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Validated value types used throughout the crate.

mod battery;
mod plug_state;

pub use battery::BatteryPercent;
pub use plug_state::PlugState;
