// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Loop-level tests of the charge monitor under paused tokio time.
//!
//! These drive [`ChargeMonitor::run`] with scripted battery readings and a
//! recording plug, so the scheduling behavior (poll interval, prompt
//! cancellation, retry on the next interval only) is tested without real
//! delays or hardware.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chargectl::client::PlugClient;
use chargectl::controller::{ChargeMonitor, ChargePolicy};
use chargectl::error::{ClientError, SensorError};
use chargectl::sensor::BatterySensor;
use chargectl::types::{BatteryPercent, PlugState};
use tokio_util::sync::CancellationToken;

const INTERVAL: Duration = Duration::from_secs(60);

#[derive(Clone, Default)]
struct RecordingPlug {
    state: Arc<Mutex<Option<PlugState>>>,
    commands: Arc<Mutex<Vec<PlugState>>>,
    fail_next: Arc<AtomicBool>,
}

impl RecordingPlug {
    fn with_state(state: Option<PlugState>) -> Self {
        let plug = Self::default();
        *plug.state.lock().unwrap() = state;
        plug
    }

    fn commands(&self) -> Vec<PlugState> {
        self.commands.lock().unwrap().clone()
    }
}

impl PlugClient for RecordingPlug {
    async fn set_power(&self, state: PlugState) -> Result<(), ClientError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(ClientError::Timeout(Duration::from_secs(10)));
        }
        *self.state.lock().unwrap() = Some(state);
        self.commands.lock().unwrap().push(state);
        Ok(())
    }

    async fn power_state(&self) -> Result<Option<PlugState>, ClientError> {
        Ok(*self.state.lock().unwrap())
    }
}

/// Sensor fed from a script; `None` entries simulate a missing battery.
/// Repeats its last entry once exhausted.
#[derive(Clone)]
struct ScriptedBattery {
    readings: Arc<Mutex<VecDeque<Option<u8>>>>,
    reads: Arc<Mutex<usize>>,
}

impl ScriptedBattery {
    fn new(readings: &[Option<u8>]) -> Self {
        Self {
            readings: Arc::new(Mutex::new(readings.iter().copied().collect())),
            reads: Arc::new(Mutex::new(0)),
        }
    }

    fn read_count(&self) -> usize {
        *self.reads.lock().unwrap()
    }
}

impl BatterySensor for ScriptedBattery {
    fn percent(&self) -> Result<BatteryPercent, SensorError> {
        *self.reads.lock().unwrap() += 1;
        let mut readings = self.readings.lock().unwrap();
        let reading = if readings.len() > 1 {
            readings.pop_front().unwrap_or(None)
        } else {
            readings.front().copied().unwrap_or(None)
        };
        match reading {
            Some(value) => Ok(BatteryPercent::new(value).unwrap()),
            None => Err(SensorError::NoBattery),
        }
    }

    fn ac_online(&self) -> Result<bool, SensorError> {
        Ok(true)
    }
}

fn policy_40_80() -> ChargePolicy {
    ChargePolicy::new(
        BatteryPercent::new(40).unwrap(),
        BatteryPercent::new(80).unwrap(),
    )
    .unwrap()
}

fn spawn_monitor(
    plug: RecordingPlug,
    sensor: ScriptedBattery,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    let mut monitor = ChargeMonitor::new(plug, sensor, policy_40_80(), INTERVAL);
    tokio::spawn(async move { monitor.run(cancel).await })
}

#[tokio::test(start_paused = true)]
async fn polls_once_per_interval() {
    let plug = RecordingPlug::with_state(Some(PlugState::Off));
    let sensor = ScriptedBattery::new(&[Some(50)]);
    let cancel = CancellationToken::new();
    let handle = spawn_monitor(plug.clone(), sensor.clone(), cancel.clone());

    // First tick immediately, then one per interval.
    tokio::time::sleep(INTERVAL * 3 + Duration::from_secs(1)).await;
    cancel.cancel();
    handle.await.unwrap();

    assert_eq!(sensor.read_count(), 4);
    assert!(plug.commands().is_empty());
}

#[tokio::test(start_paused = true)]
async fn charges_and_stops_across_thresholds() {
    let plug = RecordingPlug::with_state(Some(PlugState::Off));
    let sensor = ScriptedBattery::new(&[
        Some(35),
        Some(38),
        Some(45),
        Some(60),
        Some(81),
        Some(70),
    ]);
    let cancel = CancellationToken::new();
    let handle = spawn_monitor(plug.clone(), sensor.clone(), cancel.clone());

    tokio::time::sleep(INTERVAL * 5 + Duration::from_secs(1)).await;
    cancel.cancel();
    handle.await.unwrap();

    assert_eq!(plug.commands(), vec![PlugState::On, PlugState::Off]);
}

#[tokio::test(start_paused = true)]
async fn sensor_failure_skips_poll_but_loop_continues() {
    let plug = RecordingPlug::with_state(Some(PlugState::Off));
    let sensor = ScriptedBattery::new(&[None, Some(35)]);
    let cancel = CancellationToken::new();
    let handle = spawn_monitor(plug.clone(), sensor.clone(), cancel.clone());

    // First poll fails to read the battery; nothing is commanded.
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(plug.commands().is_empty());

    // Second poll reads 35% and turns the plug on.
    tokio::time::sleep(INTERVAL).await;
    cancel.cancel();
    handle.await.unwrap();
    assert_eq!(plug.commands(), vec![PlugState::On]);
}

#[tokio::test(start_paused = true)]
async fn failed_command_retries_on_next_interval_only() {
    let plug = RecordingPlug::with_state(Some(PlugState::Off));
    plug.fail_next.store(true, Ordering::SeqCst);
    let sensor = ScriptedBattery::new(&[Some(39)]);
    let cancel = CancellationToken::new();
    let handle = spawn_monitor(plug.clone(), sensor.clone(), cancel.clone());

    // The first command fails; no immediate retry within the interval.
    tokio::time::sleep(INTERVAL - Duration::from_secs(1)).await;
    assert!(plug.commands().is_empty());
    assert_eq!(sensor.read_count(), 1);

    // Next scheduled poll re-attempts with the same battery level.
    tokio::time::sleep(Duration::from_secs(2)).await;
    cancel.cancel();
    handle.await.unwrap();
    assert_eq!(plug.commands(), vec![PlugState::On]);
}

#[tokio::test(start_paused = true)]
async fn cancellation_cuts_the_sleep_short() {
    let plug = RecordingPlug::with_state(Some(PlugState::Off));
    let sensor = ScriptedBattery::new(&[Some(50)]);
    let cancel = CancellationToken::new();
    let handle = spawn_monitor(plug.clone(), sensor.clone(), cancel.clone());

    tokio::time::sleep(Duration::from_secs(1)).await;
    cancel.cancel();
    // Under paused time this would hang for the rest of the interval if
    // cancellation were only checked between sleeps.
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("monitor did not stop promptly")
        .unwrap();

    assert_eq!(sensor.read_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn rebuilds_state_from_device_on_first_poll() {
    // Plug already on, battery in the deadband: no command is issued.
    let plug = RecordingPlug::with_state(Some(PlugState::On));
    let sensor = ScriptedBattery::new(&[Some(60)]);
    let cancel = CancellationToken::new();
    let handle = spawn_monitor(plug.clone(), sensor.clone(), cancel.clone());

    tokio::time::sleep(Duration::from_secs(1)).await;
    cancel.cancel();
    handle.await.unwrap();

    assert!(plug.commands().is_empty());
}
