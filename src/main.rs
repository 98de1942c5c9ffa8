// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command-line entry point.

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use chargectl::client::{CloudClient, CloudConfig, PlugClient};
use chargectl::config::Settings;
use chargectl::controller::ChargeMonitor;
use chargectl::error::SensorError;
use chargectl::sensor::{BatterySensor, SysfsBattery};
use chargectl::types::PlugState;

#[derive(Parser)]
#[command(name = "chargectl", version, about = "Battery charge control via a TP-Link cloud smart plug")]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// List the devices on the cloud account
    Devices,
    /// Show information about the configured plug
    Info,
    /// Show the host battery status
    Battery,
    /// Turn the plug on
    On,
    /// Turn the plug off
    Off,
    /// Run the charge monitoring loop until interrupted
    Monitor,
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    // Optional .env, matching the vendor-app setup flow.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            std::process::ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> chargectl::error::Result<()> {
    if let CliCommand::Battery = cli.command {
        // Battery status needs no cloud credentials.
        return print_battery(&SysfsBattery::new());
    }

    let settings = Settings::from_env()?;
    let client = CloudConfig::new(settings.credentials.clone())
        .with_device_alias_opt(settings.device_alias.clone())
        .into_client()?;

    match cli.command {
        CliCommand::Battery => unreachable!("handled above"),
        CliCommand::Devices => {
            let devices = client.list_devices().await?;
            if devices.is_empty() {
                println!("no devices on this account");
            }
            for (alias, model, online) in devices {
                let status = if online { "online" } else { "offline" };
                println!("{alias} ({model}) - {status}");
            }
        }
        CliCommand::Info => {
            let info = client.device_info().await?;
            println!("alias:    {}", info.alias);
            println!("model:    {}", info.model);
            println!("device:   {}", info.device_id);
            if let Some(firmware) = &info.firmware {
                println!("firmware: {firmware}");
            }
            match info.relay_state {
                Some(state) => println!("state:    {state}"),
                None => println!("state:    unknown"),
            }
        }
        CliCommand::On => {
            client.turn_on().await?;
            println!("plug turned {}", PlugState::On);
        }
        CliCommand::Off => {
            client.turn_off().await?;
            println!("plug turned {}", PlugState::Off);
        }
        CliCommand::Monitor => {
            monitor(client, settings).await?;
        }
    }
    Ok(())
}

fn print_battery(sensor: &SysfsBattery) -> chargectl::error::Result<()> {
    let level = sensor.percent()?;
    println!("battery: {level}");
    match sensor.ac_online() {
        Ok(true) => println!("power:   plugged in"),
        Ok(false) => println!("power:   on battery"),
        Err(SensorError::NoBattery) => println!("power:   unknown (no AC supply found)"),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

async fn monitor(client: CloudClient, settings: Settings) -> chargectl::error::Result<()> {
    // Refuse to start the loop on machines without a battery.
    let sensor = SysfsBattery::new();
    sensor.percent()?;

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, shutting down");
            signal_cancel.cancel();
        }
    });

    let mut monitor = ChargeMonitor::new(client, sensor, settings.policy, settings.check_interval);
    monitor.run(cancel).await;
    Ok(())
}
