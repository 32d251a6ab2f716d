use anyhow::{bail, Context, Result};
use env_logger::Env;
use log::{error, info};
use std::sync::Arc;

use gps_ble_beacon::bluez::BluezStack;
use gps_ble_beacon::cli::{build_cli, config_from_matches, log_level};
use gps_ble_beacon::{BeaconError, GpsService, LoopExit, PeripheralRegistrar, SharedLocation, VERSION};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let matches = build_cli().get_matches();

    env_logger::Builder::from_env(Env::default().default_filter_or(log_level(&matches))).init();

    let config = config_from_matches(&matches).context("Invalid configuration")?;

    if matches.get_flag("print-config") {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    info!("🛰️  GPS BLE Beacon v{}", VERSION);
    info!(
        "🔌 GPS: {} @ {} baud | 🆔 Service {}",
        config.gps.port, config.gps.baud_rate, config.peripheral.service_uuid
    );

    let location = SharedLocation::new();
    let gps = GpsService::new(config.gps.clone(), location.clone());

    let stack = Arc::new(BluezStack::system().await.context("Cannot connect to the system bus")?);
    let registrar = PeripheralRegistrar::new(config.peripheral.clone(), stack);

    match registrar.run(gps, location).await {
        Ok(LoopExit::Interrupted) => {
            info!("👋 Goodbye!");
            Ok(())
        }
        Ok(LoopExit::Quit(reason)) => bail!("Main loop stopped: {}", reason),
        Err(BeaconError::AdapterNotFound(msg)) => {
            error!("❌ {}", msg);
            error!("💡 Is the Bluetooth adapter powered and does BlueZ support LE advertising?");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
