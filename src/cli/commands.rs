use clap::{Arg, ArgAction, ArgMatches, Command};
use log::info;
use std::path::Path;

use crate::config::Config;
use crate::utils::error::BeaconError;

pub const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

pub fn build_cli() -> Command {
    Command::new("gps-ble-beacon")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Publishes the position of a serial NMEA GPS receiver as a BLE GATT characteristic")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("DEVICE")
                .help("Serial device of the GPS receiver (overrides gps.port)"),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .value_parser(LOG_LEVELS)
                .default_value("info")
                .help("Log level when RUST_LOG is not set"),
        )
        .arg(
            Arg::new("print-config")
                .long("print-config")
                .action(ArgAction::SetTrue)
                .help("Print the effective configuration as TOML and exit"),
        )
}

/// Loads the configuration named by `--config` and applies the command line
/// overrides on top of it.
pub fn config_from_matches(matches: &ArgMatches) -> Result<Config, BeaconError> {
    let path = matches.get_one::<String>("config").map(Path::new);
    let mut config = Config::load(path)?;

    if let Some(port) = matches.get_one::<String>("port") {
        info!("🔧 GPS port overridden to {}", port);
        config.gps.port = port.clone();
        config.validate()?;
    }
    Ok(config)
}

pub fn log_level(matches: &ArgMatches) -> &str {
    matches
        .get_one::<String>("log-level")
        .map(String::as_str)
        .unwrap_or("info")
}
