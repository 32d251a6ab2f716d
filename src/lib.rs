//! GPS BLE Beacon
//!
//! Reads NMEA sentences from a serial GPS receiver and publishes the latest
//! position as a read/notify GATT characteristic through BlueZ on the system
//! D-Bus.

pub mod bluez;
pub mod cli;
pub mod config;
pub mod devices;
pub mod peripheral;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use devices::{GpsService, Location, SharedLocation};
pub use services::{LoopExit, MainLoop, PeripheralRegistrar};
pub use utils::error::BeaconError;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
