//! Puts the peripheral object model on the system bus and talks to BlueZ.

pub mod error;
pub mod interfaces;
pub mod properties;
pub mod proxies;
pub mod stack;
pub mod values;

pub use error::BluezError;
pub use stack::{select_adapter, BluetoothStack, BluezStack};

pub const BLUEZ_SERVICE_NAME: &str = "org.bluez";
pub const LE_ADVERTISING_MANAGER_IFACE: &str = "org.bluez.LEAdvertisingManager1";
pub const PROPERTIES_IFACE: &str = "org.freedesktop.DBus.Properties";
