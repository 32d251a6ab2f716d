//! BLE peripheral object model: the GATT application, its service and
//! characteristic, the advertisement and the pairing agent, independent of
//! how they are put on the bus.

pub mod advertisement;
pub mod agent;
pub mod application;
pub mod characteristic;
pub mod error;
pub mod location;
pub mod properties;
pub mod service;

pub use advertisement::Advertisement;
pub use agent::PairingAgent;
pub use application::Application;
pub use characteristic::{Characteristic, ReadOptions, WriteOptions};
pub use error::GattError;
pub use location::{location_service, LocationCharacteristic};
pub use properties::{InterfaceMap, ManagedObjects, PropertyMap, PropertyValue};
pub use service::Service;

pub const GATT_SERVICE_IFACE: &str = "org.bluez.GattService1";
pub const GATT_CHRC_IFACE: &str = "org.bluez.GattCharacteristic1";
pub const LE_ADVERTISEMENT_IFACE: &str = "org.bluez.LEAdvertisement1";
