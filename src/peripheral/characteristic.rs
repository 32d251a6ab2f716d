use log::warn;
use uuid::Uuid;

use super::error::GattError;
use super::properties::{self, InterfaceMap, PropertyMap, PropertyValue};
use super::GATT_CHRC_IFACE;

/// Options BlueZ passes along with `ReadValue`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadOptions {
    pub offset: usize,
    pub device: Option<String>,
    pub mtu: Option<u16>,
}

/// Options BlueZ passes along with `WriteValue`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteOptions {
    pub offset: usize,
    pub device: Option<String>,
    pub write_type: Option<String>,
}

/// A GATT characteristic as seen by `org.bluez.GattCharacteristic1`.
///
/// Every value operation defaults to `NotSupported`; implementations
/// override the ones their flags advertise.
pub trait Characteristic: Send + Sync {
    fn path(&self) -> &str;
    fn service_path(&self) -> &str;
    fn uuid(&self) -> Uuid;
    fn flags(&self) -> Vec<String>;

    fn descriptor_paths(&self) -> Vec<String> {
        Vec::new()
    }

    fn read_value(&self, _options: &ReadOptions) -> Result<Vec<u8>, GattError> {
        warn!("Default ReadValue called on {}, returning error", self.path());
        Err(GattError::NotSupported)
    }

    fn write_value(&self, _value: &[u8], _options: &WriteOptions) -> Result<(), GattError> {
        warn!("Default WriteValue called on {}, returning error", self.path());
        Err(GattError::NotSupported)
    }

    fn start_notify(&self) -> Result<(), GattError> {
        warn!("Default StartNotify called on {}, returning error", self.path());
        Err(GattError::NotSupported)
    }

    fn stop_notify(&self) -> Result<(), GattError> {
        warn!("Default StopNotify called on {}, returning error", self.path());
        Err(GattError::NotSupported)
    }

    /// Value to push on a notification tick; `None` while nobody subscribed.
    fn pending_notification(&self) -> Option<Vec<u8>> {
        None
    }

    fn properties(&self) -> InterfaceMap {
        let mut props = PropertyMap::new();
        props.insert(
            "Service".to_string(),
            PropertyValue::ObjectPath(self.service_path().to_string()),
        );
        props.insert("UUID".to_string(), PropertyValue::Str(self.uuid().to_string()));
        props.insert("Flags".to_string(), PropertyValue::Strings(self.flags()));
        props.insert(
            "Descriptors".to_string(),
            PropertyValue::ObjectPaths(self.descriptor_paths()),
        );

        let mut interfaces = InterfaceMap::new();
        interfaces.insert(GATT_CHRC_IFACE.to_string(), props);
        interfaces
    }

    fn get_all(&self, interface: &str) -> Result<PropertyMap, GattError> {
        properties::get_all(self.properties(), interface)
    }
}

/// Slices a full attribute value for a read starting at `offset`.
pub fn apply_read_offset(value: Vec<u8>, offset: usize) -> Result<Vec<u8>, GattError> {
    if offset > value.len() {
        return Err(GattError::InvalidOffset {
            offset,
            len: value.len(),
        });
    }
    Ok(value[offset..].to_vec())
}
