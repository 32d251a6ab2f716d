use std::collections::BTreeMap;

use super::error::GattError;

/// Property values exchanged with the Bluetooth stack, independent of the
/// bus encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Str(String),
    Bool(bool),
    ObjectPath(String),
    ObjectPaths(Vec<String>),
    Strings(Vec<String>),
    Bytes(Vec<u8>),
}

pub type PropertyMap = BTreeMap<String, PropertyValue>;
/// interface name -> properties
pub type InterfaceMap = BTreeMap<String, PropertyMap>;
/// object path -> interfaces
pub type ManagedObjects = BTreeMap<String, InterfaceMap>;

/// `org.freedesktop.DBus.Properties.GetAll` semantics over an object's
/// interface map: unknown interfaces are invalid arguments.
pub fn get_all(mut interfaces: InterfaceMap, interface: &str) -> Result<PropertyMap, GattError> {
    interfaces.remove(interface).ok_or_else(|| {
        GattError::InvalidArgs(format!("No such interface '{}'", interface))
    })
}
