//! `org.freedesktop.DBus.Properties` answered from the object model.
//!
//! zbus serves a stock Properties interface on every object it exports,
//! which reports a foreign interface as `UnknownInterface`. BlueZ objects
//! report it as `InvalidArgs`, so exported GATT objects get
//! [`PropertiesObject`] in its place.

use std::collections::HashMap;
use zbus::fdo;
use zbus::interface;
use zbus::zvariant::OwnedValue;

use super::values;
use crate::peripheral::{properties, InterfaceMap};

fn encoding_error(err: zbus::zvariant::Error) -> fdo::Error {
    fdo::Error::Failed(format!("Cannot encode property: {}", err))
}

/// `GetAll(interface)`: every property of `interface`, `InvalidArgs` when the
/// object does not carry it.
pub fn get_all(interfaces: InterfaceMap, interface: &str) -> fdo::Result<HashMap<String, OwnedValue>> {
    let props = properties::get_all(interfaces, interface)?;
    values::to_dbus_properties(&props).map_err(encoding_error)
}

/// `Get(interface, property)`.
pub fn get(interfaces: InterfaceMap, interface: &str, property: &str) -> fdo::Result<OwnedValue> {
    let props = properties::get_all(interfaces, interface)?;
    let value = props.get(property).ok_or_else(|| {
        fdo::Error::UnknownProperty(format!("No such property '{}' on {}", property, interface))
    })?;
    values::to_owned_value(value).map_err(encoding_error)
}

/// `Set(interface, property, value)`: every exported property is read-only.
pub fn set(interfaces: InterfaceMap, interface: &str, property: &str) -> fdo::Result<()> {
    let props = properties::get_all(interfaces, interface)?;
    if props.contains_key(property) {
        Err(fdo::Error::PropertyReadOnly(format!("Property '{}' is read-only", property)))
    } else {
        Err(fdo::Error::UnknownProperty(format!(
            "No such property '{}' on {}",
            property, interface
        )))
    }
}

/// Properties interface of one exported object; `interfaces` yields the
/// object's current interface map on every call.
pub struct PropertiesObject {
    interfaces: Box<dyn Fn() -> InterfaceMap + Send + Sync>,
}

impl PropertiesObject {
    pub fn new<F>(interfaces: F) -> Self
    where
        F: Fn() -> InterfaceMap + Send + Sync + 'static,
    {
        Self {
            interfaces: Box::new(interfaces),
        }
    }
}

#[interface(name = "org.freedesktop.DBus.Properties")]
impl PropertiesObject {
    fn get(&self, interface_name: String, property_name: String) -> fdo::Result<OwnedValue> {
        get((self.interfaces)(), &interface_name, &property_name)
    }

    fn get_all(&self, interface_name: String) -> fdo::Result<HashMap<String, OwnedValue>> {
        get_all((self.interfaces)(), &interface_name)
    }

    fn set(
        &self,
        interface_name: String,
        property_name: String,
        _value: OwnedValue,
    ) -> fdo::Result<()> {
        set((self.interfaces)(), &interface_name, &property_name)
    }
}
