use std::collections::HashMap;
use zbus::zvariant::{self, ObjectPath, OwnedObjectPath, OwnedValue, Value};

use crate::peripheral::{ManagedObjects, PropertyMap, PropertyValue, ReadOptions, WriteOptions};

/// Wire shape of `GetManagedObjects`: `a{oa{sa{sv}}}`.
pub type DbusManagedObjects = HashMap<OwnedObjectPath, HashMap<String, HashMap<String, OwnedValue>>>;

pub fn to_owned_value(value: &PropertyValue) -> Result<OwnedValue, zvariant::Error> {
    let value = match value {
        PropertyValue::Str(s) => Value::from(s.clone()),
        PropertyValue::Bool(b) => Value::from(*b),
        PropertyValue::ObjectPath(path) => Value::from(ObjectPath::try_from(path.clone())?),
        PropertyValue::ObjectPaths(paths) => {
            let paths = paths
                .iter()
                .cloned()
                .map(ObjectPath::try_from)
                .collect::<Result<Vec<_>, _>>()?;
            Value::from(paths)
        }
        PropertyValue::Strings(strings) => Value::from(strings.clone()),
        PropertyValue::Bytes(bytes) => Value::from(bytes.clone()),
    };
    OwnedValue::try_from(value)
}

pub fn to_dbus_properties(props: &PropertyMap) -> Result<HashMap<String, OwnedValue>, zvariant::Error> {
    props
        .iter()
        .map(|(name, value)| Ok((name.clone(), to_owned_value(value)?)))
        .collect()
}

pub fn to_dbus_managed_objects(objects: &ManagedObjects) -> Result<DbusManagedObjects, zvariant::Error> {
    let mut result = DbusManagedObjects::new();
    for (path, interfaces) in objects {
        let mut dbus_interfaces = HashMap::new();
        for (interface, props) in interfaces {
            dbus_interfaces.insert(interface.clone(), to_dbus_properties(props)?);
        }
        result.insert(OwnedObjectPath::try_from(path.clone())?, dbus_interfaces);
    }
    Ok(result)
}

pub fn to_object_paths(paths: &[String]) -> Result<Vec<OwnedObjectPath>, zvariant::Error> {
    paths.iter().cloned().map(OwnedObjectPath::try_from).collect()
}

fn u16_option(options: &HashMap<String, OwnedValue>, key: &str) -> Option<u16> {
    match options.get(key).map(|value| &**value) {
        Some(Value::U16(n)) => Some(*n),
        _ => None,
    }
}

fn text_option(options: &HashMap<String, OwnedValue>, key: &str) -> Option<String> {
    match options.get(key).map(|value| &**value) {
        Some(Value::ObjectPath(path)) => Some(path.to_string()),
        Some(Value::Str(s)) => Some(s.to_string()),
        _ => None,
    }
}

/// Decodes the `a{sv}` options of `ReadValue`; unknown keys are ignored.
pub fn read_options(options: &HashMap<String, OwnedValue>) -> ReadOptions {
    ReadOptions {
        offset: u16_option(options, "offset").map(usize::from).unwrap_or(0),
        device: text_option(options, "device"),
        mtu: u16_option(options, "mtu"),
    }
}

/// Decodes the `a{sv}` options of `WriteValue`; unknown keys are ignored.
pub fn write_options(options: &HashMap<String, OwnedValue>) -> WriteOptions {
    WriteOptions {
        offset: u16_option(options, "offset").map(usize::from).unwrap_or(0),
        device: text_option(options, "device"),
        write_type: text_option(options, "type"),
    }
}
