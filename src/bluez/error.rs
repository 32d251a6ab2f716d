use zbus::DBusError;

use crate::peripheral::GattError;

/// Errors returned over the bus from exported BlueZ objects.
#[derive(Debug, DBusError)]
#[zbus(prefix = "org.bluez.Error")]
pub enum BluezError {
    #[zbus(error)]
    ZBus(zbus::Error),
    NotSupported(String),
    InvalidOffset(String),
    InvalidArguments(String),
    Failed(String),
}

impl From<GattError> for BluezError {
    fn from(err: GattError) -> Self {
        match err {
            GattError::NotSupported => BluezError::NotSupported(err.to_string()),
            GattError::InvalidOffset { .. } => BluezError::InvalidOffset(err.to_string()),
            GattError::InvalidArgs(_) => BluezError::InvalidArguments(err.to_string()),
        }
    }
}

/// Faults raised while serving `org.freedesktop.DBus.Properties`.
impl From<GattError> for zbus::fdo::Error {
    fn from(err: GattError) -> Self {
        match err {
            GattError::NotSupported => zbus::fdo::Error::NotSupported(err.to_string()),
            GattError::InvalidArgs(_) | GattError::InvalidOffset { .. } => {
                zbus::fdo::Error::InvalidArgs(err.to_string())
            }
        }
    }
}
