use thiserror::Error;

/// Faults returned to the Bluetooth stack by exported objects.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GattError {
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("Operation not supported")]
    NotSupported,

    #[error("Invalid offset {offset} for a value of {len} bytes")]
    InvalidOffset { offset: usize, len: usize },
}

impl GattError {
    /// D-Bus error name the fault is reported under.
    pub fn dbus_name(&self) -> &'static str {
        match self {
            GattError::InvalidArgs(_) => "org.freedesktop.DBus.Error.InvalidArgs",
            GattError::NotSupported => "org.bluez.Error.NotSupported",
            GattError::InvalidOffset { .. } => "org.bluez.Error.InvalidOffset",
        }
    }
}
