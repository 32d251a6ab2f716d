use thiserror::Error;

#[derive(Error, Debug)]
pub enum BeaconError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Communication error: {0}")]
    CommunicationError(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Bus error: {0}")]
    BusError(String),

    #[error("Adapter not found: {0}")]
    AdapterNotFound(String),

    #[error("Registration failed: {0}")]
    RegistrationError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Service not available: {0}")]
    ServiceNotAvailable(String),
}

impl From<std::io::Error> for BeaconError {
    fn from(err: std::io::Error) -> Self {
        BeaconError::CommunicationError(format!("IO error: {}", err))
    }
}

impl From<serialport::Error> for BeaconError {
    fn from(err: serialport::Error) -> Self {
        BeaconError::ConnectionError(format!("Serial port error: {}", err))
    }
}

impl From<zbus::Error> for BeaconError {
    fn from(err: zbus::Error) -> Self {
        BeaconError::BusError(err.to_string())
    }
}

impl From<zbus::fdo::Error> for BeaconError {
    fn from(err: zbus::fdo::Error) -> Self {
        BeaconError::BusError(err.to_string())
    }
}

impl From<zbus::zvariant::Error> for BeaconError {
    fn from(err: zbus::zvariant::Error) -> Self {
        BeaconError::InvalidData(format!("D-Bus value error: {}", err))
    }
}

impl From<toml::de::Error> for BeaconError {
    fn from(err: toml::de::Error) -> Self {
        BeaconError::ConfigError(format!("TOML parse error: {}", err))
    }
}

impl From<toml::ser::Error> for BeaconError {
    fn from(err: toml::ser::Error) -> Self {
        BeaconError::SerializationError(format!("TOML error: {}", err))
    }
}
