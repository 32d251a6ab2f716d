pub mod settings;

pub use settings::{Config, GpsSettings, PeripheralSettings, ReconnectSettings};
