pub mod gps_data;
pub mod gps_reader;
pub mod gps_service;
pub mod location;

pub use gps_data::GpsFix;
pub use gps_reader::{GpsReader, LineOutcome};
pub use gps_service::{GpsService, ReconnectPolicy};
pub use location::{Location, SharedLocation};
