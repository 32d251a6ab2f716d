pub mod gps;

pub use gps::{GpsService, Location, SharedLocation};
