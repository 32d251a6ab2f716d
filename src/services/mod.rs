pub mod main_loop;
pub mod peripheral_service;

pub use main_loop::{LoopExit, LoopHandle, MainLoop};
pub use peripheral_service::{notify_tick, Peripheral, PeripheralRegistrar};
