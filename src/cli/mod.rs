pub mod commands;

pub use commands::{build_cli, config_from_matches, log_level};
