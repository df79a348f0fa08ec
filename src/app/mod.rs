//! Application orchestration module

pub mod initialization;
pub mod execution;

pub use initialization::{load_configuration, configure_logging, configure_colours};
pub use execution::{execute, run_command};
