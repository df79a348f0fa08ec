use anyhow::Result;
use colored::Colorize;
use log::{debug, error};
use std::process;

use geosearch::{app, cli, logging};

fn main() {
    if let Err(e) = run() {
        error!("Application error: {:#}", e);
        eprintln!("{} {}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = cli::args::parse_args();

    cli::args::validate_args(&args)?;

    let config_manager = app::load_configuration(&args)?;

    let log_config = app::configure_logging(&args, &config_manager)?;
    logging::init_logger(log_config)?;

    if let Some(enabled) = app::configure_colours(&args, &config_manager) {
        colored::control::set_override(enabled);
    }

    if let Some(path) = config_manager.config_file_path() {
        debug!("Using configuration file: {}", path.display());
    }

    app::execute(&args, &config_manager)
}
