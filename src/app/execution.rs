//! Subcommand execution

use anyhow::{Context, Result};
use colored::Colorize;
use log::{debug, info};
use serde_json::Value;
use std::io::{self, Write};

use crate::cli::args::{Command, Vocabulary};
use crate::cli::converter;
use crate::cli::param_type::metavar_docs;
use crate::cli::vocabulary::LenientChoice;
use crate::{cli, config};

/// Run the selected subcommand, printing results to stdout
pub fn execute(args: &cli::Args, config: &config::ConfigManager) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_command(&args.command, config, args.compact, &mut out)?;
    out.flush().context("Failed to flush output")
}

/// Run a subcommand against an arbitrary writer
pub fn run_command<W: Write>(
    command: &Command,
    config: &config::ConfigManager,
    compact: bool,
    out: &mut W,
) -> Result<()> {
    match command {
        Command::Filter { filter, any, negate } => {
            let value = converter::args_to_logical_filter(filter, *any, *negate)?;
            write_json(out, &value, compact)
        }
        Command::Request(request) => {
            let defaults = config.get_search_defaults();
            debug!("Search defaults from config: {:?}", defaults);
            let value = converter::args_to_search_request(request, &defaults)?;
            write_json(out, &value, compact)
        }
        Command::Types { vocabulary, pattern } => {
            let choice = match vocabulary {
                Vocabulary::Item => LenientChoice::item_type(),
                Vocabulary::Asset => LenientChoice::asset_type(),
            };
            write_types(out, &choice, pattern.as_deref())
        }
        Command::Metavars => write_metavars(out),
    }
}

fn write_json<W: Write>(out: &mut W, value: &Value, compact: bool) -> Result<()> {
    let rendered = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    writeln!(out, "{}", rendered).context("Failed to write JSON output")
}

fn write_types<W: Write>(out: &mut W, choice: &LenientChoice, pattern: Option<&str>) -> Result<()> {
    let selected: Vec<String> = match pattern {
        Some(pattern) => {
            let matches = choice.convert(pattern)?;
            info!("'{}' selected {} {}(s)", pattern, matches.len(), choice.name());
            matches
        }
        None => {
            let mut header = format!("{} choices", choice.name());
            if choice.allows_all() {
                header.push_str(" (or 'all'");
                if choice.allows_prefix() {
                    header.push_str(", a prefix");
                }
                header.push_str(" or a glob)");
            } else {
                header.push_str(" (or a glob)");
            }
            writeln!(out, "{}", header.bold())?;
            choice.choices().iter().map(|c| c.to_string()).collect()
        }
    };

    for name in selected {
        writeln!(out, "  {}", name.green())?;
    }
    Ok(())
}

fn write_metavars<W: Write>(out: &mut W) -> Result<()> {
    for (metavar, description) in metavar_docs() {
        writeln!(out, "{}", metavar.bold())?;
        writeln!(out, "    {}", description)?;
        writeln!(out)?;
    }
    Ok(())
}
