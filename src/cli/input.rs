//! Indirect argument input
//!
//! `@-` (or a bare `-`) reads standard input, `@filename` reads a file, a bare
//! argument naming an existing file reads that file, and anything else is the
//! content itself.

use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use log::debug;
use thiserror::Error;

/// Prefix marking an indirect argument
pub const INDIRECT_PREFIX: char = '@';

/// Name designating standard input, bare or after the prefix
pub const STDIN_NAME: &str = "-";

/// Input resolution errors
#[derive(Debug, Error)]
pub enum InputError {
    #[error("unable to read standard input: {source}")]
    Stdin {
        #[source]
        source: io::Error,
    },

    #[error("unable to read {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Where an argument's content comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource<'a> {
    Stdin,
    File(&'a Path),
    Inline(&'a str),
}

impl<'a> InputSource<'a> {
    /// Classify an argument without touching the filesystem beyond a metadata check
    pub fn classify(argument: &'a str) -> Self {
        match argument.strip_prefix(INDIRECT_PREFIX) {
            Some(STDIN_NAME) => InputSource::Stdin,
            Some(name) => InputSource::File(Path::new(name)),
            None if argument == STDIN_NAME => InputSource::Stdin,
            None if !argument.is_empty() && Path::new(argument).is_file() => {
                InputSource::File(Path::new(argument))
            }
            None => InputSource::Inline(argument),
        }
    }
}

/// Resolve an argument to its literal content using the process stdin
pub fn read(argument: &str) -> Result<String, InputError> {
    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    read_with_stdin(argument, stdin.lock(), interactive)
}

/// Resolve an argument with an explicit stdin reader.
///
/// An interactive stdin has nothing piped into it and resolves to empty
/// content rather than blocking on the terminal.
pub fn read_with_stdin<R: Read>(
    argument: &str,
    mut stdin: R,
    interactive: bool,
) -> Result<String, InputError> {
    match InputSource::classify(argument) {
        InputSource::Stdin if interactive => {
            debug!("stdin is a terminal, no input piped");
            Ok(String::new())
        }
        InputSource::Stdin => {
            let mut content = String::new();
            stdin
                .read_to_string(&mut content)
                .map_err(|source| InputError::Stdin { source })?;
            debug!("Read {} bytes from stdin", content.len());
            Ok(content)
        }
        InputSource::File(path) => {
            let content = fs::read_to_string(path).map_err(|source| InputError::File {
                path: path.to_path_buf(),
                source,
            })?;
            debug!("Read {} bytes from {}", content.len(), path.display());
            Ok(content)
        }
        InputSource::Inline(content) => Ok(content.to_string()),
    }
}
