//! Configuration file support
//!
//! TOML files are flattened to `section -> key -> string` maps. Nested
//! tables become dotted sections (`[profile.archive]`), and top-level keys
//! land in `[base]`, which every lookup falls back to.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;
use anyhow::{Context, Result};
use toml::Value;
use log::{debug, info};
use crate::cli::field_values::split_values;

/// Flattened configuration: section name -> key -> value
pub type Configuration = HashMap<String, HashMap<String, String>>;

/// Environment variable naming an explicit configuration file
pub const CONFIG_ENV_VAR: &str = "GEOSEARCH_CONFIG";

/// Section every lookup falls back to
const BASE_SECTION: &str = "base";

/// Section holding search request defaults
const SEARCH_SECTION: &str = "search";

/// Search request defaults from the `[search]` section
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchDefaults {
    /// Raw item-type arguments (names, prefixes, globs or `all`)
    pub item_types: Vec<String>,
    pub name: Option<String>,
    pub interval: Option<String>,
}

/// Loaded configuration plus the `--config-name` override section
#[derive(Debug)]
pub struct ConfigManager {
    config: Configuration,
    source: Option<PathBuf>,
    selected_section: Option<String>,
}

impl ConfigManager {
    pub fn from_config(config: Configuration) -> Self {
        Self {
            config,
            source: None,
            selected_section: None,
        }
    }

    /// Load the first configuration file found by discovery, or nothing
    pub fn load() -> Result<Self> {
        match discover_config_files().into_iter().find(|path| path.is_file()) {
            Some(path) => {
                info!("Loading configuration from: {}", path.display());
                Self::load_from_file(path)
            }
            None => {
                info!("No configuration file found, using empty configuration");
                Ok(Self::from_config(Configuration::new()))
            }
        }
    }

    pub fn load_from_file(path: PathBuf) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config = parse_toml_config(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        debug!("Loaded {} section(s) from {}", config.len(), path.display());
        Ok(Self {
            config,
            source: Some(path),
            selected_section: None,
        })
    }

    /// Path of the file this configuration came from, if any
    pub fn config_file_path(&self) -> Option<&PathBuf> {
        self.source.as_ref()
    }

    /// Look `key` up in the selected section, then `section`, then `[base]`
    pub fn get_value(&self, section: &str, key: &str) -> Option<&String> {
        self.selected_section
            .as_deref()
            .into_iter()
            .chain([section, BASE_SECTION])
            .find_map(|name| self.config.get(name).and_then(|values| values.get(key)))
    }

    pub fn select_section(&mut self, section: String) {
        debug!("Selecting configuration section: {}", section);
        self.selected_section = Some(section);
    }

    pub fn get_bool(&self, section: &str, key: &str) -> Result<Option<bool>> {
        self.get_parsed(section, key, |value| match value.to_lowercase().as_str() {
            "true" | "yes" | "on" => Ok(true),
            "false" | "no" | "off" => Ok(false),
            _ => Err(anyhow::anyhow!("expected true or false")),
        })
    }

    pub fn get_log_level(&self, section: &str, key: &str) -> Result<Option<log::LevelFilter>> {
        self.get_parsed(section, key, crate::logging::parse_log_level)
    }

    pub fn get_path(&self, section: &str, key: &str) -> Option<PathBuf> {
        self.get_value(section, key).map(PathBuf::from)
    }

    /// Value list; strings are split on whitespace and commas
    pub fn get_list(&self, section: &str, key: &str) -> Vec<String> {
        self.get_value(section, key)
            .map(|value| split_values(value).into_iter().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn get_search_defaults(&self) -> SearchDefaults {
        SearchDefaults {
            item_types: self.get_list(SEARCH_SECTION, "item-types"),
            name: self.get_value(SEARCH_SECTION, "name").cloned(),
            interval: self.get_value(SEARCH_SECTION, "interval").cloned(),
        }
    }

    fn get_parsed<T, F>(&self, section: &str, key: &str, parse: F) -> Result<Option<T>>
    where
        F: Fn(&str) -> Result<T>,
    {
        self.get_value(section, key)
            .map(|value| {
                parse(value).with_context(|| format!("Invalid value for {}.{}: {}", section, key, value))
            })
            .transpose()
    }
}

/// Candidate files, most specific first: `$GEOSEARCH_CONFIG`, the user
/// config directory, the home directory, then the working directory
fn discover_config_files() -> Vec<PathBuf> {
    let paths: Vec<PathBuf> = [
        env::var_os(CONFIG_ENV_VAR).map(PathBuf::from),
        dirs::config_dir().map(|dir| dir.join("geosearch").join("config.toml")),
        dirs::home_dir().map(|dir| dir.join(".geosearch.toml")),
        Some(PathBuf::from("./.geosearch.toml")),
    ]
    .into_iter()
    .flatten()
    .collect();

    debug!("Config discovery paths: {:?}", paths);
    paths
}

fn parse_toml_config(content: &str) -> Result<Configuration> {
    let table: toml::Table = content.parse()
        .context("Failed to parse TOML content")?;

    let mut config = Configuration::new();
    flatten_toml_table(&table, "", &mut config);
    Ok(config)
}

/// Flatten nested tables into dotted section names
fn flatten_toml_table(table: &toml::Table, prefix: &str, config: &mut Configuration) {
    for (key, value) in table {
        let section_name = match prefix {
            "" => key.clone(),
            _ => format!("{}.{}", prefix, key),
        };

        match value {
            Value::Table(subtable) if subtable.values().any(Value::is_table) => {
                flatten_toml_table(subtable, &section_name, config);
            }
            Value::Table(subtable) => {
                let section = config.entry(section_name).or_default();
                for (subkey, subvalue) in subtable {
                    section.insert(subkey.clone(), toml_value_to_string(subvalue));
                }
            }
            // Keys outside a leaf table belong to [base]
            _ => {
                config
                    .entry(BASE_SECTION.to_string())
                    .or_default()
                    .insert(key.clone(), toml_value_to_string(value));
            }
        }
    }
}

/// Scalars render as text, arrays as comma-joined lists
fn toml_value_to_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Array(items) => items
            .iter()
            .map(toml_value_to_string)
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}
