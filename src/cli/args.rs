use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use anyhow::Result;
use std::path::PathBuf;
use log::{debug, info};

/// Imagery Search Filter Tool
#[derive(Parser, Debug)]
#[command(name = "geosearch")]
#[command(about = "Build imagery Data API search filters and requests from the command line")]
#[command(version)]
pub struct Args {
    /// Verbose output (debug level logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet output (error level logging only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Debug output (trace level logging)
    #[arg(long, global = true)]
    pub debug: bool,

    /// Log format: text or json
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    pub log_format: String,

    /// Log file path for file output
    #[arg(long, value_name = "FILE", global = true)]
    pub log_file: Option<PathBuf>,

    /// Log level for file output (independent of console level)
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_file_level: Option<String>,

    /// Configuration file path
    #[arg(long, value_name = "FILE", global = true)]
    pub config_file: Option<PathBuf>,

    /// Configuration section name
    #[arg(long, value_name = "SECTION", global = true)]
    pub config_name: Option<String>,

    /// Disable coloured output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Print JSON on a single line
    #[arg(long, global = true)]
    pub compact: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the search filter described by the filter options
    Filter {
        #[command(flatten)]
        filter: FilterArgs,

        /// Match when any option matches instead of all of them
        #[arg(long)]
        any: bool,

        /// Invert the combined filter
        #[arg(long)]
        negate: bool,
    },

    /// Print a complete search request for the given item types
    Request(RequestArgs),

    /// List item types or asset types, or show what a pattern selects
    Types {
        /// Vocabulary to list
        #[arg(value_enum)]
        vocabulary: Vocabulary,

        /// Name, prefix, glob or `all`
        pattern: Option<String>,
    },

    /// Explain the argument formats used by the filter options
    Metavars,
}

/// Vocabularies that can be listed
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vocabulary {
    Item,
    Asset,
}

/// Options contributing filter fragments
#[derive(clap::Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Date comparison, e.g. `--date acquired gt 2017`
    #[arg(long = "date", num_args = 3, value_names = ["FIELD", "COMP", "VALUE"], action = ArgAction::Append)]
    pub date: Vec<String>,

    /// Numeric comparison, e.g. `--range cloud_cover lt 0.2`
    #[arg(long = "range", num_args = 3, value_names = ["FIELD", "COMP", "VALUE"], action = ArgAction::Append, allow_negative_numbers = true)]
    pub range: Vec<String>,

    /// Text membership, e.g. `--string-in satellite_id "0c12, 0e0f"`
    #[arg(long = "string-in", num_args = 2, value_names = ["FIELD", "VALUES"], action = ArgAction::Append)]
    pub string_in: Vec<String>,

    /// Numeric membership, e.g. `--number-in gsd "3,5"`
    #[arg(long = "number-in", num_args = 2, value_names = ["FIELD", "VALUES"], action = ArgAction::Append, allow_negative_numbers = true)]
    pub number_in: Vec<String>,

    /// GeoJSON area of interest: inline, `@-` for stdin or `@filename`
    #[arg(long = "geom", value_name = "GEOM")]
    pub geom: Option<String>,

    /// Raw Data API filter JSON: inline, `@-` for stdin or `@filename`
    #[arg(long = "filter-json", value_name = "FILTER")]
    pub filter_json: Option<String>,
}

/// Options of the `request` subcommand
#[derive(clap::Args, Debug, Clone, Default)]
pub struct RequestArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Item type name, prefix, glob or `all` (repeatable)
    #[arg(short = 't', long = "item-type", value_name = "ITEM-TYPE", action = ArgAction::Append)]
    pub item_types: Vec<String>,

    /// Asset type name or glob; results must be downloadable for each (repeatable)
    #[arg(short = 'a', long = "asset-type", value_name = "ASSET-TYPE", action = ArgAction::Append)]
    pub asset_types: Vec<String>,

    /// Name of the saved search
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,

    /// Bucket interval for statistics requests
    #[arg(long, value_name = "INTERVAL", value_parser = ["hour", "day", "week", "month", "year"])]
    pub interval: Option<String>,
}

/// Parse command line arguments
pub fn parse_args() -> Args {
    debug!("Parsing command line arguments");
    let args = Args::parse();
    debug!("Parsed CLI arguments: {:?}", args);
    args
}

/// Validate CLI argument combinations
pub fn validate_args(args: &Args) -> Result<()> {
    debug!("Validating CLI argument combinations");

    let log_flags_count = [args.verbose, args.quiet, args.debug]
        .iter()
        .filter(|&&flag| flag)
        .count();

    if log_flags_count > 1 {
        return Err(anyhow::anyhow!(
            "Conflicting log level flags: only one of --verbose, --quiet, or --debug may be specified"
        ));
    }

    match args.log_format.to_lowercase().as_str() {
        "text" | "json" => {},
        _ => return Err(anyhow::anyhow!(
            "Invalid log format '{}'. Valid options: text, json", args.log_format
        )),
    }

    if let Some(ref level) = args.log_file_level {
        match level.to_lowercase().as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => {},
            _ => return Err(anyhow::anyhow!(
                "Invalid log file level '{}'. Valid levels: error, warn, info, debug, trace", level
            )),
        }
    }

    if args.log_file_level.is_some() && args.log_file.is_none() {
        return Err(anyhow::anyhow!(
            "--log-file-level requires --log-file to be specified"
        ));
    }

    info!("CLI arguments validated successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    /// Create Args with default values for testing
    fn create_test_args() -> Args {
        Args {
            verbose: false,
            quiet: false,
            debug: false,
            log_format: "text".to_string(),
            log_file: None,
            log_file_level: None,
            config_file: None,
            config_name: None,
            no_color: false,
            compact: false,
            command: Command::Metavars,
        }
    }

    #[test]
    fn test_filter_options_collect_token_groups() {
        let args = parse(&[
            "geosearch", "filter",
            "--date", "acquired", "gt", "2017",
            "--range", "cloud_cover", "lt", "0.2",
            "--range", "gsd", "gte", "-1",
            "--string-in", "satellite_id", "a,b",
        ]);
        let Command::Filter { filter, any, negate } = args.command else {
            panic!("Expected filter subcommand");
        };
        assert_eq!(filter.date, vec!["acquired", "gt", "2017"]);
        assert_eq!(filter.range, vec!["cloud_cover", "lt", "0.2", "gsd", "gte", "-1"]);
        assert_eq!(filter.string_in, vec!["satellite_id", "a,b"]);
        assert!(filter.number_in.is_empty());
        assert!(filter.geom.is_none());
        assert!(!any && !negate);
    }

    #[test]
    fn test_request_options() {
        let args = parse(&[
            "geosearch", "--compact", "request",
            "-t", "psscene*", "--item-type", "REScene",
            "-a", "visual",
            "--geom", "@aoi.json",
            "--interval", "week",
        ]);
        assert!(args.compact);
        let Command::Request(request) = args.command else {
            panic!("Expected request subcommand");
        };
        assert_eq!(request.item_types, vec!["psscene*", "REScene"]);
        assert_eq!(request.asset_types, vec!["visual"]);
        assert_eq!(request.filter.geom.as_deref(), Some("@aoi.json"));
        assert_eq!(request.interval.as_deref(), Some("week"));
    }

    #[test]
    fn test_incomplete_range_is_rejected() {
        assert!(Args::try_parse_from(["geosearch", "filter", "--range", "cloud_cover", "lt"]).is_err());
    }

    #[test]
    fn test_interval_choices() {
        assert!(Args::try_parse_from(["geosearch", "request", "--interval", "fortnight"]).is_err());
    }

    #[test]
    fn test_types_subcommand() {
        let args = parse(&["geosearch", "types", "asset", "visual*"]);
        match args.command {
            Command::Types { vocabulary, pattern } => {
                assert_eq!(vocabulary, Vocabulary::Asset);
                assert_eq!(pattern.as_deref(), Some("visual*"));
            }
            other => panic!("Expected types subcommand, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_args_success() {
        let args = Args {
            verbose: true,
            log_format: "json".to_string(),
            ..create_test_args()
        };
        assert!(validate_args(&args).is_ok());
    }

    #[test]
    fn test_validate_args_conflicting_flags() {
        let args = Args {
            verbose: true,
            quiet: true,
            ..create_test_args()
        };
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_invalid_format() {
        let args = Args {
            log_format: "invalid".to_string(),
            ..create_test_args()
        };
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_file_level_without_file() {
        let args = Args {
            log_file_level: Some("debug".to_string()),
            ..create_test_args()
        };
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_file_level_with_file() {
        let args = Args {
            log_file: Some(PathBuf::from("/tmp/geosearch.log")),
            log_file_level: Some("trace".to_string()),
            ..create_test_args()
        };
        assert!(validate_args(&args).is_ok());
    }
}
