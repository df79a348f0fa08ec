//! CLI module containing argument parsing and the custom parameter types

pub mod args;
pub mod blob;
pub mod converter;
pub mod date_parser;
pub mod field_values;
pub mod input;
pub mod param_type;
pub mod range;
pub mod vocabulary;

pub use args::Args;
pub use param_type::{ParamError, ParamType, ParamValue};
