//! Search filter construction for the imagery Data API.
//!
//! The [`cli`] module holds the custom parameter types that turn loose
//! command-line text into filter JSON; [`filters`] builds the JSON itself.

pub mod app;
pub mod cli;
pub mod config;
pub mod filters;
pub mod geometry;
pub mod logging;
