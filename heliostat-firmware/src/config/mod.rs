//! Configuration loading and parsing
//!
//! The cycle configuration is embedded at build time from heliostat.toml
//! and parsed by a custom no_std parser.

pub mod toml;

pub use toml::parse_config;
