//! Configuration module for discord-dl.
//!
//! This module handles:
//! - Loading configuration from TOML files
//! - Configuration validation
//! - Channel id extraction from ids, URLs and id files

pub mod loader;
pub mod validation;

pub use loader::{
    AccountConfig, ChannelsConfig, Config, FilterConfig, OutputConfig, PacingConfig,
    CONFIG_FILE_NAME, DEFAULT_FORMAT,
};
pub use validation::{
    load_channel_file, parse_channel_id, parse_cli_date, resolve_channel_ids, validate_config,
};
