//! discord-dl - download message attachments from Discord channels
//!
//! This library walks the message history of Discord channels and saves the
//! attachments to disk under template-derived paths.
//!
//! # Features
//!
//! - Server channels and direct messages
//! - Path templates with message, author, channel and server variables
//! - Filtering by date and author
//! - Skips files whose MD5 matches the server ETag
//! - Request pacing and retry with linear backoff
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use discord_dl::{Config, DiscordClient, Downloader};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load(Path::new("discord-dl.toml"))?;
//!     let client = DiscordClient::new(config.account.token.clone())?;
//!
//!     let stats = Downloader::new(&client, &client, &config).run().await?;
//!     println!("{} files downloaded", stats.downloaded);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod fs;
pub mod output;

// Re-exports for convenience
pub use api::{DiscordApi, DiscordClient, Fetch};
pub use config::Config;
pub use download::{ChannelStats, Downloader, RunStats};
pub use error::{Error, Result};
