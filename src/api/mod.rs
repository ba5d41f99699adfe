//! Discord API module.
//!
//! This module provides:
//! - HTTP client for the Discord REST API
//! - Plain file fetching for CDN attachments
//! - API response types

pub mod client;
pub mod types;

pub use client::{DiscordApi, DiscordClient, Fetch, RemoteFile, PAGE_LIMIT};
pub use types::*;
