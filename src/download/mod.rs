//! Download module for channel attachments.
//!
//! This module provides:
//! - Channel and server metadata lookup
//! - Paginated message history retrieval
//! - Message filtering
//! - Attachment downloading with dedup and retries
//! - Request pacing
//! - Download statistics

pub mod channel;
pub mod engine;
pub mod filter;
pub mod hash;
pub mod messages;
pub mod pacing;
pub mod retry;
pub mod runner;
pub mod state;

pub use channel::{resolve_channel_info, ChannelInfo, ServerContext};
pub use engine::{download_file, download_with_retry, AttachmentOutcome, DownloadOptions, DownloadOutcome};
pub use filter::MessageFilter;
pub use messages::fetch_channel_messages;
pub use pacing::Pacer;
pub use retry::{retry_transient, RetryPolicy};
pub use runner::{is_cdn_url, Downloader, CDN_HOST};
pub use state::{ChannelStats, RunStats};
