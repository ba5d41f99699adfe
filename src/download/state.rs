//! Download statistics.

use crate::download::engine::AttachmentOutcome;

/// Per-channel download statistics.
#[derive(Debug, Default, Clone)]
pub struct ChannelStats {
    pub channel_id: String,
    /// Display name once metadata is resolved.
    pub channel_name: Option<String>,

    pub messages_fetched: u64,
    pub messages_matched: u64,

    pub downloaded: u64,
    pub already_present: u64,
    pub not_found: u64,
    pub abandoned: u64,
    /// Attachments not hosted on the Discord CDN.
    pub rejected: u64,
    /// Attachments whose destination path could not be built.
    pub path_errors: u64,
}

impl ChannelStats {
    pub fn new(channel_id: String) -> Self {
        Self {
            channel_id,
            ..Default::default()
        }
    }

    /// Count the result of one attachment.
    pub fn record(&mut self, outcome: AttachmentOutcome) {
        match outcome {
            AttachmentOutcome::Downloaded => self.downloaded += 1,
            AttachmentOutcome::AlreadyExists => self.already_present += 1,
            AttachmentOutcome::NotFound => self.not_found += 1,
            AttachmentOutcome::Abandoned => self.abandoned += 1,
        }
    }

    pub fn increment_rejected(&mut self) {
        self.rejected += 1;
    }

    pub fn increment_path_errors(&mut self) {
        self.path_errors += 1;
    }

    /// Attachments that were looked at.
    pub fn total_attachments(&self) -> u64 {
        self.downloaded
            + self.already_present
            + self.not_found
            + self.abandoned
            + self.rejected
            + self.path_errors
    }
}

/// Statistics across all channels of a run.
#[derive(Debug, Default, Clone)]
pub struct RunStats {
    pub downloaded: u64,
    pub already_present: u64,
    pub not_found: u64,
    pub abandoned: u64,
    pub rejected: u64,
    pub path_errors: u64,
    pub channels_processed: u64,
    pub channels_failed: u64,
}

impl RunStats {
    /// Add statistics from a finished channel.
    pub fn add_channel_stats(&mut self, stats: &ChannelStats) {
        self.downloaded += stats.downloaded;
        self.already_present += stats.already_present;
        self.not_found += stats.not_found;
        self.abandoned += stats.abandoned;
        self.rejected += stats.rejected;
        self.path_errors += stats.path_errors;
        self.channels_processed += 1;
    }

    /// Mark a channel as failed.
    pub fn mark_channel_failed(&mut self) {
        self.channels_failed += 1;
    }
}
