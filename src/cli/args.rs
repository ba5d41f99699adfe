//! Command-line argument definitions using clap.

use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

use crate::config::{parse_cli_date, Config};

/// Discord channel attachment downloader CLI.
#[derive(Parser, Debug)]
#[command(
    name = "discord-dl",
    version,
    about = "Download attachments from Discord channels",
    long_about = "A CLI tool to download message attachments from Discord server channels \
                  and direct messages.\n\n\
                  Files are named from templates and skipped when an identical copy already exists."
)]
pub struct Args {
    /// Channel ids or https://discord.com/channels/... URLs.
    pub channel_ids: Vec<String>,

    /// Discord authorization token.
    #[arg(short, long, env = "DISCORD_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// File with one channel id or URL per line.
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Root download directory. Must already exist.
    #[arg(short, long)]
    pub path: Option<PathBuf>,

    /// Path template for server channels.
    #[arg(long)]
    pub channel_format: Option<String>,

    /// Path template for direct messages.
    #[arg(long)]
    pub dm_format: Option<String>,

    /// Restrict filenames to printable ASCII.
    #[arg(long)]
    pub restrict_filenames: bool,

    /// Force Windows-compatible filenames.
    #[arg(long)]
    pub windows_filenames: bool,

    /// Seconds to sleep between requests.
    #[arg(long)]
    pub sleep: Option<f64>,

    /// Extra random sleep between A and B seconds.
    #[arg(long, num_args = 2, value_names = ["A", "B"])]
    pub sleep_random: Option<Vec<f64>>,

    /// Attempts per request before giving up.
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Only download from these user ids (comma separated).
    #[arg(long = "user-id", value_delimiter = ',')]
    pub user_ids: Vec<String>,

    /// Only download from these usernames (comma separated).
    #[arg(long = "username", value_delimiter = ',')]
    pub usernames: Vec<String>,

    /// Number of most recent messages to scan. Negative means all.
    #[arg(long, allow_negative_numbers = true)]
    pub message_count: Option<i64>,

    /// Only messages posted on this date (YYYYMMDD).
    #[arg(long, value_parser = parse_cli_date)]
    pub date: Option<NaiveDate>,

    /// Only messages posted before this date (YYYYMMDD).
    #[arg(long, value_parser = parse_cli_date)]
    pub date_before: Option<NaiveDate>,

    /// Only messages posted after this date (YYYYMMDD).
    #[arg(long, value_parser = parse_cli_date)]
    pub date_after: Option<NaiveDate>,

    /// Log what would be downloaded without touching the network or disk.
    #[arg(short, long)]
    pub simulate: bool,

    /// Enable debug logging.
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log warnings and errors, hide progress.
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl Args {
    /// Merge CLI arguments into an existing config, overriding where specified.
    pub fn merge_into_config(self, config: &mut Config) {
        // Channels given on the command line add to the configured ones
        config.channels.ids.extend(self.channel_ids);

        if let Some(token) = self.token {
            config.account.token = token;
        }

        if let Some(file) = self.file {
            config.channels.file = Some(file);
        }

        if let Some(path) = self.path {
            config.output.path = path;
        }

        if let Some(format) = self.channel_format {
            config.output.channel_format = format;
        }

        if let Some(format) = self.dm_format {
            config.output.dm_format = format;
        }

        // Boolean flags (only override if set)
        if self.restrict_filenames {
            config.output.restrict_filenames = true;
        }

        if self.windows_filenames {
            config.output.windows_filenames = true;
        }

        if self.simulate {
            config.output.simulate = true;
        }

        if self.quiet {
            config.output.show_progress = false;
            config.output.show_stats = false;
        }

        if let Some(sleep) = self.sleep {
            config.pacing.sleep = sleep;
        }

        if let Some([low, high]) = self.sleep_random.as_deref() {
            config.pacing.sleep_random = [*low, *high];
        }

        if let Some(retries) = self.max_retries {
            config.pacing.max_retries = retries;
        }

        if !self.user_ids.is_empty() {
            config.filters.user_ids = self.user_ids;
        }

        if !self.usernames.is_empty() {
            config.filters.usernames = self.usernames;
        }

        if self.message_count.is_some() {
            config.filters.message_count = self.message_count;
        }

        if self.date.is_some() {
            config.filters.date = self.date;
        }

        if self.date_before.is_some() {
            config.filters.date_before = self.date_before;
        }

        if self.date_after.is_some() {
            config.filters.date_after = self.date_after;
        }
    }
}
