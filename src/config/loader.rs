//! Configuration structures and loading logic.

use chrono::NaiveDate;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::fs::NamingOptions;

/// Name of the configuration file looked up when `--config` is not given.
pub const CONFIG_FILE_NAME: &str = "discord-dl.toml";

/// Template used for both channel and direct-message attachments by default.
pub const DEFAULT_FORMAT: &str = "{date:%Y-%m-%d}_{id}_{filename}.{ext}";

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub account: AccountConfig,

    #[serde(default)]
    pub channels: ChannelsConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub pacing: PacingConfig,

    #[serde(default)]
    pub filters: FilterConfig,
}

/// Account credentials configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Discord authorization token. Never logged.
    #[serde(default)]
    pub token: String,
}

/// Channels to download from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChannelsConfig {
    /// Channel ids or `https://discord.com/channels/...` URLs.
    #[serde(default)]
    pub ids: Vec<String>,

    /// File with one channel id or URL per line, `#` starts a comment line.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

/// Where and how attachments are written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Root download directory. Must already exist.
    #[serde(default = "default_path")]
    pub path: PathBuf,

    /// Path template for attachments posted in server channels.
    #[serde(default = "default_format")]
    pub channel_format: String,

    /// Path template for attachments posted in direct messages.
    #[serde(default = "default_format")]
    pub dm_format: String,

    /// Force Windows-compatible names even on other platforms.
    #[serde(default)]
    pub windows_filenames: bool,

    /// Restrict names to printable ASCII without spaces.
    #[serde(default)]
    pub restrict_filenames: bool,

    /// Go through the motions without touching the network or disk.
    #[serde(default)]
    pub simulate: bool,

    /// Draw the per-file progress line.
    #[serde(default = "default_true")]
    pub show_progress: bool,

    /// Print per-channel and run statistics.
    #[serde(default = "default_true")]
    pub show_stats: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            channel_format: default_format(),
            dm_format: default_format(),
            windows_filenames: false,
            restrict_filenames: false,
            simulate: false,
            show_progress: true,
            show_stats: true,
        }
    }
}

/// Delays and retries between requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacingConfig {
    /// Fixed seconds to sleep between attachments and between message pages.
    #[serde(default)]
    pub sleep: f64,

    /// Random seconds in `[a, b]` added on top of `sleep`.
    #[serde(default)]
    pub sleep_random: [f64; 2],

    /// Maximum attempts for a download or a message page.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            sleep: 0.0,
            sleep_random: [0.0, 0.0],
            max_retries: default_max_retries(),
        }
    }
}

/// Message filters. Every configured filter must pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Only keep messages from these author ids.
    #[serde(default)]
    pub user_ids: Vec<String>,

    /// Only keep messages from these usernames.
    #[serde(default)]
    pub usernames: Vec<String>,

    /// Only look at the newest N messages of each channel. Negative means all.
    #[serde(default)]
    pub message_count: Option<i64>,

    /// Only keep messages posted on this date.
    #[serde(default)]
    pub date: Option<NaiveDate>,

    /// Only keep messages posted strictly before this date.
    #[serde(default)]
    pub date_before: Option<NaiveDate>,

    /// Only keep messages posted strictly after this date.
    #[serde(default)]
    pub date_after: Option<NaiveDate>,
}

impl FilterConfig {
    /// Per-channel message bound; `None` when unset or negative.
    pub fn message_limit(&self) -> Option<usize> {
        self.message_count.and_then(|count| usize::try_from(count).ok())
    }
}

fn default_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("downloads")
}

fn default_format() -> String {
    DEFAULT_FORMAT.to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_retries() -> u32 {
    10
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::Config(format!(
                    "Configuration file not found: {}",
                    path.display()
                ))
            } else {
                Error::Io(e)
            }
        })?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Locate the configuration file to use when none was given explicitly.
    ///
    /// The working directory wins over the per-user config directory.
    pub fn discover() -> Option<PathBuf> {
        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.is_file() {
            return Some(local);
        }

        ProjectDirs::from("", "", "discord-dl")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
            .filter(|p| p.is_file())
    }

    /// Copy of the configuration that is safe to log.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if !config.account.token.is_empty() {
            config.account.token = "<redacted>".to_string();
        }
        config
    }

    /// Filename sanitization settings.
    pub fn naming(&self) -> NamingOptions {
        NamingOptions::new(
            self.output.windows_filenames,
            self.output.restrict_filenames,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.output.channel_format, DEFAULT_FORMAT);
        assert_eq!(config.output.dm_format, DEFAULT_FORMAT);
        assert_eq!(config.pacing.max_retries, 10);
        assert!(config.filters.message_count.is_none());
        assert!(config.output.path.ends_with("downloads"));
    }

    #[test]
    fn test_negative_message_count_in_file_is_unbounded() {
        let config: Config = toml::from_str("[filters]\nmessage_count = -1\n").unwrap();
        assert_eq!(config.filters.message_count, Some(-1));
        assert_eq!(config.filters.message_limit(), None);

        let config: Config = toml::from_str("[filters]\nmessage_count = 0\n").unwrap();
        assert_eq!(config.filters.message_limit(), Some(0));

        assert_eq!(Config::default().filters.message_limit(), None);
    }

    #[test]
    fn test_redacted_hides_token() {
        let mut config = Config::default();
        config.account.token = "mfa.secret".into();

        let dump = format!("{:?}", config.redacted());
        assert!(!dump.contains("mfa.secret"));
        assert!(dump.contains("<redacted>"));
        assert_eq!(config.account.token, "mfa.secret");
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[account]
token = "abc"

[channels]
ids = ["123", "https://discord.com/channels/1/456"]

[output]
path = "/tmp/media"
dm_format = "dms/{{username}}/{{id}}.{{ext}}"

[pacing]
sleep_random = [1.0, 2.5]

[filters]
usernames = ["alice"]
date_after = "2023-01-31"
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.account.token, "abc");
        assert_eq!(config.channels.ids.len(), 2);
        assert_eq!(config.output.path, PathBuf::from("/tmp/media"));
        assert_eq!(config.output.dm_format, "dms/{username}/{id}.{ext}");
        assert_eq!(config.output.channel_format, DEFAULT_FORMAT);
        assert_eq!(config.pacing.sleep_random, [1.0, 2.5]);
        assert_eq!(config.pacing.max_retries, 10);
        assert_eq!(
            config.filters.date_after,
            NaiveDate::from_ymd_opt(2023, 1, 31)
        );
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/nonexistent/discord-dl.toml")).unwrap_err();
        assert!(err.is_config());
    }
}
