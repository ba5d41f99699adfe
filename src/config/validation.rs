//! Configuration validation logic.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use regex::Regex;

use crate::config::loader::Config;
use crate::error::{Error, Result};

/// Validate the entire configuration.
///
/// Channel ids are expected to be resolved already (see [`resolve_channel_ids`]).
pub fn validate_config(config: &Config) -> Result<()> {
    validate_token(&config.account.token)?;
    validate_root_path(&config.output.path)?;
    validate_formats(&config.output.channel_format, &config.output.dm_format)?;
    validate_pacing(
        config.pacing.sleep,
        config.pacing.sleep_random,
        config.pacing.max_retries,
    )?;

    if config.channels.ids.is_empty() {
        return Err(Error::MissingConfig(
            "channel ids (at least one channel id or URL required)".to_string(),
        ));
    }

    Ok(())
}

/// Validate the authorization token.
pub fn validate_token(token: &str) -> Result<()> {
    if token.trim().is_empty() {
        return Err(Error::MissingConfig("token".to_string()));
    }

    let token_lower = token.to_lowercase();
    if token_lower.contains("replaceme") || token_lower.contains("your_token") {
        return Err(Error::ConfigValidation {
            field: "token".to_string(),
            message: "Token appears to be a placeholder. Please provide your actual Discord token."
                .to_string(),
        });
    }

    Ok(())
}

/// The root download directory must exist; it is never created implicitly.
pub fn validate_root_path(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(Error::ConfigValidation {
            field: "path".to_string(),
            message: format!("Path does not exist: {}", path.display()),
        });
    }

    if !path.is_dir() {
        return Err(Error::ConfigValidation {
            field: "path".to_string(),
            message: format!("Path is not a directory: {}", path.display()),
        });
    }

    Ok(())
}

fn validate_formats(channel_format: &str, dm_format: &str) -> Result<()> {
    for (field, format) in [("channel_format", channel_format), ("dm_format", dm_format)] {
        if format.trim().is_empty() {
            return Err(Error::ConfigValidation {
                field: field.to_string(),
                message: "Format cannot be empty".to_string(),
            });
        }
    }
    Ok(())
}

/// Validate sleep and retry settings.
pub fn validate_pacing(sleep: f64, sleep_random: [f64; 2], max_retries: u32) -> Result<()> {
    if !sleep.is_finite() || sleep < 0.0 {
        return Err(Error::ConfigValidation {
            field: "sleep".to_string(),
            message: format!("Sleep must be a non-negative number of seconds (got {})", sleep),
        });
    }

    let [low, high] = sleep_random;
    if !low.is_finite() || !high.is_finite() || low < 0.0 || high < low {
        return Err(Error::ConfigValidation {
            field: "sleep_random".to_string(),
            message: format!(
                "Random sleep range must satisfy 0 <= A <= B (got {} {})",
                low, high
            ),
        });
    }

    if max_retries == 0 {
        return Err(Error::ConfigValidation {
            field: "max_retries".to_string(),
            message: "At least one attempt is required".to_string(),
        });
    }

    Ok(())
}

/// Extract a channel id from a bare id or a channel URL.
///
/// Accepts `123456` and `https://discord.com/channels/<guild or @me>/123456`.
pub fn parse_channel_id(input: &str) -> Option<String> {
    let input = input.trim();

    let url_pattern = Regex::new(r"^https://(?:\w+\.)?discord(?:app)?\.com/channels/[^/]+/(\d+)")
        .expect("valid regex");
    if let Some(captures) = url_pattern.captures(input) {
        return captures.get(1).map(|m| m.as_str().to_string());
    }

    let id_pattern = Regex::new(r"^\d+$").expect("valid regex");
    if id_pattern.is_match(input) {
        return Some(input.to_string());
    }

    None
}

/// Turn the configured ids and URLs into bare channel ids, keeping order.
///
/// Entries that hold no channel id are dropped with a warning.
pub fn resolve_channel_ids<S: AsRef<str>, I: IntoIterator<Item = S>>(inputs: I) -> Vec<String> {
    inputs
        .into_iter()
        .filter_map(|input| {
            let input = input.as_ref();
            let id = parse_channel_id(input);
            if id.is_none() {
                tracing::warn!("Could not find discord channel id in: {}", input);
            }
            id
        })
        .collect()
}

/// Read channel ids from a file, one per line.
///
/// Blank lines and lines starting with `#` are ignored. A missing file only
/// produces a warning.
pub fn load_channel_file(path: &Path) -> Result<Vec<String>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!("Could not find file at location '{}'", path.display());
            return Ok(Vec::new());
        }
        Err(e) => return Err(Error::Io(e)),
    };

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

/// Parse a `YYYYMMDD` date as given on the command line.
pub fn parse_cli_date(input: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(input.trim(), "%Y%m%d")
        .map_err(|e| format!("expected a date in YYYYMMDD format: {}", e))
}
