//! Destination path templating.
//!
//! Templates look like `{date:%Y-%m-%d}/{username}/{id}_{filename}.{ext}`.
//! Each `/`-separated segment is rendered on its own and sanitized, the last
//! one as a filename and the rest as folder names.

use std::fmt::Write;
use std::path::{Path, PathBuf};

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset};

use crate::api::{Attachment, Message};
use crate::download::channel::ChannelInfo;
use crate::error::{Error, Result};
use crate::fs::naming::{sanitize_filename, sanitize_foldername, split_extension, NamingOptions};

/// Rendering of `{date}` when no format is given.
const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%:z";

/// Variables available to a path template for one attachment.
#[derive(Debug, Clone)]
pub struct FormatVariables<'a> {
    pub message_id: String,
    /// Attachment id.
    pub id: String,
    /// Attachment filename without its extension.
    pub filename: String,
    /// Attachment extension without the dot.
    pub ext: String,
    pub date: DateTime<FixedOffset>,
    pub username: String,
    pub user_id: String,
    pub channel: &'a ChannelInfo,
}

/// A resolved template variable.
enum Value<'v> {
    Text(&'v str),
    Date(&'v DateTime<FixedOffset>),
}

impl<'a> FormatVariables<'a> {
    /// Collect the variables for an attachment of a message.
    pub fn new(message: &Message, attachment: &Attachment, channel: &'a ChannelInfo) -> Result<Self> {
        let (filename, ext) = split_extension(&attachment.filename);

        Ok(Self {
            message_id: message.id.clone(),
            id: attachment.id.clone(),
            filename: filename.to_string(),
            ext: ext.to_string(),
            date: message.posted_at()?,
            username: message.author.username.clone(),
            user_id: message.author.id.clone(),
            channel,
        })
    }

    fn lookup(&self, name: &str) -> Result<Value<'_>> {
        let value = match name {
            "message_id" => Value::Text(&self.message_id),
            "id" => Value::Text(&self.id),
            "filename" => Value::Text(&self.filename),
            "ext" => Value::Text(&self.ext),
            "date" => Value::Date(&self.date),
            "username" => Value::Text(&self.username),
            "user_id" => Value::Text(&self.user_id),
            "channel_id" => Value::Text(&self.channel.channel_id),
            "server_id" | "server_name" | "server_owner_id" | "channel_name" | "channel_topic" => {
                let server = self.channel.server.as_ref().ok_or_else(|| {
                    Error::Template(format!(
                        "variable '{}' is only available for server channels",
                        name
                    ))
                })?;
                Value::Text(match name {
                    "server_id" => server.server_id.as_str(),
                    "server_name" => server.server_name.as_str(),
                    "server_owner_id" => server.server_owner_id.as_str(),
                    "channel_name" => server.channel_name.as_str(),
                    _ => server.channel_topic.as_deref().unwrap_or(""),
                })
            }
            _ => return Err(Error::Template(format!("unknown variable '{}'", name))),
        };
        Ok(value)
    }
}

/// Render one template segment.
///
/// `{name}` is replaced by the variable, `{date:FMT}` formats the date with a
/// strftime format, `{{` and `}}` are literal braces.
pub fn render_segment(segment: &str, vars: &FormatVariables<'_>) -> Result<String> {
    let mut out = String::with_capacity(segment.len());
    let mut chars = segment.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '}' => {
                return Err(Error::Template(format!(
                    "single '}}' encountered in '{}'",
                    segment
                )))
            }
            '{' => {
                let mut field = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(c) => field.push(c),
                        None => {
                            return Err(Error::Template(format!(
                                "unterminated placeholder in '{}'",
                                segment
                            )))
                        }
                    }
                }
                let (name, spec) = match field.split_once(':') {
                    Some((name, spec)) => (name, Some(spec)),
                    None => (field.as_str(), None),
                };
                render_value(&mut out, vars.lookup(name.trim())?, name, spec)?;
            }
            c => out.push(c),
        }
    }

    Ok(out)
}

fn render_value(out: &mut String, value: Value<'_>, name: &str, spec: Option<&str>) -> Result<()> {
    match (value, spec) {
        (Value::Text(text), None) => out.push_str(text),
        (Value::Text(_), Some(spec)) => {
            return Err(Error::Template(format!(
                "format '{}' not supported for variable '{}'",
                spec, name
            )))
        }
        (Value::Date(date), spec) => {
            let format = spec.filter(|s| !s.is_empty()).unwrap_or(DEFAULT_DATE_FORMAT);
            if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
                return Err(Error::Template(format!("invalid date format '{}'", format)));
            }
            write!(out, "{}", date.format_with_items(StrftimeItems::new(format)))
                .map_err(|_| Error::Template(format!("cannot render date with '{}'", format)))?;
        }
    }
    Ok(())
}

/// Build the absolute destination path of an attachment.
///
/// Server channels use `channel_format`, direct messages use `dm_format`.
pub fn build_file_path(
    vars: &FormatVariables<'_>,
    root: &Path,
    channel_format: &str,
    dm_format: &str,
    naming: NamingOptions,
) -> Result<PathBuf> {
    let template = if vars.channel.is_server() {
        channel_format
    } else {
        dm_format
    };

    let segments: Vec<&str> = template
        .split(std::path::is_separator)
        .filter(|s| !s.is_empty())
        .collect();

    let (file_segment, folder_segments) = segments
        .split_last()
        .ok_or_else(|| Error::Template(format!("template '{}' has no filename", template)))?;

    let mut path = root.to_path_buf();

    for segment in folder_segments {
        let folder = sanitize_foldername(&render_segment(segment, vars)?, naming);
        if folder.is_empty() {
            continue;
        }
        check_component(&folder)?;
        path.push(folder);
    }

    let filename = sanitize_filename(&render_segment(file_segment, vars)?, naming);
    if filename.is_empty() {
        return Err(Error::InvalidFilename(format!(
            "template '{}' rendered an empty filename",
            file_segment
        )));
    }
    check_component(&filename)?;
    path.push(filename);

    Ok(path)
}

fn check_component(name: &str) -> Result<()> {
    if name == "." || name == ".." {
        return Err(Error::InvalidFilename(format!(
            "Path traversal detected: '{}'",
            name
        )));
    }
    Ok(())
}
