//! API response type definitions.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Deserialize;

use crate::error::{Error, Result};

/// Channel object from `GET /channels/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Channel {
    pub id: String,
    /// Present only for channels that belong to a server.
    #[serde(default)]
    pub guild_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
}

/// Server object from `GET /guilds/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Guild {
    pub id: String,
    pub name: String,
    pub owner_id: String,
}

/// Message author.
#[derive(Debug, Clone, Deserialize)]
pub struct Author {
    pub id: String,
    pub username: String,
}

/// A file attached to a message.
#[derive(Debug, Clone, Deserialize)]
pub struct Attachment {
    pub id: String,
    pub filename: String,
    pub url: String,
}

/// A channel message.
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub id: String,
    pub author: Author,
    /// ISO-8601 timestamp, e.g. `2023-03-01T10:00:00.000000+00:00`.
    pub timestamp: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl Message {
    /// Parse the message timestamp, keeping its UTC offset.
    ///
    /// Fractional seconds are optional.
    pub fn posted_at(&self) -> Result<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(&self.timestamp).map_err(|e| {
            Error::Api(format!(
                "Invalid timestamp '{}' on message {}: {}",
                self.timestamp, self.id, e
            ))
        })
    }

    /// Calendar date the message was posted on, in the timestamp's own offset.
    pub fn posted_on(&self) -> Result<NaiveDate> {
        Ok(self.posted_at()?.date_naive())
    }
}

/// Error body returned by the API on failure.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: String,
    /// Seconds to wait when rate limited.
    #[serde(default)]
    pub retry_after: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_message() {
        let json = r#"{
            "id": "1081",
            "type": 0,
            "content": "look",
            "author": {"id": "42", "username": "alice", "discriminator": "0"},
            "timestamp": "2023-03-01T10:00:00.000000+00:00",
            "attachments": [
                {"id": "9", "filename": "cat.png", "url": "https://cdn.discordapp.com/attachments/1/9/cat.png", "size": 1234}
            ]
        }"#;
        let message: Message = serde_json::from_str(json).unwrap();
        assert_eq!(message.author.username, "alice");
        assert_eq!(message.attachments.len(), 1);
        assert_eq!(message.attachments[0].filename, "cat.png");
        assert_eq!(
            message.posted_on().unwrap(),
            NaiveDate::from_ymd_opt(2023, 3, 1).unwrap()
        );
    }

    #[test]
    fn test_timestamp_without_fraction() {
        let message = Message {
            id: "1".into(),
            author: Author {
                id: "2".into(),
                username: "bob".into(),
            },
            timestamp: "2023-03-01T23:30:00-05:00".into(),
            attachments: Vec::new(),
        };
        // Date stays in the message's own offset, not UTC.
        assert_eq!(
            message.posted_on().unwrap(),
            NaiveDate::from_ymd_opt(2023, 3, 1).unwrap()
        );
    }

    #[test]
    fn test_dm_channel_has_no_guild() {
        let channel: Channel = serde_json::from_str(r#"{"id": "5", "type": 1}"#).unwrap();
        assert!(channel.guild_id.is_none());

        let channel: Channel = serde_json::from_str(
            r#"{"id": "6", "type": 0, "guild_id": "7", "name": "art", "topic": null}"#,
        )
        .unwrap();
        assert_eq!(channel.guild_id.as_deref(), Some("7"));
        assert!(channel.topic.is_none());
    }
}
