//! Message filtering by date and author.

use chrono::NaiveDate;

use crate::api::Message;
use crate::config::FilterConfig;

/// Conjunction of optional predicates on messages.
///
/// Date bounds are exclusive and compare calendar dates only.
#[derive(Debug, Clone, Default)]
pub struct MessageFilter {
    pub date: Option<NaiveDate>,
    pub date_before: Option<NaiveDate>,
    pub date_after: Option<NaiveDate>,
    pub user_ids: Vec<String>,
    pub usernames: Vec<String>,
}

impl MessageFilter {
    pub fn from_config(config: &FilterConfig) -> Self {
        Self {
            date: config.date,
            date_before: config.date_before,
            date_after: config.date_after,
            user_ids: config.user_ids.clone(),
            usernames: config.usernames.clone(),
        }
    }

    /// Whether no predicate is configured.
    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.date_before.is_none()
            && self.date_after.is_none()
            && self.user_ids.is_empty()
            && self.usernames.is_empty()
    }

    fn has_date_filter(&self) -> bool {
        self.date.is_some() || self.date_before.is_some() || self.date_after.is_some()
    }

    /// Check a single message against every configured predicate.
    pub fn matches(&self, message: &Message) -> bool {
        if self.has_date_filter() {
            let posted_on = match message.posted_on() {
                Ok(date) => date,
                Err(e) => {
                    tracing::warn!("{}", e);
                    return false;
                }
            };

            if let Some(date) = self.date {
                if posted_on != date {
                    tracing::debug!(
                        "Message date {} != date {} for message id {}",
                        posted_on,
                        date,
                        message.id
                    );
                    return false;
                }
            }

            if let Some(before) = self.date_before {
                if posted_on >= before {
                    tracing::debug!(
                        "Message date {} >= date_before {} for message id {}",
                        posted_on,
                        before,
                        message.id
                    );
                    return false;
                }
            }

            if let Some(after) = self.date_after {
                if posted_on <= after {
                    tracing::debug!(
                        "Message date {} <= date_after {} for message id {}",
                        posted_on,
                        after,
                        message.id
                    );
                    return false;
                }
            }
        }

        if !self.usernames.is_empty() && !self.usernames.contains(&message.author.username) {
            tracing::debug!(
                "Message username {} is not in {:?} for message id {}",
                message.author.username,
                self.usernames,
                message.id
            );
            return false;
        }

        if !self.user_ids.is_empty() && !self.user_ids.contains(&message.author.id) {
            tracing::debug!(
                "Message user id {} is not in {:?} for message id {}",
                message.author.id,
                self.user_ids,
                message.id
            );
            return false;
        }

        true
    }

    /// Keep the messages that pass, preserving order.
    pub fn apply(&self, messages: Vec<Message>) -> Vec<Message> {
        if self.is_empty() {
            return messages;
        }
        messages.into_iter().filter(|m| self.matches(m)).collect()
    }
}
