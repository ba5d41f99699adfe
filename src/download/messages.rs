//! Channel message history retrieval.

use crate::api::{DiscordApi, Message, PAGE_LIMIT};
use crate::download::pacing::Pacer;
use crate::download::retry::{retry_transient, RetryPolicy};
use crate::error::Result;

/// Fetch the message history of a channel, newest first.
///
/// Pages are requested with a `before` cursor set to the oldest message seen
/// so far until a short page comes back or `limit` messages were collected.
/// `Some(0)` returns immediately without a request; `None` is unbounded.
pub async fn fetch_channel_messages(
    api: &dyn DiscordApi,
    channel_id: &str,
    limit: Option<usize>,
    pacer: &Pacer,
    policy: &RetryPolicy,
) -> Result<Vec<Message>> {
    if limit == Some(0) {
        tracing::debug!("Message count is 0, skipping channel id {}", channel_id);
        return Ok(Vec::new());
    }

    let mut messages: Vec<Message> = Vec::new();
    let mut before: Option<String> = None;

    loop {
        match before.as_deref() {
            Some(id) => tracing::info!(
                "Getting messages before message id {} for channel id {}",
                id,
                channel_id
            ),
            None => tracing::info!("Getting messages for channel id {}", channel_id),
        }

        let page = retry_transient(policy, "messages", || {
            api.get_messages(channel_id, before.as_deref())
        })
        .await?;

        let page_len = page.len();
        if let Some(last) = page.last() {
            before = Some(last.id.clone());
        }
        messages.extend(page);

        if let Some(limit) = limit {
            if messages.len() >= limit {
                messages.truncate(limit);
                break;
            }
        }

        if page_len < PAGE_LIMIT {
            break;
        }

        pacer.pause().await;
    }

    tracing::debug!(
        "Got {} messages for channel id {}",
        messages.len(),
        channel_id
    );

    Ok(messages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Author, Channel, Guild};
    use crate::error::Error;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Channel with `count` messages, ids `count..=1`, newest first.
    struct History {
        ids: Vec<u64>,
        cursors: Mutex<Vec<Option<String>>>,
        failures_left: Mutex<u32>,
    }

    impl History {
        fn new(count: u64) -> Self {
            Self {
                ids: (1..=count).rev().collect(),
                cursors: Mutex::new(Vec::new()),
                failures_left: Mutex::new(0),
            }
        }

        fn requests(&self) -> Vec<Option<String>> {
            self.cursors.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DiscordApi for History {
        async fn get_channel(&self, _: &str) -> Result<Channel> {
            Err(Error::Api("not used".into()))
        }

        async fn get_guild(&self, _: &str) -> Result<Guild> {
            Err(Error::Api("not used".into()))
        }

        async fn get_messages(&self, _: &str, before: Option<&str>) -> Result<Vec<Message>> {
            self.cursors
                .lock()
                .unwrap()
                .push(before.map(str::to_string));

            {
                let mut failures = self.failures_left.lock().unwrap();
                if *failures > 0 {
                    *failures -= 1;
                    return Err(Error::ServerError(502));
                }
            }

            let before: u64 = before.map(|b| b.parse().unwrap()).unwrap_or(u64::MAX);
            Ok(self
                .ids
                .iter()
                .filter(|id| **id < before)
                .take(PAGE_LIMIT)
                .map(|id| Message {
                    id: id.to_string(),
                    author: Author {
                        id: "1".into(),
                        username: "alice".into(),
                    },
                    timestamp: "2023-03-01T10:00:00+00:00".into(),
                    attachments: Vec::new(),
                })
                .collect())
        }
    }

    async fn fetch(api: &History, limit: Option<usize>) -> Vec<Message> {
        fetch_channel_messages(api, "5", limit, &Pacer::default(), &RetryPolicy::new(3))
            .await
            .unwrap()
    }

    fn ids(messages: &[Message]) -> Vec<u64> {
        messages.iter().map(|m| m.id.parse().unwrap()).collect()
    }

    #[tokio::test]
    async fn test_walks_all_pages() {
        let api = History::new(123);
        let messages = fetch(&api, None).await;

        assert_eq!(ids(&messages), (1..=123).rev().collect::<Vec<_>>());
        assert_eq!(
            api.requests(),
            vec![None, Some("74".to_string()), Some("24".to_string())]
        );
    }

    #[tokio::test]
    async fn test_cursors_strictly_decrease() {
        let api = History::new(250);
        fetch(&api, None).await;

        let cursors: Vec<u64> = api
            .requests()
            .into_iter()
            .flatten()
            .map(|c| c.parse().unwrap())
            .collect();
        assert!(cursors.windows(2).all(|w| w[0] > w[1]));
        // 5 full pages, then an empty one.
        assert_eq!(api.requests().len(), 6);
    }

    #[tokio::test]
    async fn test_limit_truncates() {
        let api = History::new(123);
        let messages = fetch(&api, Some(60)).await;

        assert_eq!(messages.len(), 60);
        assert_eq!(messages[0].id, "123");
        assert_eq!(api.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_limit_above_total() {
        let api = History::new(30);
        assert_eq!(fetch(&api, Some(100)).await.len(), 30);
        assert_eq!(api.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_zero_limit_makes_no_request() {
        let api = History::new(30);
        assert!(fetch(&api, Some(0)).await.is_empty());
        assert!(api.requests().is_empty());
    }

    #[tokio::test]
    async fn test_empty_channel() {
        let api = History::new(0);
        assert!(fetch(&api, None).await.is_empty());
        assert_eq!(api.requests(), vec![None]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pacing_between_pages() {
        let api = History::new(120);
        let pacer = Pacer::new(5.0, (0.0, 0.0));
        let start = tokio::time::Instant::now();

        let messages =
            fetch_channel_messages(&api, "5", None, &pacer, &RetryPolicy::new(3))
                .await
                .unwrap();

        assert_eq!(messages.len(), 120);
        assert_eq!(api.requests().len(), 3);
        // Two pauses: after the first and second full pages, none after the last.
        assert_eq!(start.elapsed(), std::time::Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_page_failure_retried() {
        let api = History::new(10);
        *api.failures_left.lock().unwrap() = 2;

        let messages = fetch(&api, None).await;

        assert_eq!(messages.len(), 10);
        assert_eq!(api.requests(), vec![None, None, None]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries_fail_channel() {
        let api = History::new(10);
        *api.failures_left.lock().unwrap() = 5;

        let result =
            fetch_channel_messages(&api, "5", None, &Pacer::default(), &RetryPolicy::new(3)).await;

        assert!(matches!(result, Err(Error::ServerError(502))));
        assert_eq!(api.requests().len(), 3);
    }
}
