//! Run orchestration: channels, messages, attachments.

use url::Url;

use crate::api::{Attachment, DiscordApi, Fetch, Message};
use crate::config::Config;
use crate::download::channel::{resolve_channel_info, ChannelInfo};
use crate::download::engine::{download_with_retry, DownloadOptions};
use crate::download::filter::MessageFilter;
use crate::download::messages::fetch_channel_messages;
use crate::download::pacing::Pacer;
use crate::download::retry::RetryPolicy;
use crate::download::state::{ChannelStats, RunStats};
use crate::error::{Error, Result};
use crate::fs::{build_file_path, FormatVariables, NamingOptions};
use crate::output::print_channel_stats;

/// Host serving Discord attachments.
pub const CDN_HOST: &str = "cdn.discordapp.com";

/// Whether an attachment URL is served by the Discord CDN.
pub fn is_cdn_url(url: &str) -> bool {
    Url::parse(url)
        .map(|u| u.scheme() == "https" && u.host_str() == Some(CDN_HOST))
        .unwrap_or(false)
}

/// Downloads the attachments of every configured channel, one at a time.
pub struct Downloader<'a> {
    api: &'a dyn DiscordApi,
    fetcher: &'a dyn Fetch,
    config: &'a Config,
    filter: MessageFilter,
    pacer: Pacer,
    policy: RetryPolicy,
    options: DownloadOptions,
    naming: NamingOptions,
}

impl<'a> Downloader<'a> {
    pub fn new(api: &'a dyn DiscordApi, fetcher: &'a dyn Fetch, config: &'a Config) -> Self {
        Self {
            api,
            fetcher,
            config,
            filter: MessageFilter::from_config(&config.filters),
            pacer: Pacer::from_config(&config.pacing),
            policy: RetryPolicy::new(config.pacing.max_retries),
            options: DownloadOptions {
                simulate: config.output.simulate,
                show_progress: config.output.show_progress,
            },
            naming: config.naming(),
        }
    }

    /// Process every configured channel in order.
    ///
    /// A failing channel is logged and counted; only template errors, which
    /// would fail every channel the same way, abort the run.
    pub async fn run(&self) -> Result<RunStats> {
        let mut run = RunStats::default();

        for channel_id in &self.config.channels.ids {
            match self.process_channel(channel_id).await {
                Ok(stats) => {
                    if self.config.output.show_stats {
                        print_channel_stats(&stats);
                    }
                    run.add_channel_stats(&stats);
                }
                Err(e @ Error::Template(_)) => return Err(e),
                Err(e) => {
                    tracing::error!("Failed to process channel {}: {}", channel_id, e);
                    run.mark_channel_failed();
                }
            }
        }

        Ok(run)
    }

    /// Download the attachments of one channel.
    pub async fn process_channel(&self, channel_id: &str) -> Result<ChannelStats> {
        let mut stats = ChannelStats::new(channel_id.to_string());

        let info = resolve_channel_info(self.api, channel_id).await?;
        stats.channel_name = Some(info.display_name());

        let messages = fetch_channel_messages(
            self.api,
            channel_id,
            self.config.filters.message_limit(),
            &self.pacer,
            &self.policy,
        )
        .await?;
        stats.messages_fetched = messages.len() as u64;

        let messages = self.filter.apply(messages);
        stats.messages_matched = messages.len() as u64;
        tracing::info!(
            "{} of {} messages match in {}",
            stats.messages_matched,
            stats.messages_fetched,
            info.display_name()
        );

        for message in &messages {
            for attachment in &message.attachments {
                self.process_attachment(&info, message, attachment, &mut stats)
                    .await?;
                self.pacer.pause().await;
            }
        }

        Ok(stats)
    }

    async fn process_attachment(
        &self,
        info: &ChannelInfo,
        message: &Message,
        attachment: &Attachment,
        stats: &mut ChannelStats,
    ) -> Result<()> {
        if !is_cdn_url(&attachment.url) {
            tracing::warn!("Attachment not hosted by discord {}", attachment.url);
            stats.increment_rejected();
            return Ok(());
        }

        let path = FormatVariables::new(message, attachment, info).and_then(|vars| {
            build_file_path(
                &vars,
                &self.config.output.path,
                &self.config.output.channel_format,
                &self.config.output.dm_format,
                self.naming,
            )
        });

        let path = match path {
            Ok(path) => path,
            Err(e @ Error::Template(_)) => return Err(e),
            Err(e) => {
                tracing::warn!(
                    "Skipping attachment {} of message {}: {}",
                    attachment.id,
                    message.id,
                    e
                );
                stats.increment_path_errors();
                return Ok(());
            }
        };

        let outcome = download_with_retry(
            self.fetcher,
            &attachment.url,
            &path,
            &self.options,
            &self.policy,
        )
        .await;
        stats.record(outcome);

        Ok(())
    }
}
