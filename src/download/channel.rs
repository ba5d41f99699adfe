//! Channel and server metadata lookup.

use crate::api::DiscordApi;
use crate::error::Result;

/// Server-side details of a channel that belongs to a server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerContext {
    pub server_id: String,
    pub server_name: String,
    pub server_owner_id: String,
    pub channel_name: String,
    pub channel_topic: Option<String>,
}

/// Metadata of a channel as used by path templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
    pub channel_id: String,
    /// `None` for direct-message channels.
    pub server: Option<ServerContext>,
}

impl ChannelInfo {
    /// Whether the channel belongs to a server (as opposed to a DM).
    pub fn is_server(&self) -> bool {
        self.server.is_some()
    }

    /// Human readable name for logs.
    pub fn display_name(&self) -> String {
        match &self.server {
            Some(server) => format!("#{} ({})", server.channel_name, server.server_name),
            None => format!("direct messages {}", self.channel_id),
        }
    }
}

/// Resolve a channel id to its metadata, including its server if it has one.
pub async fn resolve_channel_info(api: &dyn DiscordApi, channel_id: &str) -> Result<ChannelInfo> {
    tracing::info!("Getting channel info for channel id {}", channel_id);
    let channel = api.get_channel(channel_id).await?;

    let server = match channel.guild_id.as_deref() {
        Some(guild_id) => {
            tracing::info!("Getting server info for server id {}", guild_id);
            let guild = api.get_guild(guild_id).await?;
            Some(ServerContext {
                server_id: guild.id,
                server_name: guild.name,
                server_owner_id: guild.owner_id,
                channel_name: channel.name.unwrap_or_default(),
                channel_topic: channel.topic,
            })
        }
        None => None,
    };

    Ok(ChannelInfo {
        channel_id: channel.id,
        server,
    })
}
