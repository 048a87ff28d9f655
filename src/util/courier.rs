use std::sync::Arc;

use anyhow::{Result, anyhow};
use serenity::{
    all::{Cache, CreateMessage, Http},
    async_trait,
    model::id::{ChannelId, GuildId},
};

use crate::cmd::card::Card;

/// The slice of the chat platform the bot depends on: which guilds it sits in,
/// which channels those guilds have, and a way to post a card.
#[async_trait]
pub trait Courier: Send + Sync {
    fn guilds(&self) -> Vec<u64>;

    /// Whether `channel_id` is a live channel of `guild_id`.
    fn resolve(&self, guild_id: u64, channel_id: u64) -> bool;

    async fn send(&self, channel_id: u64, card: &Card) -> Result<()>;
}

pub struct Discord {
    http: Arc<Http>,
    cache: Arc<Cache>,
}

impl Discord {
    pub fn new(http: Arc<Http>, cache: Arc<Cache>) -> Self {
        Self { http, cache }
    }
}

#[async_trait]
impl Courier for Discord {
    fn guilds(&self) -> Vec<u64> {
        self.cache.guilds().into_iter().map(|id| id.get()).collect()
    }

    fn resolve(&self, guild_id: u64, channel_id: u64) -> bool {
        if guild_id == 0 || channel_id == 0 {
            return false;
        }

        self.cache
            .guild(GuildId::new(guild_id))
            .is_some_and(|guild| guild.channels.contains_key(&ChannelId::new(channel_id)))
    }

    async fn send(&self, channel_id: u64, card: &Card) -> Result<()> {
        if channel_id == 0 {
            return Err(anyhow!("Invalid channel id 0"));
        }

        ChannelId::new(channel_id)
            .send_message(&self.http, CreateMessage::new().embed(card.embed()))
            .await?;
        Ok(())
    }
}
