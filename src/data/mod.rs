pub mod models;

use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use deadpool_postgres::{Config as PoolConfig, ManagerConfig, Pool, RecyclingMethod, Runtime};
use models::GuildFeedSettings;
use serenity::async_trait;
use tokio_postgres::NoTls;

/// Read side of the per-guild settings, plus the daily run marker.
///
/// Settings are written by external admin tooling; this bot only reads them.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn settings(&self, guild_id: u64) -> Result<Option<GuildFeedSettings>>;

    /// Records that the broadcast for `date` has started. Returns `false` when
    /// another run already claimed that date.
    async fn claim(&self, date: NaiveDate) -> Result<bool>;
}

pub struct Database {
    pool: Pool,
}

impl Database {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Builds the pool without opening a connection; the first query connects.
    pub fn connect(url: &str) -> Result<Self> {
        let mut config = PoolConfig::new();
        config.url = Some(url.to_string());
        config.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        let pool = config.create_pool(Some(Runtime::Tokio1), NoTls)?;
        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> Result<()> {
        let client = self.pool.get().await?;
        client
            .batch_execute(include_str!("../../migrations/0001_init.sql"))
            .await?;
        Ok(())
    }

    pub fn close(&self) {
        self.pool.close();
    }
}

#[async_trait]
impl SettingsStore for Database {
    async fn settings(&self, guild_id: u64) -> Result<Option<GuildFeedSettings>> {
        let client = self.pool.get().await?;
        let guild_id = guild_id.to_string();

        let row = client
            .query_opt(
                "SELECT guild_id, news_channel_id, vulnerability_channel_id, distro_channel_id \
                 FROM guild_settings WHERE guild_id = $1",
                &[&guild_id],
            )
            .await?;

        match row {
            Some(row) => Ok(Some(GuildFeedSettings {
                guild_id: row.try_get("guild_id")?,
                news_channel_id: row.try_get("news_channel_id")?,
                vulnerability_channel_id: row.try_get("vulnerability_channel_id")?,
                distro_channel_id: row.try_get("distro_channel_id")?,
            })),
            None => Ok(None),
        }
    }

    async fn claim(&self, date: NaiveDate) -> Result<bool> {
        let client = self.pool.get().await?;

        let inserted = client
            .execute(
                "INSERT INTO broadcast_runs (run_date, fired_at) VALUES ($1, now()) \
                 ON CONFLICT (run_date) DO NOTHING",
                &[&date],
            )
            .await?;
        Ok(inserted > 0)
    }
}

/// Stands in for the database when it could not even be configured; every
/// lookup fails, so broadcasts skip each guild.
pub struct Unavailable {
    reason: String,
}

impl Unavailable {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl SettingsStore for Unavailable {
    async fn settings(&self, _guild_id: u64) -> Result<Option<GuildFeedSettings>> {
        Err(anyhow!("Settings store unavailable: {}", self.reason))
    }

    async fn claim(&self, _date: NaiveDate) -> Result<bool> {
        Err(anyhow!("Settings store unavailable: {}", self.reason))
    }
}
