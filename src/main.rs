use std::sync::Arc;

use anyhow::Result;
use serenity::{
    all::{ActivityData, Message, OnlineStatus, Ready},
    async_trait,
    prelude::*,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod cmd;
mod config;
mod data;
mod feeds;
mod scheduler;
mod util;

use cmd::Inbound;
use config::Config;
use data::{Database, SettingsStore, Unavailable};
use feeds::Feeds;
use util::{
    courier::{Courier, Discord},
    fetcher,
};

struct Handler {
    feeds: Arc<Feeds>,
    prefix: char,
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, ctx: Context, msg: Message) {
        let courier = Discord::new(ctx.http.clone(), ctx.cache.clone());
        let inbound = Inbound {
            author_is_bot: msg.author.bot,
            content: &msg.content,
            channel_id: msg.channel_id.get(),
        };

        match cmd::handle(&self.feeds, &courier, self.prefix, inbound).await {
            Ok(Some(command)) => info!("Served {} command for {}", command.name(), msg.author.name),
            Ok(None) => {}
            Err(e) => error!("Command error: {}", e),
        }
    }

    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(
            "{} is connected to {} guilds!",
            ready.user.name,
            ready.guilds.len()
        );
        ctx.set_presence(
            Some(ActivityData::watching("security feeds")),
            OnlineStatus::Online,
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load()?;

    let (store, database): (Arc<dyn SettingsStore>, Option<Arc<Database>>) =
        match Database::connect(&config.database_url) {
            Ok(database) => {
                let database = Arc::new(database);
                match database.migrate().await {
                    Ok(()) => info!("Connected to settings store"),
                    Err(e) => error!("Settings store unavailable, broadcasts will skip guilds: {}", e),
                }
                (database.clone(), Some(database))
            }
            Err(e) => {
                error!("Invalid settings store configuration, broadcasts will skip guilds: {}", e);
                (Arc::new(Unavailable::new(e.to_string())), None)
            }
        };

    let feeds = Arc::new(Feeds::new(fetcher::client()?, config.endpoints.clone()));

    let mut client = Client::builder(
        &config.token,
        GatewayIntents::GUILD_MESSAGES | GatewayIntents::MESSAGE_CONTENT | GatewayIntents::GUILDS,
    )
    .event_handler(Handler {
        feeds: feeds.clone(),
        prefix: config.prefix,
    })
    .await?;

    let courier: Arc<dyn Courier> = Arc::new(Discord::new(client.http.clone(), client.cache.clone()));
    let mut scheduler =
        scheduler::start(&config.schedule, feeds, store, courier).await?;

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutting down");
            shard_manager.shutdown_all().await;
        }
    });

    let result = client.start().await;

    if let Err(e) = scheduler.shutdown().await {
        error!("Failed to stop scheduler: {}", e);
    }
    if let Some(database) = database {
        database.close();
    }

    result?;
    Ok(())
}
