pub mod tasks;

use std::sync::Arc;

use anyhow::Result;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::{data::SettingsStore, feeds::Feeds, util::courier::Courier};

/// Registers the daily broadcast under `schedule` (six-field cron, UTC) and
/// starts the scheduler.
pub async fn start(
    schedule: &str,
    feeds: Arc<Feeds>,
    store: Arc<dyn SettingsStore>,
    courier: Arc<dyn Courier>,
) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    scheduler
        .add(Job::new_async(schedule, move |_uuid, _l| {
            let feeds = feeds.clone();
            let store = store.clone();
            let courier = courier.clone();
            Box::pin(async move {
                if let Err(e) = tasks::daily(feeds, store, courier).await {
                    error!("Daily broadcast error: {}", e);
                }
            })
        })?)
        .await?;

    scheduler.start().await?;
    info!("Daily broadcast scheduled at '{}'", schedule);
    Ok(scheduler)
}
