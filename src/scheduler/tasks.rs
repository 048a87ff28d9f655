use std::sync::Arc;

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use tokio::{
    sync::Semaphore,
    time::{Duration, timeout},
};
use tracing::{debug, error, info, warn};

use crate::{
    cmd::{
        card::{Card, Edition},
        cve, distro, news,
    },
    data::{SettingsStore, models::FeedKind},
    feeds::Feeds,
    util::courier::Courier,
};

const DAILY_LIMIT: usize = 3;
const MAX_CONCURRENT_GUILDS: usize = 50;
const GUILD_TIMEOUT: Duration = Duration::from_secs(120);

/// The cards of one daily run, rendered once and shared by every guild.
#[derive(Debug, Default)]
pub struct Digest {
    cards: Vec<(FeedKind, Card)>,
}

impl Digest {
    /// Empty feeds are left out so guilds are not sent blank cards.
    pub fn new(cards: impl IntoIterator<Item = (FeedKind, Card)>) -> Self {
        Self {
            cards: cards.into_iter().filter(|(_, card)| !card.is_empty()).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastReport {
    pub guilds: usize,
    pub delivered: usize,
    pub failed: usize,
}

#[derive(Debug, Default)]
struct GuildOutcome {
    delivered: usize,
    failed: usize,
}

pub async fn daily(
    feeds: Arc<Feeds>,
    store: Arc<dyn SettingsStore>,
    courier: Arc<dyn Courier>,
) -> Result<BroadcastReport> {
    broadcast(feeds, store, courier, Utc::now().date_naive()).await
}

pub async fn broadcast(
    feeds: Arc<Feeds>,
    store: Arc<dyn SettingsStore>,
    courier: Arc<dyn Courier>,
    today: NaiveDate,
) -> Result<BroadcastReport> {
    match store.claim(today).await {
        Ok(true) => {}
        Ok(false) => {
            info!("Daily broadcast for {} already ran, skipping", today);
            return Ok(BroadcastReport::default());
        }
        Err(e) => warn!("Could not record broadcast run for {}: {}", today, e),
    }

    let (stories, records, updates) = tokio::join!(
        feeds.news(DAILY_LIMIT),
        feeds.vulnerabilities(DAILY_LIMIT),
        feeds.distro_updates(DAILY_LIMIT),
    );

    let digest = Digest::new([
        (FeedKind::News, news::card(&stories, Edition::Daily)),
        (FeedKind::Vulnerabilities, cve::card(&records, Edition::Daily)),
        (FeedKind::Distro, distro::card(&updates, Edition::Daily)),
    ]);

    if digest.is_empty() {
        info!("Nothing to broadcast today");
        return Ok(BroadcastReport::default());
    }

    Ok(fan_out(Arc::new(digest), store, courier).await)
}

pub async fn fan_out(
    digest: Arc<Digest>,
    store: Arc<dyn SettingsStore>,
    courier: Arc<dyn Courier>,
) -> BroadcastReport {
    let guilds = courier.guilds();
    info!("Broadcasting to {} guilds", guilds.len());

    let semaphore = Arc::new(Semaphore::new(MAX_CONCURRENT_GUILDS));

    let tasks: Vec<_> = guilds
        .iter()
        .map(|&guild_id| {
            let digest = digest.clone();
            let store = store.clone();
            let courier = courier.clone();
            let sem = semaphore.clone();

            tokio::spawn(async move {
                let _permit = match sem.acquire().await {
                    Ok(permit) => permit,
                    Err(e) => return Err(anyhow::Error::from(e)),
                };
                let result = timeout(
                    GUILD_TIMEOUT,
                    deliver(guild_id, &digest, store.as_ref(), courier.as_ref()),
                )
                .await;

                match result {
                    Ok(outcome) => outcome,
                    Err(_) => Err(anyhow::anyhow!("Timeout")),
                }
            })
        })
        .collect();

    let results = futures::future::join_all(tasks).await;

    let mut report = BroadcastReport {
        guilds: guilds.len(),
        ..Default::default()
    };

    for (guild_id, result) in guilds.iter().zip(results) {
        match result {
            Ok(Ok(outcome)) => {
                report.delivered += outcome.delivered;
                report.failed += outcome.failed;
            }
            Ok(Err(e)) => {
                error!("Broadcast to guild {} failed: {}", guild_id, e);
                report.failed += 1;
            }
            Err(e) => {
                error!("Broadcast task for guild {} aborted: {}", guild_id, e);
                report.failed += 1;
            }
        }
    }

    info!(
        "Broadcast complete: {} guilds, {} cards delivered, {} failed",
        report.guilds, report.delivered, report.failed
    );

    report
}

async fn deliver(
    guild_id: u64,
    digest: &Digest,
    store: &dyn SettingsStore,
    courier: &dyn Courier,
) -> Result<GuildOutcome> {
    let mut outcome = GuildOutcome::default();

    let Some(settings) = store.settings(guild_id).await? else {
        debug!("Guild {} has no feed settings", guild_id);
        return Ok(outcome);
    };

    for (kind, card) in &digest.cards {
        let Some(channel_id) = settings.channel(*kind) else {
            continue;
        };

        if !courier.resolve(guild_id, channel_id) {
            warn!(
                "Channel {} for {:?} is not in guild {}, skipping",
                channel_id, kind, guild_id
            );
            continue;
        }

        match courier.send(channel_id, card).await {
            Ok(()) => outcome.delivered += 1,
            Err(e) => {
                warn!("Failed to post {:?} to channel {}: {}", kind, channel_id, e);
                outcome.failed += 1;
            }
        }
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data::{models::GuildFeedSettings, testing::MemoryStore, Unavailable},
        feeds::testing::feeds,
        util::courier::testing::Recorder,
    };
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(guild: u64, news: Option<&str>, cve: Option<&str>, distro: Option<&str>) -> GuildFeedSettings {
        GuildFeedSettings {
            guild_id: guild.to_string(),
            news_channel_id: news.map(str::to_string),
            vulnerability_channel_id: cve.map(str::to_string),
            distro_channel_id: distro.map(str::to_string),
        }
    }

    fn digest() -> Arc<Digest> {
        Arc::new(Digest::new([
            (FeedKind::News, Card::new("news", 1, "d").field("1. A", "v")),
            (FeedKind::Vulnerabilities, Card::new("cve", 2, "d").field("1. CVE", "v")),
            (FeedKind::Distro, Card::new("distro", 3, "d").field("1. Kali", "v")),
        ]))
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    #[tokio::test]
    async fn test_guild_without_settings_receives_nothing() {
        let store = Arc::new(MemoryStore::default().with(settings(1, Some("10"), None, None)));
        let courier = Arc::new(Recorder::default().guild(1, &[10]).guild(2, &[20]));

        let report = fan_out(digest(), store, courier.clone()).await;

        assert_eq!(report.guilds, 2);
        assert_eq!(report.delivered, 1);
        assert!(courier.sent_to(20).is_empty());
        assert_eq!(courier.sent_to(10)[0].title, "news");
    }

    #[tokio::test]
    async fn test_each_feed_goes_to_its_channel() {
        let store = Arc::new(MemoryStore::default().with(settings(1, Some("10"), Some("11"), Some("12"))));
        let courier = Arc::new(Recorder::default().guild(1, &[10, 11, 12]));

        let report = fan_out(digest(), store, courier.clone()).await;

        assert_eq!(report.delivered, 3);
        assert_eq!(courier.sent_to(10)[0].title, "news");
        assert_eq!(courier.sent_to(11)[0].title, "cve");
        assert_eq!(courier.sent_to(12)[0].title, "distro");
    }

    #[tokio::test]
    async fn test_missing_channel_does_not_break_other_guilds() {
        let store = Arc::new(
            MemoryStore::default()
                .with(settings(1, Some("999"), None, None))
                .with(settings(2, Some("20"), None, None)),
        );
        let courier = Arc::new(Recorder::default().guild(1, &[10]).guild(2, &[20]));

        let report = fan_out(digest(), store, courier.clone()).await;

        assert_eq!(report.delivered, 1);
        assert!(courier.sent_to(999).is_empty());
        assert_eq!(courier.sent_to(20).len(), 1);
    }

    #[tokio::test]
    async fn test_channel_of_another_guild_is_not_used() {
        let store = Arc::new(MemoryStore::default().with(settings(1, Some("20"), None, None)));
        let courier = Arc::new(Recorder::default().guild(1, &[10]).guild(2, &[20]));

        fan_out(digest(), store, courier.clone()).await;
        assert!(courier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_failures_are_isolated_per_guild() {
        let mut store = MemoryStore::default()
            .with(settings(1, Some("10"), None, None))
            .with(settings(2, Some("20"), None, None))
            .with(settings(3, Some("30"), Some("31"), None));
        store.broken.insert(1);

        let mut courier = Recorder::default().guild(1, &[10]).guild(2, &[20]).guild(3, &[30, 31]);
        courier.failing.insert(30);
        let courier = Arc::new(courier);

        let report = fan_out(digest(), Arc::new(store), courier.clone()).await;

        assert_eq!(report.guilds, 3);
        assert_eq!(report.delivered, 2);
        assert_eq!(report.failed, 2);
        assert_eq!(courier.sent_to(20).len(), 1);
        assert_eq!(courier.sent_to(31).len(), 1);
    }

    #[tokio::test]
    async fn test_panicking_guild_task_is_counted() {
        let store = Arc::new(
            MemoryStore::default()
                .with(settings(1, Some("10"), None, None))
                .with(settings(2, Some("20"), None, None)),
        );
        let mut courier = Recorder::default().guild(1, &[10]).guild(2, &[20]);
        courier.panicking.insert(10);
        let courier = Arc::new(courier);

        let report = fan_out(digest(), store, courier.clone()).await;

        assert_eq!(report.guilds, 2);
        assert_eq!(report.delivered, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(courier.sent_to(20).len(), 1);
    }

    #[test]
    fn test_digest_drops_empty_cards() {
        let digest = Digest::new([
            (FeedKind::News, Card::new("news", 1, "d")),
            (FeedKind::Distro, Card::new("distro", 3, "d").field("1. Kali", "v")),
        ]);
        assert_eq!(digest.cards.len(), 1);
        assert_eq!(digest.cards[0].0, FeedKind::Distro);
    }

    async fn upstream() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/news"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"hits":[{"title":"A","url":"u1","points":10,"num_comments":2}]}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/cve"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/distro"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_broadcast_fetches_once_for_all_guilds() {
        let server = upstream().await;
        let store = Arc::new(
            MemoryStore::default()
                .with(settings(1, Some("10"), Some("11"), None))
                .with(settings(2, Some("20"), None, Some("22"))),
        );
        let courier = Arc::new(Recorder::default().guild(1, &[10, 11]).guild(2, &[20, 22]));

        let report = broadcast(Arc::new(feeds(&server.uri())), store, courier.clone(), day())
            .await
            .unwrap();

        assert_eq!(report.delivered, 2);
        assert_eq!(courier.sent_to(10)[0].title, "📰 Daily Hacker News");
        assert_eq!(courier.sent_to(10)[0].fields[0].1, "[Read More](u1) | 👍 10");
        assert!(courier.sent_to(11).is_empty());
        assert!(courier.sent_to(22).is_empty());
    }

    #[tokio::test]
    async fn test_broadcast_runs_once_per_day() {
        let server = upstream().await;
        let store: Arc<MemoryStore> = Arc::new(MemoryStore::default().with(settings(1, Some("10"), None, None)));
        let courier = Arc::new(Recorder::default().guild(1, &[10]));
        let feeds = Arc::new(feeds(&server.uri()));

        let first = broadcast(feeds.clone(), store.clone(), courier.clone(), day())
            .await
            .unwrap();
        let second = broadcast(feeds, store, courier.clone(), day()).await.unwrap();

        assert_eq!(first.delivered, 1);
        assert_eq!(second, BroadcastReport::default());
        assert_eq!(courier.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_offline_store_still_runs_but_delivers_nothing() {
        let server = upstream().await;
        let store = Arc::new(MemoryStore {
            offline: true,
            ..Default::default()
        });
        let courier = Arc::new(Recorder::default().guild(1, &[10]).guild(2, &[20]));

        let report = broadcast(Arc::new(feeds(&server.uri())), store, courier.clone(), day())
            .await
            .unwrap();

        assert_eq!(report.guilds, 2);
        assert_eq!(report.failed, 2);
        assert!(courier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_misconfigured_store_still_runs_but_delivers_nothing() {
        let server = upstream().await;
        let store = Arc::new(Unavailable::new("invalid DATABASE_URL"));
        let courier = Arc::new(Recorder::default().guild(1, &[10]));

        let report = broadcast(Arc::new(feeds(&server.uri())), store, courier.clone(), day())
            .await
            .unwrap();

        assert_eq!(report.guilds, 1);
        assert_eq!(report.failed, 1);
        assert!(courier.sent().is_empty());
    }
}
