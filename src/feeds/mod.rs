pub mod cve;
pub mod distro;
pub mod news;
pub mod tools;

pub use cve::VulnerabilityRecord;
pub use distro::DistributionUpdate;
pub use news::NewsItem;
pub use tools::ToolRecord;

use reqwest::Client;
use tracing::{debug, error};

use crate::{config::Endpoints, util::fetcher::FetchError};

/// Shared handle to the three upstream sources and the static tool catalog.
///
/// Every method degrades to an empty list on failure so one upstream outage
/// never blocks the other feeds.
pub struct Feeds {
    client: Client,
    endpoints: Endpoints,
}

impl Feeds {
    pub fn new(client: Client, endpoints: Endpoints) -> Self {
        Self { client, endpoints }
    }

    pub async fn news(&self, limit: usize) -> Vec<NewsItem> {
        degrade(
            "news",
            news::fetch(&self.client, &self.endpoints.news, limit).await,
        )
    }

    pub async fn vulnerabilities(&self, limit: usize) -> Vec<VulnerabilityRecord> {
        degrade(
            "vulnerabilities",
            cve::fetch(&self.client, &self.endpoints.cve, limit).await,
        )
    }

    pub async fn distro_updates(&self, limit: usize) -> Vec<DistributionUpdate> {
        degrade(
            "distro updates",
            distro::fetch(&self.client, &self.endpoints.distro, limit).await,
        )
    }

    pub fn tools(&self) -> Vec<ToolRecord> {
        tools::catalog()
    }
}

fn degrade<T>(source: &str, result: Result<Vec<T>, FetchError>) -> Vec<T> {
    match result {
        Ok(items) => {
            debug!("Fetched {} {} entries", items.len(), source);
            items
        }
        Err(e) => {
            error!("Failed to fetch {}: {}", source, e);
            Vec::new()
        }
    }
}
