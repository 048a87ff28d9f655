use std::sync::LazyLock;

use feed_rs::model::Entry;
use regex::Regex;
use reqwest::Client;

use crate::util::{
    fetcher::{self, FetchError},
    parser, text,
};

static ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<item\b[^>]*>(.*?)</item>").unwrap());
static PUB_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<pubDate\b[^>]*>(.*?)</pubDate>").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionUpdate {
    pub title: String,
    pub url: String,
    pub published: String,
}

pub async fn fetch(
    client: &Client,
    endpoint: &str,
    limit: usize,
) -> Result<Vec<DistributionUpdate>, FetchError> {
    let body = fetcher::fetch(client, endpoint).await?;
    parse(&body, limit)
}

pub fn parse(body: &str, limit: usize) -> Result<Vec<DistributionUpdate>, FetchError> {
    let feed = parser::parse(body)?;
    let dates = raw_dates(body);

    Ok(feed
        .entries
        .iter()
        .take(limit)
        .enumerate()
        .map(|(i, entry)| {
            let mut update = DistributionUpdate::from(entry);
            if let Some(raw) = dates.get(i).cloned().flatten() {
                update.published = raw;
            }
            update
        })
        .collect())
}

/// The `<pubDate>` text of every RSS `<item>`, in document order, exactly as
/// published. Atom documents have no items and yield an empty list.
fn raw_dates(body: &str) -> Vec<Option<String>> {
    ITEM.captures_iter(body)
        .map(|item| {
            PUB_DATE
                .captures(&item[1])
                .map(|date| text::clean(&date[1]))
                .filter(|date| !date.is_empty())
        })
        .collect()
}

impl From<&Entry> for DistributionUpdate {
    fn from(entry: &Entry) -> Self {
        Self {
            title: entry
                .title
                .as_ref()
                .map(|t| text::clean(&t.content))
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "Untitled".to_string()),
            url: entry
                .links
                .first()
                .map(|l| l.href.clone())
                .unwrap_or_default(),
            published: entry
                .published
                .or(entry.updated)
                .map(|d| d.to_rfc2822())
                .unwrap_or_default(),
        }
    }
}
