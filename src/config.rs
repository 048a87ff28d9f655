use std::io::ErrorKind;

use anyhow::{Result, anyhow};
use dotenv::dotenv;
use serde::Deserialize;
use url::Url;

const DEFAULT_PREFIX: char = '!';
const DEFAULT_SCHEDULE: &str = "0 0 12 * * *";
const DEFAULT_DATABASE_URL: &str = "postgres://localhost/secfeed";
const DEFAULT_NEWS_URL: &str = "https://hn.algolia.com/api/v1/search_by_date?query=security&tags=story";
const DEFAULT_CVE_URL: &str = "https://cve.circl.lu/api/last";
const DEFAULT_DISTRO_URL: &str = "https://www.kali.org/rss.xml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub news: String,
    pub cve: String,
    pub distro: String,
}

#[derive(Debug)]
pub struct Config {
    pub token: String,
    pub prefix: char,
    pub schedule: String,
    pub database_url: String,
    pub endpoints: Endpoints,
}

#[derive(Debug, Default, Deserialize)]
struct File {
    #[serde(default)]
    bot: BotSection,
    #[serde(default)]
    database: DatabaseSection,
    #[serde(default)]
    feeds: FeedsSection,
}

#[derive(Debug, Default, Deserialize)]
struct BotSection {
    token: Option<String>,
    prefix: Option<String>,
    schedule: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabaseSection {
    url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct FeedsSection {
    news_url: Option<String>,
    cve_url: Option<String>,
    distro_url: Option<String>,
}

impl Config {
    /// Reads `config.toml` when present, then lets the environment (and `.env`)
    /// override individual values.
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let contents = match std::fs::read_to_string("config.toml") {
            Ok(contents) => Some(contents),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        Self::resolve(contents.as_deref(), |key| std::env::var(key).ok())
    }

    fn resolve(contents: Option<&str>, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let file: File = match contents {
            Some(contents) => toml::from_str(contents)?,
            None => File::default(),
        };

        let token = pick(&env, &["DISCORD_TOKEN", "TOKEN"], file.bot.token)
            .ok_or_else(|| anyhow!("Missing bot token: set TOKEN or [bot].token"))?;

        let prefix = match pick(&env, &["COMMAND_PREFIX"], file.bot.prefix) {
            Some(prefix) => {
                let mut chars = prefix.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => c,
                    _ => return Err(anyhow!("Command prefix must be a single character, got {:?}", prefix)),
                }
            }
            None => DEFAULT_PREFIX,
        };

        let endpoints = Endpoints {
            news: endpoint(pick(&env, &["HN_API"], file.feeds.news_url), DEFAULT_NEWS_URL)?,
            cve: endpoint(pick(&env, &["CVE_API"], file.feeds.cve_url), DEFAULT_CVE_URL)?,
            distro: endpoint(pick(&env, &["KALI_RSS"], file.feeds.distro_url), DEFAULT_DISTRO_URL)?,
        };

        Ok(Self {
            token,
            prefix,
            schedule: pick(&env, &["BROADCAST_SCHEDULE"], file.bot.schedule)
                .unwrap_or_else(|| DEFAULT_SCHEDULE.to_string()),
            database_url: pick(&env, &["DATABASE_URL"], file.database.url)
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            endpoints,
        })
    }
}

fn pick(
    env: &impl Fn(&str) -> Option<String>,
    keys: &[&str],
    fallback: Option<String>,
) -> Option<String> {
    keys.iter()
        .find_map(|&key| env(key))
        .or(fallback)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn endpoint(value: Option<String>, fallback: &str) -> Result<String> {
    let value = value.unwrap_or_else(|| fallback.to_string());
    Url::parse(&value).map_err(|e| anyhow!("Invalid endpoint URL {}: {}", value, e))?;
    Ok(value)
}
