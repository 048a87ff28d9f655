use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::util::{
    fetcher::{self, FetchError},
    parser, text,
};

const ITEM_URL: &str = "https://news.ycombinator.com/item";
const HOME_URL: &str = "https://news.ycombinator.com/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsItem {
    pub title: String,
    pub url: String,
    pub points: u64,
    pub comments: u64,
}

/// The search API wraps stories in `hits`; plain story lists are accepted too.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Response {
    Search { hits: Vec<Story> },
    Bare(Vec<Story>),
}

#[derive(Debug, Deserialize)]
struct Story {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default, rename = "objectID")]
    object_id: Option<String>,
    #[serde(default)]
    points: Option<u64>,
    #[serde(default)]
    num_comments: Option<u64>,
}

pub async fn fetch(client: &Client, endpoint: &str, limit: usize) -> Result<Vec<NewsItem>, FetchError> {
    let body = fetcher::fetch(client, endpoint).await?;
    parse(&body, limit)
}

pub fn parse(body: &str, limit: usize) -> Result<Vec<NewsItem>, FetchError> {
    let stories = match parser::json::<Response>(body)? {
        Response::Search { hits } => hits,
        Response::Bare(stories) => stories,
    };

    Ok(stories.into_iter().take(limit).map(NewsItem::from).collect())
}

impl From<Story> for NewsItem {
    fn from(story: Story) -> Self {
        let url = match story.url.filter(|u| !u.trim().is_empty()) {
            Some(url) => url,
            None => discussion(story.object_id.as_deref()),
        };

        Self {
            title: story
                .title
                .map(|t| text::clean(&t))
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "Untitled".to_string()),
            url,
            points: story.points.unwrap_or(0),
            comments: story.num_comments.unwrap_or(0),
        }
    }
}

fn discussion(object_id: Option<&str>) -> String {
    object_id
        .and_then(|id| Url::parse_with_params(ITEM_URL, &[("id", id)]).ok())
        .map(String::from)
        .unwrap_or_else(|| HOME_URL.to_string())
}
