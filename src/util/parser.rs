use feed_rs::parser;

use super::fetcher::FetchError;

pub fn parse(content: &str) -> Result<feed_rs::model::Feed, FetchError> {
    let feed = parser::parse(content.as_bytes())?;
    Ok(feed)
}

pub fn json<T: serde::de::DeserializeOwned>(content: &str) -> Result<T, FetchError> {
    Ok(serde_json::from_str(content)?)
}
