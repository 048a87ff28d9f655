use std::time::Duration;

use reqwest::Client;
use thiserror::Error;

const MAX_BODY_BYTES: usize = 5_000_000;

/// Everything that can go wrong between issuing a request and holding a
/// mapped list of records.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP {0}")]
    HttpStatus(u16),
    #[error("Response too large: {0} bytes")]
    TooLarge(usize),
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid feed: {0}")]
    Feed(#[from] feed_rs::parser::ParseFeedError),
}

pub fn client() -> reqwest::Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent(concat!("secfeed/", env!("CARGO_PKG_VERSION")))
        .build()
}

pub async fn fetch(client: &Client, url: &str) -> Result<String, FetchError> {
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        return Err(FetchError::HttpStatus(response.status().as_u16()));
    }

    let bytes = response.bytes().await?;
    if bytes.len() > MAX_BODY_BYTES {
        return Err(FetchError::TooLarge(bytes.len()));
    }

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
