use reqwest::Client;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;
use url::Url;

use crate::util::{
    fetcher::{self, FetchError},
    parser, text,
};

const DETAILS_URL: &str = "https://cve.mitre.org/cgi-bin/cvename.cgi";

#[derive(Debug, Clone, PartialEq)]
pub struct VulnerabilityRecord {
    pub id: String,
    pub summary: String,
    pub severity_score: Option<f64>,
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct Entry {
    id: String,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default, deserialize_with = "lenient_score")]
    cvss: Option<f64>,
}

/// Scores show up as numbers, numeric strings or not at all.
fn lenient_score<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

pub async fn fetch(
    client: &Client,
    endpoint: &str,
    limit: usize,
) -> Result<Vec<VulnerabilityRecord>, FetchError> {
    let body = fetcher::fetch(client, endpoint).await?;
    parse(&body, limit)
}

/// Entries are mapped one at a time; a malformed entry is skipped and never
/// poisons the rest of the batch.
pub fn parse(body: &str, limit: usize) -> Result<Vec<VulnerabilityRecord>, FetchError> {
    let values: Vec<Value> = parser::json(body)?;
    Ok(values
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<Entry>(value) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping malformed vulnerability entry: {}", e);
                None
            }
        })
        .take(limit)
        .map(VulnerabilityRecord::from)
        .collect())
}

impl From<Entry> for VulnerabilityRecord {
    fn from(entry: Entry) -> Self {
        let url = Url::parse_with_params(DETAILS_URL, &[("name", entry.id.as_str())])
            .map(String::from)
            .unwrap_or_else(|_| DETAILS_URL.to_string());

        Self {
            summary: entry.summary.map(|s| text::clean(&s)).unwrap_or_default(),
            severity_score: entry.cvss,
            id: entry.id,
            url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_cvss_is_none() {
        let body = r#"[{"id":"CVE-2024-0001","summary":"Heap overflow in libfoo"}]"#;
        let records = parse(body, 5).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].severity_score, None);
        assert_eq!(
            records[0].url,
            "https://cve.mitre.org/cgi-bin/cvename.cgi?name=CVE-2024-0001"
        );
    }

    #[test]
    fn test_cvss_as_number_or_string() {
        let body = r#"[
            {"id":"CVE-1","cvss":9.8},
            {"id":"CVE-2","cvss":"7.5"},
            {"id":"CVE-3","cvss":"n/a"},
            {"id":"CVE-4","cvss":null}
        ]"#;
        let scores: Vec<_> = parse(body, 10)
            .unwrap()
            .into_iter()
            .map(|r| r.severity_score)
            .collect();

        assert_eq!(scores, vec![Some(9.8), Some(7.5), None, None]);
    }

    #[test]
    fn test_summary_defaults_to_empty() {
        let records = parse(r#"[{"id":"CVE-1"}]"#, 1).unwrap();
        assert_eq!(records[0].summary, "");
    }

    #[test]
    fn test_limit_is_applied_in_order() {
        let body = r#"[{"id":"CVE-1"},{"id":"CVE-2"},{"id":"CVE-3"}]"#;
        let ids: Vec<_> = parse(body, 2).unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["CVE-1", "CVE-2"]);
    }

    #[test]
    fn test_bad_entry_past_limit_is_ignored() {
        let body = r#"[{"id":"CVE-1"},{"id":"CVE-2"},{"id":"CVE-3"},{"id":"CVE-4"},{"id":"CVE-5"},{"id":null}]"#;
        let ids: Vec<_> = parse(body, 3).unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["CVE-1", "CVE-2", "CVE-3"]);
    }

    #[test]
    fn test_bad_entry_inside_window_is_skipped() {
        let body = r#"[{"id":"CVE-1"},{"summary":"no id"},{"id":"CVE-3"},{"id":"CVE-4"}]"#;
        let ids: Vec<_> = parse(body, 3).unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["CVE-1", "CVE-3", "CVE-4"]);
    }

    #[test]
    fn test_non_array_body_is_an_error() {
        assert!(matches!(parse(r#"{"id":"CVE-1"}"#, 3), Err(FetchError::Json(_))));
    }
}
