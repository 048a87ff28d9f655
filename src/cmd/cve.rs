use super::card::{Card, Edition};
use crate::{
    feeds::{Feeds, VulnerabilityRecord},
    util::text::truncate,
};

pub const LIMIT: usize = 5;
const COLOR: u32 = 0xFF0000;
const SUMMARY_CHARS: usize = 100;

pub async fn execute(feeds: &Feeds) -> Card {
    card(&feeds.vulnerabilities(LIMIT).await, Edition::OnDemand)
}

pub fn card(records: &[VulnerabilityRecord], edition: Edition) -> Card {
    let card = match edition {
        Edition::OnDemand => Card::new(
            "⚠️ Recent CVEs (Critical Vulnerabilities)",
            COLOR,
            "Latest cybersecurity vulnerabilities:",
        ),
        Edition::Daily => Card::new("⚠️ Daily CVE Digest", COLOR, "Newly published vulnerabilities:"),
    };

    records.iter().enumerate().fold(card, |card, (i, record)| {
        card.field(format!("{}. {}", i + 1, record.id), value(record))
    })
}

fn value(record: &VulnerabilityRecord) -> String {
    let score = record
        .severity_score
        .map(|s| format!("{:.1}", s))
        .unwrap_or_else(|| "N/A".to_string());

    let summary = if record.summary.is_empty() {
        "No summary available".to_string()
    } else {
        truncate(&record.summary, SUMMARY_CHARS)
    };

    format!(
        "**CVSS:** {}\n**Summary:** {}\n[Details]({})",
        score, summary, record.url
    )
}
