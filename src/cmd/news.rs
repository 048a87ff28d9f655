use super::card::{Card, Edition};
use crate::feeds::{Feeds, NewsItem};

pub const LIMIT: usize = 5;
const COLOR: u32 = 0xFF6600;

pub async fn execute(feeds: &Feeds) -> Card {
    card(&feeds.news(LIMIT).await, Edition::OnDemand)
}

pub fn card(items: &[NewsItem], edition: Edition) -> Card {
    let card = match edition {
        Edition::OnDemand => Card::new(
            "🔥 Latest Hacker News",
            COLOR,
            "Top cybersecurity stories from Hacker News:",
        ),
        Edition::Daily => Card::new("📰 Daily Hacker News", COLOR, "Latest cybersecurity stories:"),
    };

    items.iter().enumerate().fold(card, |card, (i, item)| {
        let value = match edition {
            Edition::OnDemand => format!(
                "[Read More]({}) | 👍 {} | 💬 {}",
                item.url, item.points, item.comments
            ),
            Edition::Daily => format!("[Read More]({}) | 👍 {}", item.url, item.points),
        };
        card.field(format!("{}. {}", i + 1, item.title), value)
    })
}
