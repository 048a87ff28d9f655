use super::card::{Card, Edition, or_na};
use crate::feeds::{DistributionUpdate, Feeds};

pub const LIMIT: usize = 3;
const COLOR: u32 = 0x5575C9;

pub async fn execute(feeds: &Feeds) -> Card {
    card(&feeds.distro_updates(LIMIT).await, Edition::OnDemand)
}

pub fn card(updates: &[DistributionUpdate], edition: Edition) -> Card {
    let title = match edition {
        Edition::OnDemand => "🐉 Kali Linux Updates",
        Edition::Daily => "🐉 Daily Kali Linux Updates",
    };
    let card = Card::new(title, COLOR, "Recent Kali Linux package updates:");

    updates.iter().enumerate().fold(card, |card, (i, update)| {
        card.field(
            format!("{}. {}", i + 1, update.title),
            format!("📅 {}\n[Read More]({})", or_na(&update.published), update.url),
        )
    })
}
