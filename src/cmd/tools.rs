use super::card::{Card, or_na};
use crate::feeds::{Feeds, ToolRecord};

const COLOR: u32 = 0x00FF00;

pub fn execute(feeds: &Feeds) -> Card {
    card(&feeds.tools())
}

pub fn card(tools: &[ToolRecord]) -> Card {
    let card = Card::new(
        "🛠️ Security Tool Updates",
        COLOR,
        "Latest versions of popular security tools:",
    );

    tools.iter().fold(card, |card, tool| {
        card.field(
            tool.name.as_str(),
            format!(
                "**Version:** {}\n**Release Date:** {}\n[Website]({})",
                tool.version,
                or_na(&tool.release_date),
                tool.url
            ),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feeds::tools::catalog;

    #[test]
    fn test_catalog_card() {
        let card = card(&catalog());

        assert_eq!(card.fields.len(), 3);
        assert_eq!(card.fields[1].0, "Nmap");
        assert_eq!(
            card.fields[1].1,
            "**Version:** 7.94\n**Release Date:** 2023-12-20\n[Website](https://nmap.org/)"
        );
    }
}
