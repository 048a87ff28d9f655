use serenity::all::CreateEmbed;

use crate::util::text::truncate;

const MAX_TITLE: usize = 256;
const MAX_DESCRIPTION: usize = 4096;
const MAX_FIELDS: usize = 25;
const MAX_FIELD_NAME: usize = 256;
const MAX_FIELD_VALUE: usize = 1024;

pub const NOTHING_TO_REPORT: &str = "Nothing to report right now.";

/// Which template a feed renders with: a reply to a command, or the daily post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edition {
    OnDemand,
    Daily,
}

/// A titled, colored message body with zero or more fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub title: String,
    pub color: u32,
    pub description: String,
    pub fields: Vec<(String, String)>,
}

impl Card {
    pub fn new(title: impl Into<String>, color: u32, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            color,
            description: description.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Swaps the description for a "no results" note when there are no fields.
    pub fn or_placeholder(mut self) -> Self {
        if self.is_empty() {
            self.description = NOTHING_TO_REPORT.to_string();
        }
        self
    }

    /// Renders into a Discord embed, clamped to the platform's limits.
    pub fn embed(&self) -> CreateEmbed {
        let fields = self.fields.iter().take(MAX_FIELDS).map(|(name, value)| {
            (
                truncate(name, MAX_FIELD_NAME),
                truncate(value, MAX_FIELD_VALUE),
                false,
            )
        });

        CreateEmbed::new()
            .title(truncate(&self.title, MAX_TITLE))
            .color(self.color)
            .description(truncate(&self.description, MAX_DESCRIPTION))
            .fields(fields)
    }
}

/// Renders a missing value the way every card shows it.
pub fn or_na(value: &str) -> &str {
    if value.trim().is_empty() { "N/A" } else { value }
}
