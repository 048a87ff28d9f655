#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedKind {
    News,
    Vulnerabilities,
    Distro,
}

/// Where each feed goes for one guild. A missing channel disables that feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuildFeedSettings {
    pub guild_id: String,
    pub news_channel_id: Option<String>,
    pub vulnerability_channel_id: Option<String>,
    pub distro_channel_id: Option<String>,
}

impl GuildFeedSettings {
    /// The destination channel for `kind`, if set to a usable snowflake.
    pub fn channel(&self, kind: FeedKind) -> Option<u64> {
        let raw = match kind {
            FeedKind::News => self.news_channel_id.as_deref(),
            FeedKind::Vulnerabilities => self.vulnerability_channel_id.as_deref(),
            FeedKind::Distro => self.distro_channel_id.as_deref(),
        }?;

        raw.trim().parse::<u64>().ok().filter(|id| *id != 0)
    }
}
