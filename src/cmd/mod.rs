pub mod card;
pub mod cve;
pub mod distro;
pub mod news;
pub mod tools;

use anyhow::Result;
use tracing::info;

use crate::{feeds::Feeds, util::courier::Courier};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    News,
    Vulnerabilities,
    DistroUpdates,
    Tools,
}

impl Command {
    /// Recognizes `<prefix><word>` with the word directly after the prefix;
    /// anything after the first word is ignored.
    pub fn parse(content: &str, prefix: char) -> Option<Self> {
        let rest = content.strip_prefix(prefix)?;
        let word = rest.split(char::is_whitespace).next()?.to_lowercase();

        match word.as_str() {
            "news" | "hackernews" => Some(Self::News),
            "vulnerabilities" | "cve" => Some(Self::Vulnerabilities),
            "distro-updates" | "kali" => Some(Self::DistroUpdates),
            "tools" => Some(Self::Tools),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::News => "news",
            Self::Vulnerabilities => "vulnerabilities",
            Self::DistroUpdates => "distro-updates",
            Self::Tools => "tools",
        }
    }
}

/// The parts of an inbound chat message the dispatcher looks at.
#[derive(Debug, Clone, Copy)]
pub struct Inbound<'a> {
    pub author_is_bot: bool,
    pub content: &'a str,
    pub channel_id: u64,
}

/// Runs a command message end to end. Returns the command that was served, or
/// `None` when the message was not a command for us.
pub async fn handle(
    feeds: &Feeds,
    courier: &dyn Courier,
    prefix: char,
    message: Inbound<'_>,
) -> Result<Option<Command>> {
    if message.author_is_bot {
        return Ok(None);
    }

    let Some(command) = Command::parse(message.content, prefix) else {
        return Ok(None);
    };

    info!(
        "Processing {} command in channel {}",
        command.name(),
        message.channel_id
    );

    let card = match command {
        Command::News => news::execute(feeds).await,
        Command::Vulnerabilities => cve::execute(feeds).await,
        Command::DistroUpdates => distro::execute(feeds).await,
        Command::Tools => tools::execute(feeds),
    };

    courier
        .send(message.channel_id, &card.or_placeholder())
        .await?;
    Ok(Some(command))
}
