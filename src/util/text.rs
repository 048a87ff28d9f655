use std::sync::LazyLock;

use regex::Regex;

static CDATA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!\[CDATA\[(.*?)\]\]>").unwrap());
static TAGS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Strips markup and collapses whitespace so upstream text renders cleanly
/// inside an embed.
pub fn clean(input: &str) -> String {
    let without_cdata = CDATA.replace_all(input, "$1");
    let without_tags = TAGS.replace_all(&without_cdata, "");
    let collapsed = WHITESPACE.replace_all(&without_tags, " ");

    collapsed
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .trim()
        .to_string()
}

/// Cuts `input` to at most `max` characters, ending in "..." when shortened.
pub fn truncate(input: &str, max: usize) -> String {
    if input.chars().count() <= max {
        return input.to_string();
    }

    let keep = max.saturating_sub(3);
    let mut out: String = input.chars().take(keep).collect();
    out.push_str("...");
    out
}
