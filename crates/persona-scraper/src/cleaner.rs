//! Text cleaning for scraped bio and profile text.
//!
//! Output is meant to be pasted into an LLM prompt: no markup, no emoji,
//! no bare links, one trimmed non-empty line per line of input. Spacing
//! inside a line is left alone.

use regex::Regex;
use std::sync::OnceLock;

/// Emoji and pictograph ranges removed from scraped text.
const EMOJI_RANGES: &[(char, char)] = &[
    ('\u{1F300}', '\u{1F5FF}'), // symbols & pictographs
    ('\u{1F600}', '\u{1F64F}'), // emoticons
    ('\u{1F680}', '\u{1F6FF}'), // transport & map
    ('\u{1F1E0}', '\u{1F1FF}'), // regional indicators (flags)
    ('\u{1F900}', '\u{1F9FF}'), // supplemental symbols & pictographs
    ('\u{1FA70}', '\u{1FAFF}'), // symbols & pictographs extended-A
    ('\u{2600}', '\u{27BF}'),   // misc symbols, dingbats
    ('\u{FE0F}', '\u{FE0F}'),   // emoji presentation selector
    ('\u{200D}', '\u{200D}'),   // zero width joiner
];

fn html_tag_regex() -> &'static Regex {
    static HTML_TAG: OnceLock<Regex> = OnceLock::new();
    HTML_TAG.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid regex"))
}

fn url_regex() -> &'static Regex {
    static BARE_URL: OnceLock<Regex> = OnceLock::new();
    BARE_URL.get_or_init(|| Regex::new(r"(?:https?|ftp)://\S+").expect("valid regex"))
}

fn is_emoji(c: char) -> bool {
    EMOJI_RANGES
        .iter()
        .any(|&(start, end)| (start..=end).contains(&c))
}

/// Clean scraped text for inclusion in a prompt.
///
/// Applying this twice gives the same result as applying it once.
pub fn clean_text(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let without_tags = html_tag_regex().replace_all(raw, "");
    let without_emoji: String = without_tags.chars().filter(|c| !is_emoji(*c)).collect();
    let without_urls = url_regex().replace_all(&without_emoji, "");

    without_urls
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
