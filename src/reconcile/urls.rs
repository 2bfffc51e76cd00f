use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::github::PullRequest;

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"https?://\S+").unwrap());

/// First URL in `text`, with trailing `]` removed so markdown links like
/// `[https://host/path]` yield the bare URL.
pub fn extract_url(text: &str) -> Option<&str> {
    let found = URL_PATTERN.find(text)?;
    Some(found.as_str().trim_end_matches(']')).filter(|url| !url.is_empty())
}

/// Distinct URLs referenced by the pull request: at most one per commit
/// message and one per commit comment. Order is not meaningful.
pub fn extract_urls(pull: &PullRequest) -> HashSet<String> {
    pull.commits
        .iter()
        .flat_map(|commit| {
            std::iter::once(commit.message.as_str()).chain(commit.comments.iter().map(String::as_str))
        })
        .filter_map(extract_url)
        .map(str::to_string)
        .collect()
}
