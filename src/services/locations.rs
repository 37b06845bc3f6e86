// src/services/locations.rs

//! Location cell resolution.
//!
//! A location cell is one of three shapes:
//!
//! ```text
//! Austin, TX                                                  plain
//! Remote</br>Austin, TX                                       line-broken list
//! <details><summary>3 locations</summary>A</br>B</br>C</details>  collapsible list
//! ```
//!
//! Each entry is checked against the exclusion list; the row is rejected when
//! nothing survives.

use regex::Regex;

use crate::error::Result;
use crate::models::{FilterConfig, LocationMatch};

const DETAILS_OPEN: &str = "<details>";
const SUMMARY_CLOSE: &str = "</summary>";
const DETAILS_CLOSE: &str = "</details>";
const REMOTE: &str = "Remote";

/// Separator used for the display string.
pub const LOCATION_SEPARATOR: &str = " | ";

/// Decides whether a location lies outside the domestic market.
pub trait LocationMatcher: Send + Sync {
    fn is_excluded(&self, location: &str) -> bool;
}

/// Case-insensitive substring match.
///
/// Over-excludes on purpose: "uk" also hits "Milwaukee".
#[derive(Debug, Clone)]
pub struct SubstringMatcher {
    needles: Vec<String>,
}

impl SubstringMatcher {
    pub fn new<I, S>(regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            needles: regions
                .into_iter()
                .map(|r| r.as_ref().trim().to_lowercase())
                .filter(|r| !r.is_empty())
                .collect(),
        }
    }
}

impl LocationMatcher for SubstringMatcher {
    fn is_excluded(&self, location: &str) -> bool {
        let lower = location.to_lowercase();
        self.needles.iter().any(|needle| lower.contains(needle))
    }
}

/// Case-insensitive whole-word match.
#[derive(Debug, Clone)]
pub struct WordMatcher {
    pattern: Option<Regex>,
}

impl WordMatcher {
    pub fn new<I, S>(regions: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let alternatives: Vec<String> = regions
            .into_iter()
            .map(|r| r.as_ref().trim().to_string())
            .filter(|r| !r.is_empty())
            .map(|r| regex::escape(&r))
            .collect();

        let pattern = if alternatives.is_empty() {
            None
        } else {
            Some(Regex::new(&format!(
                r"(?i)\b(?:{})\b",
                alternatives.join("|")
            ))?)
        };
        Ok(Self { pattern })
    }
}

impl LocationMatcher for WordMatcher {
    fn is_excluded(&self, location: &str) -> bool {
        self.pattern
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(location))
    }
}

/// Build the matcher selected in the filter configuration.
pub fn matcher_for(config: &FilterConfig) -> Result<Box<dyn LocationMatcher>> {
    Ok(match config.location_match {
        LocationMatch::Substring => Box::new(SubstringMatcher::new(&config.excluded_regions)),
        LocationMatch::Word => Box::new(WordMatcher::new(&config.excluded_regions)?),
    })
}

/// Expands a location cell into its domestic entries.
pub struct LocationResolver {
    matcher: Box<dyn LocationMatcher>,
    line_break: Regex,
    remote_word: Regex,
}

impl LocationResolver {
    pub fn new(matcher: Box<dyn LocationMatcher>) -> Result<Self> {
        Ok(Self {
            matcher,
            line_break: Regex::new(r"(?i)<\s*/?\s*br\s*/?\s*>")?,
            remote_word: Regex::new(r"(?i)\bremote\b")?,
        })
    }

    /// Domestic locations of `cell`, in table order.
    ///
    /// A single-location cell mentioning "remote" is always kept, as `Remote`.
    /// Entries of a list are kept as written unless the matcher excludes them.
    /// An empty result means the row has no qualifying location.
    pub fn resolve(&self, cell: &str) -> Vec<String> {
        let lower = cell.to_ascii_lowercase();

        if lower.contains(DETAILS_OPEN) {
            return match details_body(cell, &lower) {
                Some(body) => self.domestic(self.split_lines(body)),
                None => Vec::new(),
            };
        }

        if self.line_break.is_match(cell) {
            return self.domestic(self.split_lines(cell));
        }

        let single = cell.trim();
        if single.is_empty() {
            Vec::new()
        } else if self.remote_word.is_match(single) {
            vec![REMOTE.to_string()]
        } else {
            self.domestic(vec![single.to_string()])
        }
    }

    /// Display string for a resolved list.
    pub fn display(locations: &[String]) -> String {
        locations.join(LOCATION_SEPARATOR)
    }

    fn domestic(&self, entries: Vec<String>) -> Vec<String> {
        entries
            .into_iter()
            .filter(|entry| !self.matcher.is_excluded(entry))
            .collect()
    }

    fn split_lines(&self, text: &str) -> Vec<String> {
        self.line_break
            .split(text)
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Inner content of a `<details>` block, between `</summary>` and `</details>`.
///
/// `lower` is the ASCII-lowercased cell, so byte offsets line up with `cell`.
fn details_body<'a>(cell: &'a str, lower: &str) -> Option<&'a str> {
    let start = lower.find(SUMMARY_CLOSE)? + SUMMARY_CLOSE.len();
    let end = start + lower[start..].find(DETAILS_CLOSE)?;
    cell.get(start..end)
}
