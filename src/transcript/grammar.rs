//! Timestamp grammar for exported chat transcripts.
//!
//! Each message in an export starts with a header such as `1/2/23, 10:00 am - `.
//! The header is recognized as a delimiter: everything between two headers is one
//! message segment, and text before the first header is discarded.

use chrono::NaiveDateTime;
use regex::Regex;
use std::sync::OnceLock;

use super::error::TimestampParseError;

/// Day-first and month-first formats. Two-digit years come first so `23` is
/// never read as year 23.
const DAY_FIRST: &[&str] = &["%d/%m/%y, %I:%M %p", "%d/%m/%Y, %I:%M %p"];
const MONTH_FIRST: &[&str] = &["%m/%d/%y, %I:%M %p", "%m/%d/%Y, %I:%M %p"];

/// Tried per token when no single ordering fits the transcript.
const FALLBACK_FORMATS: &[&str] = &[
    "%d/%m/%y, %I:%M %p",
    "%m/%d/%y, %I:%M %p",
    "%d/%m/%Y, %I:%M %p",
    "%m/%d/%Y, %I:%M %p",
];

fn parse_with(cleaned: &str, formats: &[&str]) -> Option<NaiveDateTime> {
    formats
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(cleaned, f).ok())
}

fn delimiter_re() -> &'static Regex {
    static DELIMITER_RE: OnceLock<Regex> = OnceLock::new();
    DELIMITER_RE.get_or_init(|| {
        // `\s` is Unicode-aware, so U+202F and U+00A0 are accepted wherever a space is.
        Regex::new(r"\d{1,2}/\d{1,2}/\d{2,4},\s\d{1,2}:\d{2}\s(?i:[ap]m)\s-\s")
            .expect("valid timestamp delimiter regex")
    })
}

/// A raw timestamp header and the message text that follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<'a> {
    pub token: &'a str,
    pub text: &'a str,
}

/// Splits `raw` into (timestamp token, segment) pairs in transcript order.
pub fn segments(raw: &str) -> Vec<Segment<'_>> {
    let matches: Vec<_> = delimiter_re().find_iter(raw).collect();
    matches
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let end = matches.get(i + 1).map(|next| next.start()).unwrap_or(raw.len());
            Segment {
                token: m.as_str(),
                text: &raw[m.end()..end],
            }
        })
        .collect()
}

/// Strips the trailing ` - ` separator and normalizes narrow/no-break spaces.
pub fn normalize_token(token: &str) -> String {
    let token = token.trim_end();
    let token = token.strip_suffix('-').unwrap_or(token);
    token
        .trim_end()
        .chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .collect()
}

/// How the numeric date fields of a transcript are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrder {
    DayFirst,
    MonthFirst,
    /// No single ordering fits every token; each token is resolved on its own.
    PerToken,
}

impl DateOrder {
    /// Picks the first ordering under which every resolvable token parses.
    ///
    /// Tokens no format can read are left out, so a corrupt header never
    /// decides how the rest of the transcript is read.
    pub fn detect<'a>(tokens: impl IntoIterator<Item = &'a str>) -> Self {
        let cleaned: Vec<String> = tokens
            .into_iter()
            .map(normalize_token)
            .filter(|t| parse_with(t, FALLBACK_FORMATS).is_some())
            .collect();
        let all_parse = |formats: &[&str]| cleaned.iter().all(|t| parse_with(t, formats).is_some());
        if all_parse(DAY_FIRST) {
            DateOrder::DayFirst
        } else if all_parse(MONTH_FIRST) {
            DateOrder::MonthFirst
        } else {
            DateOrder::PerToken
        }
    }

    /// Resolves a single token under this ordering.
    pub fn resolve(&self, token: &str) -> Result<NaiveDateTime, TimestampParseError> {
        let cleaned = normalize_token(token);
        let formats = match self {
            DateOrder::DayFirst => DAY_FIRST,
            DateOrder::MonthFirst => MONTH_FIRST,
            DateOrder::PerToken => FALLBACK_FORMATS,
        };
        parse_with(&cleaned, formats)
            .or_else(|| parse_with(&cleaned, FALLBACK_FORMATS))
            .ok_or(TimestampParseError { token: cleaned })
    }
}
