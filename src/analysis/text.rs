//! Text helpers used by the aggregation engine: stop words, link detection and
//! emoji detection.

use regex::Regex;
use std::collections::HashSet;
use std::path::Path;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum TextError {
    #[error("failed to read stop words from {path}: {source}")]
    StopWordsIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Lowercase stop-word set. Membership is exact per token.
#[derive(Debug, Clone, Default)]
pub struct StopWords {
    words: HashSet<String>,
}

impl StopWords {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    /// Parses a whitespace-separated word list.
    pub fn parse(text: &str) -> Self {
        Self::new(text.split_whitespace())
    }

    pub fn load(path: &Path) -> Result<Self, TextError> {
        let text = std::fs::read_to_string(path).map_err(|source| TextError::StopWordsIo {
            path: path.display().to_string(),
            source,
        })?;
        let words = Self::parse(&text);
        info!("Loaded {} stop words from {}", words.len(), path.display());
        Ok(words)
    }

    pub fn contains(&self, token: &str) -> bool {
        self.words.contains(&token.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

fn url_re() -> &'static Regex {
    static URL_RE: OnceLock<Regex> = OnceLock::new();
    URL_RE.get_or_init(|| {
        Regex::new(
            r#"(?ix)
            (?:
                \b(?:https?|ftp)://[^\s<>"]+
              | \bwww\.[^\s<>"]+
              | \b(?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+
                (?:com|org|net|edu|gov|io|in|co|uk|me|app|dev|info|biz|ly|gl|tv|ai)\b
                (?:/[^\s<>"]*)?
            )"#,
        )
        .expect("valid url regex")
    })
}

/// URLs found in `text`, trailing sentence punctuation removed.
pub fn find_urls(text: &str) -> Vec<&str> {
    url_re()
        .find_iter(text)
        .map(|m| m.as_str().trim_end_matches(&['.', ',', ':', ';', '!', '?', ')', '\''][..]))
        .filter(|u| !u.is_empty())
        .collect()
}

fn emoji_re() -> &'static Regex {
    static EMOJI_RE: OnceLock<Regex> = OnceLock::new();
    EMOJI_RE.get_or_init(|| {
        Regex::new(r"^[\p{Extended_Pictographic}\p{Emoji_Presentation}]$")
            .expect("valid emoji regex")
    })
}

/// Whether a single code point is an emoji on its own.
///
/// Digits, `#` and `*` carry the Unicode `Emoji` property but only render as emoji
/// in keycap sequences, so they are excluded.
pub fn is_emoji(c: char) -> bool {
    let mut buf = [0u8; 4];
    emoji_re().is_match(c.encode_utf8(&mut buf))
}
