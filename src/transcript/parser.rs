use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, info, warn};

use super::error::{TimestampParseError, TranscriptError};
use super::grammar::{self, DateOrder};
use super::types::{MessageRecord, GROUP_NOTIFICATION};

fn author_re() -> &'static Regex {
    static AUTHOR_RE: OnceLock<Regex> = OnceLock::new();
    // First `<non-colon run>: ` only; later colons (URLs, times) stay in the body.
    AUTHOR_RE.get_or_init(|| Regex::new(r"([^:]+):\s").expect("valid author regex"))
}

/// A segment dropped because its header could not be resolved to a date.
#[derive(Debug, Clone)]
pub struct RejectedSegment {
    pub error: TimestampParseError,
    pub text: String,
}

/// Parse output: records in transcript order plus whatever had to be skipped.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    pub records: Vec<MessageRecord>,
    pub rejected: Vec<RejectedSegment>,
    pub date_order: Option<DateOrder>,
}

/// Splits a segment into `(author, body)`, falling back to the notification author.
pub fn split_author(segment: &str) -> (String, String) {
    match author_re().captures(segment) {
        Some(caps) => {
            let author = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            let rest = caps.get(0).map(|m| &segment[m.end()..]).unwrap_or_default();
            (author.trim().to_string(), rest.trim().to_string())
        }
        None => (GROUP_NOTIFICATION.to_string(), segment.trim().to_string()),
    }
}

/// Parses a whole exported transcript in one pass.
///
/// Fails only when the text contains no timestamp header at all. A header whose
/// date cannot be resolved drops that one message and is reported in
/// [`Transcript::rejected`].
pub fn parse(raw: &str) -> Result<Transcript, TranscriptError> {
    let segments = grammar::segments(raw);
    if segments.is_empty() {
        return Err(TranscriptError::EmptyTranscript);
    }

    let order = DateOrder::detect(segments.iter().map(|s| s.token));
    debug!("Resolved date order: {:?}", order);

    let mut transcript = Transcript {
        records: Vec::with_capacity(segments.len()),
        rejected: Vec::new(),
        date_order: Some(order),
    };

    for segment in segments {
        match order.resolve(segment.token) {
            Ok(timestamp) => {
                let (author, body) = split_author(segment.text);
                transcript
                    .records
                    .push(MessageRecord::new(timestamp, author, body));
            }
            Err(error) => {
                warn!("Skipping message: {}", error);
                transcript.rejected.push(RejectedSegment {
                    error,
                    text: segment.text.to_string(),
                });
            }
        }
    }

    info!(
        "Parsed {} messages ({} skipped)",
        transcript.records.len(),
        transcript.rejected.len()
    );

    Ok(transcript)
}
