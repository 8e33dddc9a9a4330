use thiserror::Error;

/// Errors surfaced while turning raw transcript text into records.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranscriptError {
    #[error("no timestamp headers found in transcript")]
    EmptyTranscript,
}

/// A header matched the delimiter grammar but no date interpretation fits it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unrecognized timestamp: {token}")]
pub struct TimestampParseError {
    pub token: String,
}
