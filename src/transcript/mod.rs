pub mod error;
pub mod grammar;
pub mod parser;
pub mod types;

pub use error::{TimestampParseError, TranscriptError};
pub use parser::{parse, RejectedSegment, Transcript};
pub use types::{CalendarFields, MessageRecord, SentimentScores, GROUP_NOTIFICATION};
