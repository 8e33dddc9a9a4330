pub mod engine;
pub mod gemini;
pub mod report;
pub mod sentiment;
pub mod text;
pub mod types;

pub use engine::{AggregationEngine, AuthorFilter, Selection, MEDIA_OMITTED, OVERALL};
pub use gemini::GeminiScorer;
pub use report::{PartitionReport, Report, ReportLimits, Section};
pub use sentiment::{SentimentClass, SentimentValue};
pub use text::StopWords;
