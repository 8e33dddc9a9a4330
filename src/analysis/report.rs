use serde::Serialize;

use crate::transcript::MessageRecord;

use super::engine::{AggregationEngine, AuthorFilter, Selection};
use super::sentiment::{SentimentClass, SentimentValue};
use super::types::{
    AuthorShare, CountStats, DailyPoint, Heatmap, MonthlyPoint, NamedCount, SentimentDay,
    SentimentSummary, TermCount, TopAuthors,
};

/// A table, or an explicit marker that the selection had nothing to show.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum Section<T> {
    Ready(T),
    NoData,
}

impl<T> Section<T> {
    fn when(has_data: bool, table: T) -> Self {
        if has_data {
            Section::Ready(table)
        } else {
            Section::NoData
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Section::Ready(_))
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Section::Ready(table) => Some(table),
            Section::NoData => None,
        }
    }
}

impl<T> Section<Vec<T>> {
    fn list(items: Vec<T>) -> Self {
        let has_data = !items.is_empty();
        Section::when(has_data, items)
    }
}

impl Section<Heatmap> {
    fn heatmap(heatmap: Heatmap) -> Self {
        let has_data = !heatmap.is_empty();
        Section::when(has_data, heatmap)
    }
}

/// How many entries the top-k sections keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportLimits {
    pub top_words: usize,
    pub top_authors: usize,
}

impl Default for ReportLimits {
    fn default() -> Self {
        Self {
            top_words: 20,
            top_authors: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SentimentOverview {
    pub summary: SentimentSummary,
    pub timeline: Vec<SentimentDay>,
    pub positive_words: Vec<TermCount>,
    pub negative_words: Vec<TermCount>,
    pub neutral_words: Vec<TermCount>,
}

/// Every table for one author selection.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub user: String,
    pub stats: CountStats,
    /// Only built for the unfiltered selection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_authors: Option<Section<TopAuthors>>,
    pub monthly_timeline: Section<Vec<MonthlyPoint>>,
    pub daily_timeline: Section<Vec<DailyPoint>>,
    pub weekday_activity: Section<Vec<NamedCount>>,
    pub month_activity: Section<Vec<NamedCount>>,
    pub activity_heatmap: Section<Heatmap>,
    pub common_words: Section<Vec<TermCount>>,
    pub emojis: Section<Vec<TermCount>>,
    pub sentiment: Section<SentimentOverview>,
}

impl Report {
    pub fn build(
        engine: &AggregationEngine,
        records: &[MessageRecord],
        selection: &Selection,
        limits: ReportLimits,
    ) -> Self {
        let user = selection.author.label().to_string();

        let top_authors = match selection.author {
            AuthorFilter::Overall => {
                let top = engine.top_authors(records, selection, limits.top_authors);
                let has_data = !top.top.is_empty();
                Some(Section::when(has_data, top))
            }
            AuthorFilter::Author(_) => None,
        };

        let summary = engine.sentiment_summary(records, selection);
        let class_words = |class: SentimentClass| {
            engine.lexical_frequency(records, &selection.clone().with_class(class), limits.top_words)
        };
        let sentiment = Section::when(
            summary.total() > 0,
            SentimentOverview {
                summary,
                timeline: engine.sentiment_timeline(records, selection),
                positive_words: class_words(SentimentClass::Positive),
                negative_words: class_words(SentimentClass::Negative),
                neutral_words: class_words(SentimentClass::Neutral),
            },
        );

        Self {
            user,
            stats: engine.count_stats(records, selection),
            top_authors,
            monthly_timeline: Section::list(engine.monthly_timeline(records, selection)),
            daily_timeline: Section::list(engine.daily_timeline(records, selection)),
            weekday_activity: Section::list(engine.weekday_activity(records, selection)),
            month_activity: Section::list(engine.month_activity(records, selection)),
            activity_heatmap: Section::heatmap(engine.activity_heatmap(records, selection)),
            common_words: Section::list(engine.lexical_frequency(records, selection, limits.top_words)),
            emojis: Section::list(engine.emoji_frequency(records, selection)),
            sentiment,
        }
    }
}

/// The temporal and lexical tables restricted to one sentiment value.
#[derive(Debug, Clone, Serialize)]
pub struct PartitionReport {
    pub user: String,
    pub value: SentimentValue,
    pub monthly_timeline: Section<Vec<MonthlyPoint>>,
    pub daily_timeline: Section<Vec<DailyPoint>>,
    pub weekday_activity: Section<Vec<NamedCount>>,
    pub month_activity: Section<Vec<NamedCount>>,
    pub activity_heatmap: Section<Heatmap>,
    pub common_words: Section<Vec<TermCount>>,
    /// Share of this value per author across the whole transcript.
    pub contribution: Section<Vec<AuthorShare>>,
}

impl PartitionReport {
    pub fn build(
        engine: &AggregationEngine,
        records: &[MessageRecord],
        selection: &Selection,
        value: SentimentValue,
        limits: ReportLimits,
    ) -> Self {
        let partition = selection.clone().with_value(value);
        let user = selection.author.label().to_string();

        Self {
            user,
            value,
            monthly_timeline: Section::list(engine.monthly_timeline(records, &partition)),
            daily_timeline: Section::list(engine.daily_timeline(records, &partition)),
            weekday_activity: Section::list(engine.weekday_activity(records, &partition)),
            month_activity: Section::list(engine.month_activity(records, &partition)),
            activity_heatmap: Section::heatmap(engine.activity_heatmap(records, &partition)),
            common_words: Section::list(engine.lexical_frequency(records, &partition, limits.top_words)),
            contribution: Section::list(engine.percentage_contribution(records, value)),
        }
    }
}
