//! Reductions over parsed message records.
//!
//! Every operation reads a slice of records through a [`Selection`] and builds a
//! fresh table. Nothing here fails: an empty selection yields zero counts and
//! empty lists.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use crate::transcript::MessageRecord;

use super::sentiment::{SentimentClass, SentimentValue};
use super::text::{self, StopWords};
use super::types::{
    AuthorShare, CountStats, DailyPoint, Heatmap, MonthlyPoint, NamedCount, SentimentDay,
    SentimentSummary, TermCount, TopAuthors,
};

/// Body an export writes in place of attachments.
pub const MEDIA_OMITTED: &str = "<Media omitted>";

/// Selector entry meaning "no author filter".
pub const OVERALL: &str = "Overall";

/// Heatmap rows, Sunday first.
pub const WEEKDAYS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Heatmap columns; index `h` holds messages sent during hour `h`.
pub const HOUR_COLUMNS: [&str; 24] = [
    "00-1", "1-2", "2-3", "3-4", "4-5", "5-6", "6-7", "7-8", "8-9", "9-10", "10-11", "11-12",
    "12-13", "13-14", "14-15", "15-16", "16-17", "17-18", "18-19", "19-20", "20-21", "21-22",
    "22-23", "23-00",
];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthorFilter {
    #[default]
    Overall,
    Author(String),
}

impl AuthorFilter {
    /// `"Overall"` (or an empty name) disables the filter.
    pub fn parse(name: &str) -> Self {
        let name = name.trim();
        if name.is_empty() || name == OVERALL {
            AuthorFilter::Overall
        } else {
            AuthorFilter::Author(name.to_string())
        }
    }

    /// Name shown for this filter in reports.
    pub fn label(&self) -> &str {
        match self {
            AuthorFilter::Overall => OVERALL,
            AuthorFilter::Author(name) => name,
        }
    }

    fn matches(&self, record: &MessageRecord) -> bool {
        match self {
            AuthorFilter::Overall => true,
            AuthorFilter::Author(name) => record.author == *name,
        }
    }
}

/// Which records an aggregation looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub author: AuthorFilter,
    pub value: Option<SentimentValue>,
    pub class: Option<SentimentClass>,
}

impl Selection {
    pub fn overall() -> Self {
        Self::default()
    }

    pub fn author(name: &str) -> Self {
        Self {
            author: AuthorFilter::parse(name),
            ..Self::default()
        }
    }

    pub fn with_value(mut self, value: SentimentValue) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_class(mut self, class: SentimentClass) -> Self {
        self.class = Some(class);
        self
    }

    /// Unscored records never match a sentiment partition.
    pub fn matches(&self, record: &MessageRecord) -> bool {
        self.author.matches(record)
            && self.value.map_or(true, |v| record.value == Some(v))
            && self.class.map_or(true, |c| record.sentiment_class == Some(c))
    }

    pub fn apply<'a>(
        &'a self,
        records: &'a [MessageRecord],
    ) -> impl Iterator<Item = &'a MessageRecord> + 'a {
        records.iter().filter(move |r| self.matches(r))
    }
}

/// Counts keys, remembering the order each key was first seen.
struct Tally<K> {
    slots: HashMap<K, usize>,
    entries: Vec<(K, usize)>,
}

impl<K: Hash + Eq + Clone> Tally<K> {
    fn new() -> Self {
        Self {
            slots: HashMap::new(),
            entries: Vec::new(),
        }
    }

    fn add(&mut self, key: K) {
        match self.slots.get(&key) {
            Some(&slot) => self.entries[slot].1 += 1,
            None => {
                self.slots.insert(key.clone(), self.entries.len());
                self.entries.push((key, 1));
            }
        }
    }

    fn total(&self) -> usize {
        self.entries.iter().map(|(_, n)| n).sum()
    }

    /// Descending by count; equal counts keep first-seen order.
    fn most_common(mut self, limit: usize) -> Vec<(K, usize)> {
        self.entries.sort_by(|a, b| b.1.cmp(&a.1));
        self.entries.truncate(limit);
        self.entries
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn shares(tally: Tally<String>) -> Vec<AuthorShare> {
    let total = tally.total();
    if total == 0 {
        return Vec::new();
    }
    tally
        .most_common(usize::MAX)
        .into_iter()
        .map(|(name, count)| AuthorShare {
            name,
            percent: round2(count as f64 / total as f64 * 100.0),
        })
        .collect()
}

fn category_counts<'a>(keys: impl Iterator<Item = &'a str>) -> Vec<NamedCount> {
    let mut tally = Tally::new();
    keys.for_each(|k| tally.add(k));
    tally
        .most_common(usize::MAX)
        .into_iter()
        .map(|(name, count)| NamedCount {
            name: name.to_string(),
            count,
        })
        .collect()
}

/// Stateless aggregations configured with the stop-word set and media marker.
#[derive(Debug, Clone)]
pub struct AggregationEngine {
    stop_words: StopWords,
    media_marker: String,
}

impl Default for AggregationEngine {
    fn default() -> Self {
        Self::new(StopWords::default())
    }
}

impl AggregationEngine {
    pub fn new(stop_words: StopWords) -> Self {
        Self {
            stop_words,
            media_marker: MEDIA_OMITTED.to_string(),
        }
    }

    pub fn with_media_marker(mut self, marker: impl Into<String>) -> Self {
        self.media_marker = marker.into();
        self
    }

    pub fn stop_words(&self) -> &StopWords {
        &self.stop_words
    }

    fn is_media(&self, record: &MessageRecord) -> bool {
        record.body == self.media_marker
    }

    /// Authors offered for selection: sorted, notification author removed,
    /// `"Overall"` first.
    pub fn participants(&self, records: &[MessageRecord]) -> Vec<String> {
        let mut names: Vec<String> = records
            .iter()
            .filter(|r| !r.is_notification())
            .map(|r| r.author.clone())
            .collect();
        names.sort();
        names.dedup();
        names.insert(0, OVERALL.to_string());
        names
    }

    pub fn count_stats(&self, records: &[MessageRecord], selection: &Selection) -> CountStats {
        selection
            .apply(records)
            .fold(CountStats::default(), |mut stats, r| {
                stats.messages += 1;
                stats.words += r.body.split_whitespace().count();
                if self.is_media(r) {
                    stats.media += 1;
                }
                stats.links += text::find_urls(&r.body).len();
                stats
            })
    }

    /// Busiest `k` authors plus every author's share of all authored messages.
    /// Ignores the selection's author filter.
    pub fn top_authors(&self, records: &[MessageRecord], selection: &Selection, k: usize) -> TopAuthors {
        let scope = Selection {
            author: AuthorFilter::Overall,
            ..selection.clone()
        };
        let mut tally = Tally::new();
        scope
            .apply(records)
            .filter(|r| !r.is_notification())
            .for_each(|r| tally.add(r.author.clone()));

        let mut ranked = tally.entries.clone();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        let top = ranked
            .into_iter()
            .take(k)
            .map(|(name, count)| NamedCount { name, count })
            .collect();

        TopAuthors {
            top,
            shares: shares(tally),
        }
    }

    /// Each author's percentage of the records with sentiment value `value`.
    /// Covers the whole transcript, notification author included.
    pub fn percentage_contribution(
        &self,
        records: &[MessageRecord],
        value: SentimentValue,
    ) -> Vec<AuthorShare> {
        let mut tally = Tally::new();
        records
            .iter()
            .filter(|r| r.value == Some(value))
            .for_each(|r| tally.add(r.author.clone()));
        shares(tally)
    }

    /// Message counts per calendar month, oldest first.
    pub fn monthly_timeline(&self, records: &[MessageRecord], selection: &Selection) -> Vec<MonthlyPoint> {
        let mut months: BTreeMap<(i32, u32), (String, usize)> = BTreeMap::new();
        for r in selection.apply(records) {
            let cal = r.calendar();
            months
                .entry((cal.year, cal.month_number))
                .or_insert_with(|| (cal.month_name.clone(), 0))
                .1 += 1;
        }
        months
            .into_iter()
            .map(|((year, month_number), (month_name, count))| MonthlyPoint {
                label: format!("{}-{}", month_name, year),
                year,
                month_number,
                month_name,
                count,
            })
            .collect()
    }

    /// Message counts per day, oldest first.
    pub fn daily_timeline(&self, records: &[MessageRecord], selection: &Selection) -> Vec<DailyPoint> {
        let mut days: BTreeMap<_, usize> = BTreeMap::new();
        for r in selection.apply(records) {
            *days.entry(r.calendar().date_only).or_insert(0) += 1;
        }
        days.into_iter()
            .map(|(date, count)| DailyPoint { date, count })
            .collect()
    }

    /// Counts per weekday name, busiest first. Absent weekdays are not listed.
    pub fn weekday_activity(&self, records: &[MessageRecord], selection: &Selection) -> Vec<NamedCount> {
        category_counts(selection.apply(records).map(|r| r.calendar().weekday_name.as_str()))
    }

    /// Counts per month name (all years together), busiest first.
    pub fn month_activity(&self, records: &[MessageRecord], selection: &Selection) -> Vec<NamedCount> {
        category_counts(selection.apply(records).map(|r| r.calendar().month_name.as_str()))
    }

    pub fn activity_heatmap(&self, records: &[MessageRecord], selection: &Selection) -> Heatmap {
        let mut cells = vec![vec![0usize; HOUR_COLUMNS.len()]; WEEKDAYS.len()];
        for r in selection.apply(records) {
            let cal = r.calendar();
            if let Some(row) = WEEKDAYS.iter().position(|d| *d == cal.weekday_name) {
                cells[row][cal.hour as usize % 24] += 1;
            }
        }
        Heatmap {
            rows: WEEKDAYS.iter().map(|d| d.to_string()).collect(),
            columns: HOUR_COLUMNS.iter().map(|c| c.to_string()).collect(),
            cells,
        }
    }

    /// Top `k` lowercase tokens, skipping notifications, media placeholders and
    /// stop words.
    pub fn lexical_frequency(
        &self,
        records: &[MessageRecord],
        selection: &Selection,
        k: usize,
    ) -> Vec<TermCount> {
        let mut tally = Tally::new();
        let bodies = selection
            .apply(records)
            .filter(|r| !r.is_notification() && !self.is_media(r));
        for r in bodies {
            for token in r.body.to_lowercase().split_whitespace() {
                if !self.stop_words.contains(token) {
                    tally.add(token.to_string());
                }
            }
        }
        tally
            .most_common(k)
            .into_iter()
            .map(|(term, count)| TermCount { term, count })
            .collect()
    }

    /// Every distinct emoji in the selected bodies, most frequent first.
    pub fn emoji_frequency(&self, records: &[MessageRecord], selection: &Selection) -> Vec<TermCount> {
        let mut tally = Tally::new();
        selection
            .apply(records)
            .flat_map(|r| r.body.chars())
            .filter(|c| text::is_emoji(*c))
            .for_each(|c| tally.add(c));
        tally
            .most_common(usize::MAX)
            .into_iter()
            .map(|(c, count)| TermCount {
                term: c.to_string(),
                count,
            })
            .collect()
    }

    /// Compound-class counts; all three classes are always present.
    pub fn sentiment_summary(&self, records: &[MessageRecord], selection: &Selection) -> SentimentSummary {
        selection
            .apply(records)
            .fold(SentimentSummary::default(), |mut s, r| {
                match r.sentiment_class {
                    Some(SentimentClass::Positive) => s.positive += 1,
                    Some(SentimentClass::Negative) => s.negative += 1,
                    Some(SentimentClass::Neutral) => s.neutral += 1,
                    None => {}
                }
                s
            })
    }

    /// Compound-class counts per day, oldest first. Days with only unscored
    /// messages are omitted.
    pub fn sentiment_timeline(&self, records: &[MessageRecord], selection: &Selection) -> Vec<SentimentDay> {
        let mut days: BTreeMap<_, SentimentSummary> = BTreeMap::new();
        for r in selection.apply(records) {
            let Some(class) = r.sentiment_class else {
                continue;
            };
            let day = days.entry(r.calendar().date_only).or_default();
            match class {
                SentimentClass::Positive => day.positive += 1,
                SentimentClass::Negative => day.negative += 1,
                SentimentClass::Neutral => day.neutral += 1,
            }
        }
        days.into_iter()
            .map(|(date, counts)| SentimentDay { date, counts })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::{SentimentScores, GROUP_NOTIFICATION};
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn msg(ts: NaiveDateTime, author: &str, body: &str) -> MessageRecord {
        MessageRecord::new(ts, author, body)
    }

    fn scored(ts: NaiveDateTime, author: &str, body: &str, s: (f64, f64, f64, f64)) -> MessageRecord {
        let mut r = msg(ts, author, body);
        r.attach_scores(SentimentScores::new(s.0, s.1, s.2, s.3));
        r
    }

    fn sample() -> Vec<MessageRecord> {
        vec![
            msg(at(2023, 1, 1, 9), GROUP_NOTIFICATION, "Alice created group"),
            msg(at(2023, 1, 1, 10), "Alice", "hello there https://example.com"),
            msg(at(2023, 1, 1, 11), "Bob", MEDIA_OMITTED),
            msg(at(2023, 1, 2, 0), "Alice", "good morning 😂😂"),
            msg(at(2023, 2, 5, 23), "Carol", "late night 👍"),
            msg(at(2023, 2, 6, 12), "Bob", "see www.rust-lang.org and docs"),
        ]
    }

    #[test]
    fn author_filter_labels() {
        assert_eq!(AuthorFilter::parse("").label(), OVERALL);
        assert_eq!(AuthorFilter::parse(" Overall ").label(), "Overall");
        assert_eq!(AuthorFilter::parse("Bob").label(), "Bob");
    }

    #[test]
    fn count_stats_overall_and_per_author() {
        let engine = AggregationEngine::default();
        let records = sample();

        let all = engine.count_stats(&records, &Selection::overall());
        assert_eq!(all.messages, 6);
        assert_eq!(all.words, 3 + 3 + 2 + 3 + 3 + 4);
        assert_eq!(all.media, 1);
        assert_eq!(all.links, 2);

        let bob = engine.count_stats(&records, &Selection::author("Bob"));
        assert_eq!(bob, CountStats { messages: 2, words: 6, media: 1, links: 1 });
    }

    #[test]
    fn unknown_author_degrades_to_zero() {
        let engine = AggregationEngine::default();
        let records = sample();
        let nobody = Selection::author("Nobody");
        assert_eq!(engine.count_stats(&records, &nobody), CountStats::default());
        assert!(engine.monthly_timeline(&records, &nobody).is_empty());
        assert!(engine.lexical_frequency(&records, &nobody, 20).is_empty());
        assert!(engine.activity_heatmap(&records, &nobody).is_empty());
    }

    #[test]
    fn participants_sorted_with_overall_first() {
        let engine = AggregationEngine::default();
        assert_eq!(
            engine.participants(&sample()),
            vec!["Overall", "Alice", "Bob", "Carol"]
        );
    }

    #[test]
    fn top_authors_excludes_notifications_and_keeps_first_seen_on_ties() {
        let engine = AggregationEngine::default();
        let result = engine.top_authors(&sample(), &Selection::author("Carol"), 2);
        let top: Vec<_> = result.top.iter().map(|n| (n.name.as_str(), n.count)).collect();
        assert_eq!(top, vec![("Alice", 2), ("Bob", 2)]);

        let shares: Vec<_> = result.shares.iter().map(|s| (s.name.as_str(), s.percent)).collect();
        assert_eq!(shares, vec![("Alice", 40.0), ("Bob", 40.0), ("Carol", 20.0)]);
    }

    #[test]
    fn shares_round_to_two_decimals() {
        let engine = AggregationEngine::default();
        let records = vec![
            msg(at(2023, 1, 1, 1), "A", "x"),
            msg(at(2023, 1, 1, 2), "B", "x"),
            msg(at(2023, 1, 1, 3), "C", "x"),
        ];
        let result = engine.top_authors(&records, &Selection::overall(), 5);
        assert!(result.shares.iter().all(|s| s.percent == 33.33));
    }

    #[test]
    fn monthly_timeline_keeps_years_apart() {
        let engine = AggregationEngine::default();
        let records = vec![
            msg(at(2023, 12, 3, 10), "A", "x"),
            msg(at(2022, 12, 24, 10), "A", "x"),
            msg(at(2023, 12, 9, 10), "B", "x"),
            msg(at(2023, 1, 1, 10), "B", "x"),
        ];
        let timeline = engine.monthly_timeline(&records, &Selection::overall());
        let labels: Vec<_> = timeline.iter().map(|p| (p.label.as_str(), p.count)).collect();
        assert_eq!(
            labels,
            vec![("December-2022", 1), ("January-2023", 1), ("December-2023", 2)]
        );
    }

    #[test]
    fn daily_timeline_ascending() {
        let engine = AggregationEngine::default();
        let days = engine.daily_timeline(&sample(), &Selection::overall());
        let got: Vec<_> = days.iter().map(|d| (d.date.to_string(), d.count)).collect();
        assert_eq!(
            got,
            vec![
                ("2023-01-01".to_string(), 3),
                ("2023-01-02".to_string(), 1),
                ("2023-02-05".to_string(), 1),
                ("2023-02-06".to_string(), 1),
            ]
        );
    }

    #[test]
    fn weekday_and_month_activity_busiest_first() {
        let engine = AggregationEngine::default();
        let records = sample();
        let weekdays = engine.weekday_activity(&records, &Selection::overall());
        // 2023-01-01 and 2023-02-05 are Sundays, 01-02 and 02-06 Mondays.
        assert_eq!(weekdays[0], NamedCount { name: "Sunday".into(), count: 4 });
        assert_eq!(weekdays[1], NamedCount { name: "Monday".into(), count: 2 });
        assert_eq!(weekdays.len(), 2);

        let months = engine.month_activity(&records, &Selection::overall());
        assert_eq!(months[0], NamedCount { name: "January".into(), count: 4 });
        assert_eq!(months[1], NamedCount { name: "February".into(), count: 2 });
    }

    #[test]
    fn heatmap_is_full_grid_and_midnight_lands_in_first_column() {
        let engine = AggregationEngine::default();
        let heatmap = engine.activity_heatmap(&sample(), &Selection::overall());
        assert_eq!(heatmap.rows.len(), 7);
        assert_eq!(heatmap.columns.len(), 24);
        assert!(heatmap.cells.iter().all(|row| row.len() == 24));
        assert_eq!(heatmap.rows[0], "Sunday");
        assert_eq!(heatmap.columns[0], "00-1");
        assert_eq!(heatmap.columns[23], "23-00");
        assert_eq!(heatmap.get("Monday", "00-1"), Some(1));
        assert_eq!(heatmap.get("Sunday", "23-00"), Some(1));
        assert_eq!(heatmap.get("Sunday", "10-11"), Some(1));
        assert_eq!(heatmap.get("Friday", "10-11"), Some(0));
        assert_eq!(heatmap.total(), 6);
    }

    #[test]
    fn lexical_frequency_drops_stop_words_media_and_notifications() {
        let engine = AggregationEngine::new(StopWords::parse("the"));
        let records = vec![
            msg(at(2023, 1, 1, 1), "A", "the cat sat"),
            msg(at(2023, 1, 1, 2), "B", "The dog sat"),
            msg(at(2023, 1, 1, 3), "B", MEDIA_OMITTED),
            msg(at(2023, 1, 1, 4), GROUP_NOTIFICATION, "sat sat sat"),
        ];
        let words = engine.lexical_frequency(&records, &Selection::overall(), 20);
        let got: Vec<_> = words.iter().map(|t| (t.term.as_str(), t.count)).collect();
        assert_eq!(got, vec![("sat", 2), ("cat", 1), ("dog", 1)]);

        let top1 = engine.lexical_frequency(&records, &Selection::overall(), 1);
        assert_eq!(top1.len(), 1);
    }

    #[test]
    fn emoji_frequency_counts_every_occurrence() {
        let engine = AggregationEngine::default();
        let emojis = engine.emoji_frequency(&sample(), &Selection::overall());
        let got: Vec<_> = emojis.iter().map(|t| (t.term.as_str(), t.count)).collect();
        assert_eq!(got, vec![("😂", 2), ("👍", 1)]);
    }

    #[test]
    fn value_partitions_and_contribution() {
        let engine = AggregationEngine::default();
        let records = vec![
            scored(at(2023, 3, 1, 8), "A", "great", (0.8, 0.0, 0.2, 0.6)),
            scored(at(2023, 3, 1, 9), "B", "awful", (0.0, 0.7, 0.3, -0.5)),
            scored(at(2023, 3, 2, 9), "B", "lovely", (0.6, 0.0, 0.4, 0.4)),
            scored(at(2023, 3, 2, 10), "B", "nice", (0.5, 0.0, 0.5, 0.3)),
            msg(at(2023, 3, 3, 10), "C", "unscored"),
        ];

        let positive = Selection::overall().with_value(SentimentValue::Positive);
        assert_eq!(engine.count_stats(&records, &positive).messages, 3);
        assert_eq!(engine.daily_timeline(&records, &positive).len(), 2);

        let shares = engine.percentage_contribution(&records, SentimentValue::Positive);
        let got: Vec<_> = shares.iter().map(|s| (s.name.as_str(), s.percent)).collect();
        assert_eq!(got, vec![("B", 66.67), ("A", 33.33)]);

        assert!(engine
            .percentage_contribution(&records, SentimentValue::Neutral)
            .is_empty());
    }

    #[test]
    fn sentiment_summary_and_timeline_use_compound_class() {
        let engine = AggregationEngine::default();
        let records = vec![
            // value is positive on the tie, class is neutral
            scored(at(2023, 3, 1, 8), "A", "hmm", (0.5, 0.5, 0.0, 0.0)),
            scored(at(2023, 3, 1, 9), "B", "bad", (0.0, 0.6, 0.4, -0.4)),
            scored(at(2023, 3, 2, 9), "B", "good", (0.6, 0.0, 0.4, 0.4)),
            msg(at(2023, 3, 4, 9), "C", "unscored"),
        ];
        let summary = engine.sentiment_summary(&records, &Selection::overall());
        assert_eq!(summary, SentimentSummary { positive: 1, negative: 1, neutral: 1 });

        let timeline = engine.sentiment_timeline(&records, &Selection::overall());
        assert_eq!(timeline.len(), 2);
        assert_eq!(timeline[0].counts, SentimentSummary { positive: 0, negative: 1, neutral: 1 });
        assert_eq!(timeline[1].counts, SentimentSummary { positive: 1, negative: 0, neutral: 0 });

        let neutral_words = engine.lexical_frequency(
            &records,
            &Selection::overall().with_class(SentimentClass::Neutral),
            20,
        );
        assert_eq!(neutral_words, vec![TermCount { term: "hmm".into(), count: 1 }]);
    }

    #[test]
    fn empty_input_gives_empty_outputs() {
        let engine = AggregationEngine::default();
        let none: Vec<MessageRecord> = Vec::new();
        let all = Selection::overall();
        assert_eq!(engine.count_stats(&none, &all), CountStats::default());
        assert_eq!(engine.top_authors(&none, &all, 5), TopAuthors::default());
        assert!(engine.daily_timeline(&none, &all).is_empty());
        assert!(engine.weekday_activity(&none, &all).is_empty());
        assert!(engine.emoji_frequency(&none, &all).is_empty());
        assert_eq!(engine.sentiment_summary(&none, &all).total(), 0);
        let heatmap = engine.activity_heatmap(&none, &all);
        assert_eq!(heatmap.columns.len(), 24);
        assert!(heatmap.is_empty());
        assert_eq!(engine.participants(&none), vec!["Overall"]);
    }
}
