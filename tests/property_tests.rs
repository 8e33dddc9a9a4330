//! Property-based tests for the parser and aggregation invariants.

use chatlens::analysis::{AggregationEngine, Selection};
use chatlens::transcript::parser::split_author;
use chatlens::transcript::types::hour_bucket;
use chatlens::transcript::{self, MessageRecord};
use chrono::{NaiveDate, NaiveDateTime};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

fn author_strategy() -> impl Strategy<Value = String> {
    "[A-Z][a-z]{1,8}( [A-Z][a-z]{1,8})?"
}

/// Bodies may contain later colons (URLs, times) but never start with whitespace
/// or a colon.
fn body_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9][a-z0-9 :/.]{0,30}[a-z0-9]"
}

fn timestamp_strategy() -> impl Strategy<Value = NaiveDateTime> {
    (2015i32..2030, 1u32..=12, 1u32..=28, 0u32..24, 0u32..60).prop_map(|(y, m, d, h, min)| {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    })
}

fn header(ts: &NaiveDateTime) -> String {
    ts.format("%d/%m/%y, %-I:%M %P - ").to_string()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn author_body_round_trip(author in author_strategy(), body in body_strategy()) {
        let (a, b) = split_author(&format!("{}: {}", author, body));
        prop_assert_eq!(a, author);
        prop_assert_eq!(b, body);
    }

    #[test]
    fn hour_bucket_is_total_and_distinct(hour in 0u32..24, other in 0u32..24) {
        let label = hour_bucket(hour);
        prop_assert!(!label.is_empty());
        prop_assert_eq!(label == hour_bucket(other), hour == other);
    }

    #[test]
    fn one_record_per_header(
        messages in prop::collection::vec((timestamp_strategy(), author_strategy(), body_strategy()), 1..20)
    ) {
        let raw: String = messages
            .iter()
            .map(|(ts, author, body)| format!("{}{}: {}\n", header(ts), author, body))
            .collect();
        let parsed = transcript::parse(&raw).unwrap();
        prop_assert!(parsed.rejected.is_empty());
        prop_assert_eq!(parsed.records.len(), messages.len());
        for (record, (ts, author, body)) in parsed.records.iter().zip(&messages) {
            prop_assert_eq!(&record.timestamp, ts);
            prop_assert_eq!(&record.author, author);
            prop_assert_eq!(&record.body, body);
        }
    }

    #[test]
    fn heatmap_always_full_grid(stamps in prop::collection::vec(timestamp_strategy(), 0..40)) {
        let records: Vec<MessageRecord> = stamps
            .iter()
            .map(|ts| MessageRecord::new(*ts, "A", "x"))
            .collect();
        let heatmap = AggregationEngine::default().activity_heatmap(&records, &Selection::overall());
        prop_assert_eq!(heatmap.columns.len(), 24);
        prop_assert_eq!(heatmap.rows.len(), 7);
        prop_assert!(heatmap.cells.iter().all(|row| row.len() == 24));
        prop_assert_eq!(heatmap.total(), records.len());
    }

    #[test]
    fn lexical_frequency_sorted_descending(bodies in prop::collection::vec("[a-c]( [a-c]){0,5}", 0..20)) {
        let records: Vec<MessageRecord> = bodies
            .iter()
            .map(|b| MessageRecord::new(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap(), "A", b.as_str()))
            .collect();
        let words = AggregationEngine::default().lexical_frequency(&records, &Selection::overall(), 20);
        prop_assert!(words.windows(2).all(|w| w[0].count >= w[1].count));
        let total: usize = words.iter().map(|w| w.count).sum();
        let expected: usize = bodies.iter().map(|b| b.split_whitespace().count()).sum();
        prop_assert_eq!(total, expected);
    }
}
