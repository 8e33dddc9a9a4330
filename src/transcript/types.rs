use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::analysis::sentiment::{SentimentClass, SentimentValue};

/// Author assigned to segments that carry no `name: ` prefix (joins, renames, ...).
pub const GROUP_NOTIFICATION: &str = "group_notification";

/// Calendar features derived once from a message timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarFields {
    pub date_only: NaiveDate,
    pub year: i32,
    pub month_number: u32,
    pub month_name: String,
    pub day_of_month: u32,
    pub weekday_name: String,
    pub hour: u32,
    pub minute: u32,
    pub hour_bucket: String,
}

impl CalendarFields {
    pub fn from_timestamp(ts: &NaiveDateTime) -> Self {
        Self {
            date_only: ts.date(),
            year: ts.year(),
            month_number: ts.month(),
            month_name: ts.format("%B").to_string(),
            day_of_month: ts.day(),
            weekday_name: weekday_name(ts.weekday()).to_string(),
            hour: ts.hour(),
            minute: ts.minute(),
            hour_bucket: hour_bucket(ts.hour()),
        }
    }
}

/// Label of the one-hour slot starting at `hour`. `23` wraps to `"23-00"`, `0` is `"00-01"`.
pub fn hour_bucket(hour: u32) -> String {
    match hour {
        23 => "23-00".to_string(),
        0 => "00-01".to_string(),
        h => format!("{}-{}", h, h + 1),
    }
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Scores produced by the external sentiment scorer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentScores {
    /// 0.0-1.0
    pub positive: f64,
    /// 0.0-1.0
    pub negative: f64,
    /// 0.0-1.0
    pub neutral: f64,
    /// -1.0-1.0
    pub compound: f64,
}

impl SentimentScores {
    pub fn new(positive: f64, negative: f64, neutral: f64, compound: f64) -> Self {
        Self {
            positive,
            negative,
            neutral,
            compound,
        }
    }

    /// Forces every component into its documented range. NaN becomes 0.
    pub fn clamped(self) -> Self {
        let unit = |x: f64| if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) };
        let compound = if self.compound.is_nan() {
            0.0
        } else {
            self.compound.clamp(-1.0, 1.0)
        };
        Self {
            positive: unit(self.positive),
            negative: unit(self.negative),
            neutral: unit(self.neutral),
            compound,
        }
    }
}

/// One parsed chat event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRecord {
    pub timestamp: NaiveDateTime,
    pub author: String,
    pub body: String,
    #[serde(flatten)]
    calendar: CalendarFields,
    pub scores: Option<SentimentScores>,
    pub sentiment_class: Option<SentimentClass>,
    pub value: Option<SentimentValue>,
}

impl MessageRecord {
    pub fn new(timestamp: NaiveDateTime, author: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            calendar: CalendarFields::from_timestamp(&timestamp),
            timestamp,
            author: author.into(),
            body: body.into(),
            scores: None,
            sentiment_class: None,
            value: None,
        }
    }

    pub fn calendar(&self) -> &CalendarFields {
        &self.calendar
    }

    pub fn is_notification(&self) -> bool {
        self.author == GROUP_NOTIFICATION
    }

    /// Stores scorer output and derives both classifications from it.
    pub fn attach_scores(&mut self, scores: SentimentScores) {
        let scores = scores.clamped();
        self.value = Some(SentimentValue::from_components(
            scores.positive,
            scores.negative,
            scores.neutral,
        ));
        self.sentiment_class = Some(SentimentClass::from_compound(scores.compound));
        self.scores = Some(scores);
    }
}
