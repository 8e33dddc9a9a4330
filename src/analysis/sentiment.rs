use serde::{Deserialize, Serialize};
use std::fmt;

/// Compound score at or above which a message counts as positive.
pub const POSITIVE_THRESHOLD: f64 = 0.05;
/// Compound score at or below which a message counts as negative.
pub const NEGATIVE_THRESHOLD: f64 = -0.05;

/// Message mood derived from the compound score alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SentimentClass {
    Positive,
    Neutral,
    Negative,
}

impl SentimentClass {
    pub fn from_compound(compound: f64) -> Self {
        if compound >= POSITIVE_THRESHOLD {
            SentimentClass::Positive
        } else if compound <= NEGATIVE_THRESHOLD {
            SentimentClass::Negative
        } else {
            SentimentClass::Neutral
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SentimentClass::Positive => "Positive",
            SentimentClass::Neutral => "Neutral",
            SentimentClass::Negative => "Negative",
        }
    }

    pub fn all() -> &'static [SentimentClass] {
        &[
            SentimentClass::Positive,
            SentimentClass::Negative,
            SentimentClass::Neutral,
        ]
    }
}

impl fmt::Display for SentimentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Ternary per-message label taken from the largest of the three component scores.
///
/// Serialized as `1`, `0` or `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum SentimentValue {
    Positive,
    Neutral,
    Negative,
}

impl SentimentValue {
    /// Precedence on ties: positive, then negative, then neutral.
    ///
    /// `positive` wins whenever it is not below either other score; `negative` wins
    /// when it is not below either other score and `positive` did not win. Anything
    /// else (including NaN input) is neutral.
    pub fn from_components(positive: f64, negative: f64, neutral: f64) -> Self {
        if positive >= negative && positive >= neutral {
            SentimentValue::Positive
        } else if negative >= positive && negative >= neutral {
            SentimentValue::Negative
        } else {
            SentimentValue::Neutral
        }
    }

    pub fn as_i8(&self) -> i8 {
        match self {
            SentimentValue::Positive => 1,
            SentimentValue::Neutral => 0,
            SentimentValue::Negative => -1,
        }
    }

    pub fn all() -> &'static [SentimentValue] {
        &[
            SentimentValue::Positive,
            SentimentValue::Neutral,
            SentimentValue::Negative,
        ]
    }
}

impl From<SentimentValue> for i8 {
    fn from(value: SentimentValue) -> Self {
        value.as_i8()
    }
}

impl TryFrom<i8> for SentimentValue {
    type Error = String;

    fn try_from(raw: i8) -> Result<Self, Self::Error> {
        match raw {
            1 => Ok(SentimentValue::Positive),
            0 => Ok(SentimentValue::Neutral),
            -1 => Ok(SentimentValue::Negative),
            other => Err(format!("sentiment value must be -1, 0 or 1, got {}", other)),
        }
    }
}

impl fmt::Display for SentimentValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i8())
    }
}
