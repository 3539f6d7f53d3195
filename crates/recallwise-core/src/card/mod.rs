//! Learning items and their spaced-repetition state.
//!
//! Serialized field names follow the interchange shapes hosts already store:
//! `nextReview`, `averageResponseTime`, `lastReviewed` on the state and
//! `quality`, `responseTime`, `timestamp` on a review result.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Highest valid quality rating.
pub const MAX_QUALITY: i32 = 5;

/// Lowest quality that counts as a correct answer.
pub const PASSING_QUALITY: i32 = 3;

/// Per-item scheduling state, owned by the caller and replaced after each review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingState {
    /// Days until the next review (always >= 1)
    pub interval: u32,
    /// Consecutive successful reviews since the last reset
    pub repetition: u32,
    pub ease_factor: f64,
    #[serde(rename = "nextReview")]
    pub next_review_at: DateTime<Utc>,
    #[serde(default)]
    pub total_reviews: u32,
    #[serde(default)]
    pub correct_streak: u32,
    #[serde(rename = "averageResponseTime", default)]
    pub average_response_time_seconds: f64,
    #[serde(
        rename = "lastReviewed",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub last_reviewed_at: Option<DateTime<Utc>>,
}

impl SchedulingState {
    /// Default ease factor for items entering the system.
    pub const DEFAULT_EASE_FACTOR: f64 = 2.5;

    /// State for an item entering the system at `now`; it is due immediately.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self::with_ease_factor(now, Self::DEFAULT_EASE_FACTOR)
    }

    /// Same as [`SchedulingState::new`] with a configured starting ease.
    pub fn with_ease_factor(now: DateTime<Utc>, ease_factor: f64) -> Self {
        Self {
            interval: 1,
            repetition: 0,
            ease_factor,
            next_review_at: now,
            total_reviews: 0,
            correct_streak: 0,
            average_response_time_seconds: 0.0,
            last_reviewed_at: None,
        }
    }

    /// Never reviewed.
    pub fn is_new(&self) -> bool {
        self.repetition == 0 && !self.has_been_reviewed()
    }

    /// Has at least one review on record.
    pub fn has_been_reviewed(&self) -> bool {
        self.total_reviews > 0 || self.last_reviewed_at.is_some()
    }
}

/// Outcome of a single review, supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewOutcome {
    /// 0 = total failure ... 5 = perfect
    pub quality: i32,
    #[serde(rename = "responseTime")]
    pub response_time_seconds: f64,
    #[serde(rename = "timestamp")]
    pub occurred_at: DateTime<Utc>,
}

impl ReviewOutcome {
    pub fn new(quality: i32, response_time_seconds: f64, occurred_at: DateTime<Utc>) -> Self {
        Self {
            quality,
            response_time_seconds,
            occurred_at,
        }
    }

    /// Build an outcome from raw interchange values, validating all of them.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] for an out-of-range quality, a negative or
    /// non-finite response time, or a timestamp that is not RFC 3339.
    pub fn parse(
        quality: i32,
        response_time_seconds: f64,
        timestamp: &str,
    ) -> Result<Self, ValidationError> {
        let outcome = Self::new(quality, response_time_seconds, parse_timestamp(timestamp)?);
        outcome.validate()?;
        Ok(outcome)
    }

    /// Reject out-of-range values instead of clamping them.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(0..=MAX_QUALITY).contains(&self.quality) {
            return Err(ValidationError::QualityOutOfRange {
                quality: self.quality,
            });
        }
        if !self.response_time_seconds.is_finite() {
            return Err(ValidationError::NonFiniteValue {
                field: "responseTime".to_string(),
            });
        }
        if self.response_time_seconds < 0.0 {
            return Err(ValidationError::NegativeResponseTime {
                seconds: self.response_time_seconds,
            });
        }
        Ok(())
    }

    pub fn is_correct(&self) -> bool {
        self.quality >= PASSING_QUALITY
    }
}

/// Parse an ISO-8601 / RFC 3339 timestamp into UTC.
///
/// # Errors
///
/// Returns [`ValidationError::MalformedTimestamp`] when the text does not parse.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, ValidationError> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ValidationError::MalformedTimestamp {
            value: value.to_string(),
            message: e.to_string(),
        })
}

/// Content difficulty label supplied by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Medium
    }
}

/// A learning item as seen by the engine: an identifier, its scheduling
/// state and optional catalog labels. Content lives elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyItem {
    pub id: String,
    pub state: SchedulingState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl StudyItem {
    pub fn new(id: impl Into<String>, state: SchedulingState) -> Self {
        Self {
            id: id.into(),
            state,
            difficulty: None,
            category: None,
        }
    }

    /// Set difficulty (builder pattern)
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    /// Set category (builder pattern)
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Unlabeled items are treated as medium.
    pub fn effective_difficulty(&self) -> Difficulty {
        self.difficulty.unwrap_or_default()
    }
}
