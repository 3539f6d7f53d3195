//! Review queue selection.
//!
//! Classifies each item relative to `now` and orders the ones needing review:
//! - New: never reviewed, fixed top priority
//! - Overdue: past its due time, priority grows with days overdue
//! - Due today: due later in the current (UTC) day
//! - Due soon: due within the window after today
//!
//! Everything else is left out.

mod forecast;

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::card::StudyItem;
use crate::config::RankingConfig;

pub use forecast::{forecast_reviews, DailyForecast};

const SECONDS_PER_DAY: i64 = 86_400;

/// Why an item was selected for review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReviewReason {
    New,
    Overdue { days_overdue: u32 },
    DueToday,
    DueSoon,
}

impl ReviewReason {
    /// Stable tag for presentation layers.
    pub fn tag(&self) -> &'static str {
        match self {
            ReviewReason::New => "new",
            ReviewReason::Overdue { .. } => "overdue",
            ReviewReason::DueToday => "due_today",
            ReviewReason::DueSoon => "due_soon",
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, ReviewReason::New)
    }
}

impl fmt::Display for ReviewReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewReason::Overdue { days_overdue: 1 } => write!(f, "overdue by 1 day"),
            ReviewReason::Overdue { days_overdue } => write!(f, "overdue by {days_overdue} days"),
            other => f.write_str(other.tag()),
        }
    }
}

/// An item selected for review with its priority and reason.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewCandidate<'a> {
    pub item: &'a StudyItem,
    pub priority: u32,
    pub reason: ReviewReason,
}

/// Selects and orders items needing review.
#[derive(Debug, Clone, Default)]
pub struct DueCardRanker {
    config: RankingConfig,
}

impl DueCardRanker {
    /// Create a ranker with default config
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom config
    pub fn with_config(config: RankingConfig) -> Self {
        Self { config }
    }

    /// Select up to `max_cards` items needing review, highest priority first.
    ///
    /// Ties are broken by earliest due time (most overdue first), then by
    /// lower ease factor. New items are dropped entirely when `include_new`
    /// is false. Inputs are never modified.
    pub fn select_for_review<'a>(
        &self,
        items: &'a [StudyItem],
        max_cards: usize,
        include_new: bool,
        now: DateTime<Utc>,
    ) -> Vec<ReviewCandidate<'a>> {
        let mut candidates: Vec<ReviewCandidate<'a>> = items
            .iter()
            .filter_map(|item| {
                let candidate = self.classify(item, now)?;
                if !include_new && candidate.reason.is_new() {
                    tracing::trace!(item_id = %item.id, "skipping new item");
                    return None;
                }
                Some(candidate)
            })
            .collect();

        candidates.sort_by(compare_candidates);
        candidates.truncate(max_cards);

        tracing::debug!(
            considered = items.len(),
            selected = candidates.len(),
            max_cards,
            include_new,
            "selected items for review"
        );

        candidates
    }

    /// Classify a single item; `None` when it does not need review yet.
    pub fn classify<'a>(&self, item: &'a StudyItem, now: DateTime<Utc>) -> Option<ReviewCandidate<'a>> {
        let state = &item.state;
        let due = state.next_review_at;
        let end_of_today = end_of_day(now);
        let due_soon_until = Duration::try_hours(self.config.due_soon_window_hours)
            .and_then(|window| end_of_today.checked_add_signed(window))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let (reason, priority) = if state.is_new() {
            (ReviewReason::New, self.config.new_priority)
        } else if due < now {
            let days_overdue = days_overdue(due, now);
            let priority = self.config.overdue_base_priority.saturating_add(
                self.config
                    .overdue_priority_per_day
                    .saturating_mul(days_overdue),
            );
            (ReviewReason::Overdue { days_overdue }, priority)
        } else if due < end_of_today {
            (ReviewReason::DueToday, self.config.due_today_priority)
        } else if due < due_soon_until {
            (ReviewReason::DueSoon, self.config.due_soon_priority)
        } else {
            return None;
        };

        Some(ReviewCandidate {
            item,
            priority,
            reason,
        })
    }
}

/// Descending priority, then earliest due, then lowest ease.
pub(crate) fn compare_candidates(a: &ReviewCandidate<'_>, b: &ReviewCandidate<'_>) -> Ordering {
    b.priority
        .cmp(&a.priority)
        .then_with(|| a.item.state.next_review_at.cmp(&b.item.state.next_review_at))
        .then_with(|| {
            a.item
                .state
                .ease_factor
                .partial_cmp(&b.item.state.ease_factor)
                .unwrap_or(Ordering::Equal)
        })
}

/// Whole days overdue, rounded up; anything past due counts as at least one.
fn days_overdue(due: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
    let seconds = (now - due).num_seconds().max(1);
    let days = (seconds + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY;
    u32::try_from(days).unwrap_or(u32::MAX)
}

/// First instant of the UTC day after `now`.
pub(crate) fn end_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_time(NaiveTime::MIN).and_utc() + Duration::days(1)
}
