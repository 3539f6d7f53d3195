//! Adaptive review scheduling.
//!
//! An SM-2 style updater extended with response-time and streak modifiers.
//!
//! Quality ratings (0-5):
//! - 0: Complete blackout, no recall
//! - 1: Incorrect, but upon seeing answer, remembered
//! - 2: Incorrect, but answer seemed easy to recall
//! - 3: Correct response with serious difficulty
//! - 4: Correct response after hesitation
//! - 5: Perfect response with no hesitation
//!
//! Successful reviews step through fixed learning intervals (1 day, then
//! 6 days) and afterwards grow by the ease factor. Only that ease-driven
//! phase is shaped by response speed and long streaks.

mod preview;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::card::{ReviewOutcome, SchedulingState, PASSING_QUALITY};
use crate::config::ReviewConfig;
use crate::error::{Result, ValidationError};

pub use preview::{format_interval, ui_rating_to_quality, IntervalPreview};

/// Interval of the second successful review in a row.
const SECOND_STEP_DAYS: u32 = 6;

/// Suggested direction for the content difficulty after a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyAdjustment {
    Easier,
    Same,
    Harder,
}

/// How a response time compares to the item's history and absolute bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseSpeed {
    Fast,
    Normal,
    Slow,
}

/// Result of applying one review.
///
/// `state` is what the caller persists; the remaining fields are diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewUpdate {
    pub state: SchedulingState,
    pub was_correct: bool,
    pub difficulty_adjustment: DifficultyAdjustment,
    pub response_speed: ResponseSpeed,
}

/// Pure function object turning a prior state and a review outcome into the
/// next state.
#[derive(Debug, Clone, Default)]
pub struct ReviewUpdater {
    config: ReviewConfig,
}

impl ReviewUpdater {
    /// Create an updater with default config
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom config
    pub fn with_config(config: ReviewConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReviewConfig {
        &self.config
    }

    /// State for an item entering the system, using the configured starting ease.
    pub fn initial_state(&self, now: DateTime<Utc>) -> SchedulingState {
        SchedulingState::with_ease_factor(now, self.config.default_ease_factor)
    }

    /// Apply a review outcome to a scheduling state.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when the outcome has a quality outside 0-5 or a
    /// negative/non-finite response time, or when the prior state carries a
    /// non-finite ease factor or average. Nothing is clamped silently.
    pub fn update(&self, state: &SchedulingState, outcome: &ReviewOutcome) -> Result<ReviewUpdate> {
        outcome.validate()?;
        validate_state(state)?;

        let speed = self.classify_response(state, outcome.response_time_seconds);
        let update = self.apply(
            state,
            outcome.quality,
            outcome.response_time_seconds,
            speed,
            outcome.occurred_at,
        );

        tracing::debug!(
            quality = outcome.quality,
            was_correct = update.was_correct,
            interval = update.state.interval,
            ease_factor = update.state.ease_factor,
            correct_streak = update.state.correct_streak,
            speed = ?update.response_speed,
            "review applied"
        );

        Ok(update)
    }

    /// Classify a response time against absolute bounds and, once the item
    /// has history, against its running average.
    pub fn classify_response(&self, state: &SchedulingState, seconds: f64) -> ResponseSpeed {
        let avg = state.average_response_time_seconds;
        let has_history = state.total_reviews > 0 && avg > 0.0;

        if seconds < self.config.fast_response_seconds
            || (has_history && seconds < avg * self.config.fast_relative_ratio)
        {
            ResponseSpeed::Fast
        } else if seconds > self.config.slow_response_seconds
            || (has_history && seconds > avg * self.config.slow_relative_ratio)
        {
            ResponseSpeed::Slow
        } else {
            ResponseSpeed::Normal
        }
    }

    /// Ease after a review of the given quality.
    ///
    /// The change grows triangularly with the distance from 3: one step at
    /// distance 1, three at 2, six at 3. Any change is clamped to the
    /// configured bounds. Quality 3 returns the prior ease as is, even when a
    /// stored value lies outside those bounds.
    pub fn adjust_ease(&self, ease_factor: f64, quality: i32) -> f64 {
        let distance = f64::from((quality - PASSING_QUALITY).unsigned_abs());
        let steps = distance * (distance + 1.0) / 2.0;

        let delta = match quality.cmp(&PASSING_QUALITY) {
            std::cmp::Ordering::Greater => self.config.ease_gain_step * steps,
            std::cmp::Ordering::Less => -self.config.ease_loss_step * steps,
            std::cmp::Ordering::Equal => return ease_factor,
        };

        (ease_factor + delta).clamp(self.config.min_ease_factor, self.config.max_ease_factor)
    }

    fn apply(
        &self,
        state: &SchedulingState,
        quality: i32,
        response_time_seconds: f64,
        speed: ResponseSpeed,
        occurred_at: DateTime<Utc>,
    ) -> ReviewUpdate {
        let was_correct = quality >= PASSING_QUALITY;
        let ease_factor = self.adjust_ease(state.ease_factor, quality);

        let (repetition, correct_streak) = if was_correct {
            (
                state.repetition.saturating_add(1),
                state.correct_streak.saturating_add(1),
            )
        } else {
            (0, 0)
        };
        let streak_reached = was_correct && correct_streak >= self.config.streak_threshold;

        let interval = if !was_correct {
            1
        } else {
            match state.repetition {
                0 => 1,
                1 => SECOND_STEP_DAYS,
                _ => self.grown_interval(state.interval, ease_factor, speed, streak_reached),
            }
        };

        let difficulty_adjustment = if !was_correct {
            DifficultyAdjustment::Harder
        } else if streak_reached {
            DifficultyAdjustment::Easier
        } else {
            DifficultyAdjustment::Same
        };

        let prior_count = f64::from(state.total_reviews);
        let average_response_time_seconds = (state.average_response_time_seconds * prior_count
            + response_time_seconds)
            / (prior_count + 1.0);

        ReviewUpdate {
            state: SchedulingState {
                interval,
                repetition,
                ease_factor,
                next_review_at: occurred_at + Duration::days(i64::from(interval)),
                total_reviews: state.total_reviews.saturating_add(1),
                correct_streak,
                average_response_time_seconds,
                last_reviewed_at: Some(occurred_at),
            },
            was_correct,
            difficulty_adjustment,
            response_speed: speed,
        }
    }

    fn grown_interval(
        &self,
        prior_interval: u32,
        ease_factor: f64,
        speed: ResponseSpeed,
        streak_reached: bool,
    ) -> u32 {
        let mut days = f64::from(prior_interval.max(1)) * ease_factor;

        match speed {
            ResponseSpeed::Fast => days *= self.config.fast_response_bonus,
            ResponseSpeed::Slow => days *= self.config.slow_response_penalty,
            ResponseSpeed::Normal => {}
        }
        if streak_reached {
            days *= self.config.streak_bonus;
        }

        let max_days = f64::from(self.config.max_interval_days.max(1));
        if days.is_nan() {
            return 1;
        }
        days.round().clamp(1.0, max_days) as u32
    }
}

fn validate_state(state: &SchedulingState) -> std::result::Result<(), ValidationError> {
    if !state.ease_factor.is_finite() {
        return Err(ValidationError::NonFiniteValue {
            field: "easeFactor".to_string(),
        });
    }
    if !state.average_response_time_seconds.is_finite()
        || state.average_response_time_seconds < 0.0
    {
        return Err(ValidationError::InvalidValue {
            field: "averageResponseTime".to_string(),
            message: "must be a finite, non-negative number".to_string(),
        });
    }
    Ok(())
}
