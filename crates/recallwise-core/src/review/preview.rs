//! Interval previews for answer buttons.
//!
//! Lets a presentation layer show what each button would schedule before
//! the learner picks one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ResponseSpeed, ReviewUpdater};
use crate::card::SchedulingState;
use crate::error::{Result, ValidationError};

/// Intervals (days) each of the four answer buttons would produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalPreview {
    pub again: u32,
    pub hard: u32,
    pub good: u32,
    pub easy: u32,
}

impl ReviewUpdater {
    /// Preview the interval for each answer button at `now`, assuming a
    /// response of ordinary speed.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the state carries non-finite numbers.
    pub fn preview_intervals(
        &self,
        state: &SchedulingState,
        now: DateTime<Utc>,
    ) -> Result<IntervalPreview> {
        super::validate_state(state)?;

        let typical = state.average_response_time_seconds;
        let interval_for = |rating: i32| -> Result<u32> {
            let quality = ui_rating_to_quality(rating)?;
            Ok(self
                .apply(state, quality, typical, ResponseSpeed::Normal, now)
                .state
                .interval)
        };

        Ok(IntervalPreview {
            again: interval_for(1)?,
            hard: interval_for(2)?,
            good: interval_for(3)?,
            easy: interval_for(4)?,
        })
    }
}

/// Map a button rating (1-4: Again, Hard, Good, Easy) to a quality (0-5).
///
/// # Errors
///
/// Returns [`ValidationError::InvalidValue`] for ratings outside 1-4.
pub fn ui_rating_to_quality(rating: i32) -> Result<i32, ValidationError> {
    match rating {
        1 => Ok(1),
        2 => Ok(3),
        3 => Ok(4),
        4 => Ok(5),
        other => Err(ValidationError::InvalidValue {
            field: "rating".to_string(),
            message: format!("expected 1-4, got {other}"),
        }),
    }
}

/// Format an interval in days to a human-readable string
pub fn format_interval(days: u32) -> String {
    match days {
        0 => "now".to_string(),
        1..=6 => format!("{days}d"),
        7..=29 => format!("{}w", days / 7),
        30..=364 => format!("{}mo", days / 30),
        _ => format!("{}y", days / 365),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
    }

    #[test]
    fn preview_for_new_card() {
        let updater = ReviewUpdater::new();
        let state = SchedulingState::new(now());
        let preview = updater.preview_intervals(&state, now()).unwrap();

        assert_eq!(
            preview,
            IntervalPreview {
                again: 1,
                hard: 1,
                good: 1,
                easy: 1
            }
        );
    }

    #[test]
    fn preview_for_mature_card_orders_buttons() {
        let updater = ReviewUpdater::new();
        let mut state = SchedulingState::new(now());
        state.repetition = 4;
        state.correct_streak = 1;
        state.interval = 20;
        state.ease_factor = 2.5;
        state.total_reviews = 4;
        state.average_response_time_seconds = 12.0;

        let preview = updater.preview_intervals(&state, now()).unwrap();
        assert_eq!(preview.again, 1);
        assert_eq!(preview.hard, 50);
        assert!(preview.hard < preview.good);
        assert!(preview.good < preview.easy);
    }

    #[test]
    fn preview_does_not_alter_state() {
        let updater = ReviewUpdater::new();
        let state = SchedulingState::new(now());
        let before = state.clone();
        updater.preview_intervals(&state, now()).unwrap();
        assert_eq!(state, before);
    }

    #[test]
    fn rating_mapping() {
        assert_eq!(ui_rating_to_quality(1), Ok(1));
        assert_eq!(ui_rating_to_quality(2), Ok(3));
        assert_eq!(ui_rating_to_quality(3), Ok(4));
        assert_eq!(ui_rating_to_quality(4), Ok(5));
        assert!(ui_rating_to_quality(0).is_err());
        assert!(ui_rating_to_quality(5).is_err());
    }

    #[test]
    fn test_format_interval() {
        assert_eq!(format_interval(0), "now");
        assert_eq!(format_interval(1), "1d");
        assert_eq!(format_interval(5), "5d");
        assert_eq!(format_interval(7), "1w");
        assert_eq!(format_interval(14), "2w");
        assert_eq!(format_interval(30), "1mo");
        assert_eq!(format_interval(90), "3mo");
        assert_eq!(format_interval(365), "1y");
        assert_eq!(format_interval(730), "2y");
    }
}
