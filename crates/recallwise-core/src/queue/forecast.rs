//! Upcoming review workload per day.

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::card::StudyItem;

/// Number of scheduled reviews falling on one UTC day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub review_count: usize,
}

/// Count reviews due on each of the next `days` UTC days, starting today.
///
/// Anything already overdue lands on today. New items have no schedule yet
/// and are not counted; neither are reviews beyond the horizon.
pub fn forecast_reviews(items: &[StudyItem], now: DateTime<Utc>, days: u32) -> Vec<DailyForecast> {
    let today = now.date_naive();
    let mut forecast: Vec<DailyForecast> = (0..days)
        .map_while(|offset| today.checked_add_days(Days::new(u64::from(offset))))
        .map(|date| DailyForecast {
            date,
            review_count: 0,
        })
        .collect();

    for item in items.iter().filter(|item| !item.state.is_new()) {
        let due_day = item.state.next_review_at.date_naive();
        let offset = (due_day - today).num_days().max(0);
        if let Some(slot) = usize::try_from(offset)
            .ok()
            .and_then(|offset| forecast.get_mut(offset))
        {
            slot.review_count += 1;
        }
    }

    forecast
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::SchedulingState;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap()
    }

    fn due_at(id: &str, due: DateTime<Utc>) -> StudyItem {
        let mut state = SchedulingState::new(now());
        state.repetition = 1;
        state.total_reviews = 1;
        state.last_reviewed_at = Some(now() - Duration::days(1));
        state.next_review_at = due;
        StudyItem::new(id, state)
    }

    #[test]
    fn buckets_reviews_by_day() {
        let items = vec![
            due_at("overdue", now() - Duration::days(5)),
            due_at("today", now() + Duration::hours(3)),
            due_at("tomorrow", now() + Duration::days(1)),
            due_at("beyond", now() + Duration::days(10)),
            StudyItem::new("new", SchedulingState::new(now())),
        ];

        let forecast = forecast_reviews(&items, now(), 3);
        let counts: Vec<usize> = forecast.iter().map(|d| d.review_count).collect();
        assert_eq!(counts, vec![2, 1, 0]);
        assert_eq!(forecast[0].date, now().date_naive());
        assert_eq!(forecast[2].date, NaiveDate::from_ymd_opt(2026, 3, 4).unwrap());
    }

    #[test]
    fn zero_day_horizon_is_empty() {
        let items = vec![due_at("today", now())];
        assert!(forecast_reviews(&items, now(), 0).is_empty());
    }
}
