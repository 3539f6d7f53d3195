//! Time-boxed study session planning.
//!
//! This module packs review candidates into a session of fixed length:
//! - Ranks candidates by urgency (overdue, due today, due soon, new)
//! - Estimates per-item time from its difficulty label
//! - Greedily admits items while the budget allows, capping new items
//! - Summarizes the composition and derives study tips

mod tips;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::card::{Difficulty, StudyItem};
use crate::config::{RankingConfig, SessionConfig};
use crate::error::{Result, ValidationError};
use crate::queue::{DueCardRanker, ReviewReason};

/// Caller preferences for a session; every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionOptions {
    /// Rank new items ahead of items merely due soon
    #[serde(default)]
    pub prefer_new_cards: bool,
    /// Cap on new items; falls back to the configured default
    #[serde(default)]
    pub max_new_cards: Option<u32>,
    /// Restrict the session to one difficulty
    #[serde(default)]
    pub focus_difficulty: Option<Difficulty>,
}

/// One admitted item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedItem {
    pub id: String,
    pub reason: ReviewReason,
    pub estimated_seconds: u32,
}

/// Count of admitted items per reason category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionBreakdown {
    pub new: usize,
    pub due: usize,
    pub overdue: usize,
}

impl SessionBreakdown {
    fn record(&mut self, reason: &ReviewReason) {
        match reason {
            ReviewReason::New => self.new += 1,
            ReviewReason::Overdue { .. } => self.overdue += 1,
            ReviewReason::DueToday | ReviewReason::DueSoon => self.due += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.new + self.due + self.overdue
    }
}

/// A planned study session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPlan {
    pub item_ids: Vec<String>,
    pub items: Vec<PlannedItem>,
    /// Never exceeds `target_minutes`
    pub estimated_minutes: f64,
    pub target_minutes: f64,
    pub session_breakdown: SessionBreakdown,
    pub study_tips: Vec<String>,
}

impl SessionPlan {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Builds time-boxed sessions from a collection snapshot.
#[derive(Debug, Clone, Default)]
pub struct SessionPlanner {
    config: SessionConfig,
    ranker: DueCardRanker,
}

impl SessionPlanner {
    /// Create a planner with default config
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom config
    pub fn with_config(config: SessionConfig, ranking: RankingConfig) -> Self {
        Self {
            config,
            ranker: DueCardRanker::with_config(ranking),
        }
    }

    /// Estimated seconds to review one item of the given difficulty.
    pub fn seconds_for(&self, difficulty: Difficulty) -> u32 {
        match difficulty {
            Difficulty::Easy => self.config.easy_seconds,
            Difficulty::Medium => self.config.medium_seconds,
            Difficulty::Hard => self.config.hard_seconds,
        }
    }

    /// Plan a session of at most `target_minutes`.
    ///
    /// An empty plan is returned when nothing needs review or nothing fits.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when `target_minutes` is negative or not finite.
    pub fn plan(
        &self,
        items: &[StudyItem],
        target_minutes: f64,
        options: &SessionOptions,
        now: DateTime<Utc>,
    ) -> Result<SessionPlan> {
        if !target_minutes.is_finite() {
            return Err(ValidationError::NonFiniteValue {
                field: "targetMinutes".to_string(),
            }
            .into());
        }
        if target_minutes < 0.0 {
            return Err(ValidationError::InvalidValue {
                field: "targetMinutes".to_string(),
                message: format!("must not be negative (got {target_minutes})"),
            }
            .into());
        }

        let max_new = options
            .max_new_cards
            .unwrap_or(self.config.default_max_new_cards);

        let mut candidates = self.ranker.select_for_review(items, usize::MAX, max_new > 0, now);
        if let Some(focus) = options.focus_difficulty {
            candidates.retain(|c| c.item.effective_difficulty() == focus);
        }
        // stable: keeps ranker order within each urgency class
        candidates.sort_by_key(|c| urgency_class(&c.reason, options.prefer_new_cards));

        let budget_seconds = (target_minutes * 60.0).floor() as u64;
        let mut used_seconds: u64 = 0;
        let mut new_admitted: u32 = 0;
        let mut hard_admitted: usize = 0;
        let mut capped_new: usize = 0;
        let mut planned = Vec::new();
        let mut breakdown = SessionBreakdown::default();

        for candidate in &candidates {
            if candidate.reason.is_new() && new_admitted >= max_new {
                tracing::trace!(item_id = %candidate.item.id, "new item cap reached");
                capped_new += 1;
                continue;
            }

            let difficulty = candidate.item.effective_difficulty();
            let seconds = self.seconds_for(difficulty);
            if used_seconds + u64::from(seconds) > budget_seconds {
                tracing::trace!(item_id = %candidate.item.id, seconds, "item does not fit");
                continue;
            }

            used_seconds += u64::from(seconds);
            if candidate.reason.is_new() {
                new_admitted += 1;
            }
            if difficulty == Difficulty::Hard {
                hard_admitted += 1;
            }
            breakdown.record(&candidate.reason);
            planned.push(PlannedItem {
                id: candidate.item.id.clone(),
                reason: candidate.reason,
                estimated_seconds: seconds,
            });
        }

        let estimated_minutes = (used_seconds as f64 / 60.0).min(target_minutes);
        let study_tips = tips::study_tips(&tips::Composition {
            breakdown,
            candidate_count: candidates.len(),
            capped_new,
            hard_count: hard_admitted,
            estimated_minutes,
            target_minutes,
        });

        tracing::debug!(
            candidates = candidates.len(),
            planned = planned.len(),
            estimated_minutes,
            target_minutes,
            "study session planned"
        );

        Ok(SessionPlan {
            item_ids: planned.iter().map(|p| p.id.clone()).collect(),
            items: planned,
            estimated_minutes,
            target_minutes,
            session_breakdown: breakdown,
            study_tips,
        })
    }
}

/// Lower is more urgent.
fn urgency_class(reason: &ReviewReason, prefer_new: bool) -> u8 {
    match (reason, prefer_new) {
        (ReviewReason::Overdue { .. }, _) => 0,
        (ReviewReason::DueToday, _) => 1,
        (ReviewReason::New, true) => 2,
        (ReviewReason::DueSoon, true) => 3,
        (ReviewReason::DueSoon, false) => 2,
        (ReviewReason::New, false) => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::SchedulingState;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap()
    }

    fn due(id: &str, offset: Duration, difficulty: Difficulty) -> StudyItem {
        let mut state = SchedulingState::new(now() - Duration::days(20));
        state.repetition = 2;
        state.interval = 6;
        state.total_reviews = 2;
        state.correct_streak = 2;
        state.next_review_at = now() + offset;
        state.last_reviewed_at = Some(now() + offset - Duration::days(6));
        StudyItem::new(id, state).with_difficulty(difficulty)
    }

    fn new_item(id: &str, difficulty: Difficulty) -> StudyItem {
        StudyItem::new(id, SchedulingState::new(now() - Duration::days(1))).with_difficulty(difficulty)
    }

    #[test]
    fn orders_by_urgency_class() {
        let planner = SessionPlanner::new();
        let items = vec![
            new_item("new", Difficulty::Easy),
            due("soon", Duration::hours(18), Difficulty::Easy),
            due("today", Duration::hours(2), Difficulty::Easy),
            due("overdue", -Duration::days(1), Difficulty::Easy),
        ];

        let plan = planner.plan(&items, 10.0, &SessionOptions::default(), now()).unwrap();
        assert_eq!(plan.item_ids, vec!["overdue", "today", "soon", "new"]);
        assert_eq!(plan.session_breakdown, SessionBreakdown { new: 1, due: 2, overdue: 1 });
        assert!((plan.estimated_minutes - 1.0).abs() < 1e-9);
    }

    #[test]
    fn prefer_new_moves_new_ahead_of_due_soon_only() {
        let planner = SessionPlanner::new();
        let items = vec![
            due("soon", Duration::hours(18), Difficulty::Easy),
            new_item("new", Difficulty::Easy),
            due("overdue", -Duration::days(1), Difficulty::Easy),
        ];
        let options = SessionOptions {
            prefer_new_cards: true,
            ..Default::default()
        };

        let plan = planner.plan(&items, 10.0, &options, now()).unwrap();
        assert_eq!(plan.item_ids, vec!["overdue", "new", "soon"]);
    }

    #[test]
    fn caps_new_items_even_when_preferred() {
        let planner = SessionPlanner::new();
        let items: Vec<StudyItem> = (0..6)
            .map(|i| new_item(&format!("n{i}"), Difficulty::Easy))
            .collect();
        let options = SessionOptions {
            prefer_new_cards: true,
            max_new_cards: Some(2),
            focus_difficulty: None,
        };

        let plan = planner.plan(&items, 30.0, &options, now()).unwrap();
        assert_eq!(plan.session_breakdown.new, 2);
        assert_eq!(plan.items.len(), 2);
        assert!(plan
            .study_tips
            .iter()
            .any(|t| t.starts_with("4 new cards held back")));
        assert!(!plan.study_tips.iter().any(|t| t.contains("still waiting")));
    }

    #[test]
    fn zero_new_cap_excludes_new_items() {
        let planner = SessionPlanner::new();
        let items = vec![new_item("n", Difficulty::Easy), due("d", -Duration::hours(3), Difficulty::Easy)];
        let options = SessionOptions {
            max_new_cards: Some(0),
            ..Default::default()
        };

        let plan = planner.plan(&items, 30.0, &options, now()).unwrap();
        assert_eq!(plan.item_ids, vec!["d"]);
    }

    #[test]
    fn respects_budget_and_skips_items_that_do_not_fit() {
        let planner = SessionPlanner::new();
        let items = vec![
            due("hard-overdue", -Duration::days(2), Difficulty::Hard),
            due("easy-today", Duration::hours(1), Difficulty::Easy),
        ];

        // 30 seconds: the 40s hard item is skipped, the 15s easy one fits
        let plan = planner.plan(&items, 0.5, &SessionOptions::default(), now()).unwrap();
        assert_eq!(plan.item_ids, vec!["easy-today"]);
        assert!(plan.estimated_minutes <= 0.5);
    }

    #[test]
    fn tiny_budget_returns_empty_plan() {
        let planner = SessionPlanner::new();
        let items = vec![due("hard", -Duration::days(1), Difficulty::Hard)];

        let plan = planner.plan(&items, 0.1, &SessionOptions::default(), now()).unwrap();
        assert!(plan.is_empty());
        assert_eq!(plan.estimated_minutes, 0.0);
        assert!(!plan.study_tips.is_empty());
    }

    #[test]
    fn focus_difficulty_filters_candidates() {
        let planner = SessionPlanner::new();
        let items = vec![
            due("easy", -Duration::days(1), Difficulty::Easy),
            due("hard", -Duration::days(1), Difficulty::Hard),
            StudyItem::new("unlabeled", due("x", -Duration::days(1), Difficulty::Easy).state),
        ];
        let options = SessionOptions {
            focus_difficulty: Some(Difficulty::Medium),
            ..Default::default()
        };

        let plan = planner.plan(&items, 10.0, &options, now()).unwrap();
        assert_eq!(plan.item_ids, vec!["unlabeled"]);
    }

    #[test]
    fn overdue_items_produce_attention_tip() {
        let planner = SessionPlanner::new();
        let items = vec![due("late", -Duration::days(3), Difficulty::Medium)];

        let plan = planner.plan(&items, 5.0, &SessionOptions::default(), now()).unwrap();
        assert!(plan
            .study_tips
            .iter()
            .any(|tip| tip.contains("overdue") && tip.contains("attention")));
    }

    #[test]
    fn empty_collection_yields_well_formed_plan() {
        let planner = SessionPlanner::new();
        let plan = planner.plan(&[], 20.0, &SessionOptions::default(), now()).unwrap();
        assert!(plan.is_empty());
        assert_eq!(plan.session_breakdown.total(), 0);
        assert_eq!(plan.target_minutes, 20.0);
    }

    #[test]
    fn rejects_negative_or_non_finite_budget() {
        let planner = SessionPlanner::new();
        assert!(planner.plan(&[], -1.0, &SessionOptions::default(), now()).is_err());
        assert!(planner.plan(&[], f64::NAN, &SessionOptions::default(), now()).is_err());
        assert!(planner.plan(&[], f64::INFINITY, &SessionOptions::default(), now()).is_err());
    }
}
