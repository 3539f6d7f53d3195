//! Longitudinal progress reports.
//!
//! Classifies every item as mastered, struggling, learning or new and rolls
//! the result up per learner and per category.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::milestone::{next_milestone, Milestone};
use crate::card::{SchedulingState, StudyItem};
use crate::config::ProgressConfig;
use crate::error::ValidationError;

/// Category key for items without a category label.
pub const UNCATEGORIZED: &str = "uncategorized";

/// Window of items a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    /// Items reviewed within the configured week window
    Week,
    /// Every item, reviewed or not
    All,
}

impl FromStr for Timeframe {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "week" => Ok(Timeframe::Week),
            "all" => Ok(Timeframe::All),
            other => Err(ValidationError::InvalidValue {
                field: "timeframe".to_string(),
                message: format!("expected 'week' or 'all', got '{other}'"),
            }),
        }
    }
}

/// Where a single item stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStanding {
    Mastered,
    Struggling,
    Learning,
    New,
}

/// Per-category counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryProgress {
    pub total: usize,
    pub mastered: usize,
    pub struggling: usize,
}

/// Aggregated learner statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressReport {
    pub timeframe: Timeframe,
    pub total_cards: usize,
    pub reviewed_cards: usize,
    pub mastered_cards: usize,
    pub struggling_cards: usize,
    /// Mean over reviewed items only; 0 when nothing was reviewed
    pub average_ease_factor: f64,
    pub total_reviews: u64,
    pub average_response_time_seconds: f64,
    /// Mastered share of all covered items (0.0-1.0)
    pub mastery_rate: f64,
    pub categories: BTreeMap<String, CategoryProgress>,
    pub next_milestone: Milestone,
    pub recommendations: Vec<String>,
}

/// Analyzer producing [`ProgressReport`]s from collection snapshots.
#[derive(Debug, Clone, Default)]
pub struct ProgressAnalyzer {
    config: ProgressConfig,
}

impl ProgressAnalyzer {
    /// Create an analyzer with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create analyzer with custom settings.
    pub fn with_config(config: ProgressConfig) -> Self {
        Self { config }
    }

    /// Classify one item's scheduling state.
    pub fn standing(&self, state: &SchedulingState) -> ItemStanding {
        let cfg = &self.config;
        if state.repetition >= cfg.mastery_repetitions
            && state.correct_streak >= cfg.mastery_streak
            && state.ease_factor >= cfg.mastery_ease_factor
        {
            ItemStanding::Mastered
        } else if state.ease_factor < cfg.struggling_ease_factor
            || (state.correct_streak == 0 && state.repetition > 0)
        {
            ItemStanding::Struggling
        } else if state.has_been_reviewed() {
            ItemStanding::Learning
        } else {
            ItemStanding::New
        }
    }

    /// Build a report over `items` as of `now`.
    ///
    /// `Timeframe::Week` keeps only items last reviewed within the week
    /// window; `Timeframe::All` keeps everything. Never fails: an empty
    /// collection yields zero counts and an empty category map.
    pub fn analyze(&self, items: &[StudyItem], timeframe: Timeframe, now: DateTime<Utc>) -> ProgressReport {
        let cutoff = Duration::try_days(self.config.week_window_days)
            .and_then(|window| now.checked_sub_signed(window))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let in_window = |item: &&StudyItem| match timeframe {
            Timeframe::All => true,
            Timeframe::Week => item
                .state
                .last_reviewed_at
                .is_some_and(|reviewed| reviewed >= cutoff),
        };

        let mut total_cards = 0usize;
        let mut reviewed_cards = 0usize;
        let mut mastered_cards = 0usize;
        let mut struggling_cards = 0usize;
        let mut ease_sum = 0.0f64;
        let mut response_sum = 0.0f64;
        let mut total_reviews = 0u64;
        let mut categories: BTreeMap<String, CategoryProgress> = BTreeMap::new();

        for item in items.iter().filter(in_window) {
            let state = &item.state;
            let standing = self.standing(state);
            total_cards += 1;

            if state.has_been_reviewed() {
                reviewed_cards += 1;
                ease_sum += state.ease_factor;
                response_sum += state.average_response_time_seconds;
            }
            total_reviews += u64::from(state.total_reviews);

            let key = item.category.as_deref().unwrap_or(UNCATEGORIZED).to_string();
            let category = categories.entry(key).or_default();
            category.total += 1;

            match standing {
                ItemStanding::Mastered => {
                    mastered_cards += 1;
                    category.mastered += 1;
                }
                ItemStanding::Struggling => {
                    struggling_cards += 1;
                    category.struggling += 1;
                }
                ItemStanding::Learning | ItemStanding::New => {}
            }
        }

        let mean = |sum: f64| {
            if reviewed_cards == 0 {
                0.0
            } else {
                sum / reviewed_cards as f64
            }
        };
        let mastery_rate = if total_cards == 0 {
            0.0
        } else {
            mastered_cards as f64 / total_cards as f64
        };

        let milestone = next_milestone(
            u32::try_from(mastered_cards).unwrap_or(u32::MAX),
            &self.config.milestone_ladder,
            self.config.milestone_step,
        );

        let mut report = ProgressReport {
            timeframe,
            total_cards,
            reviewed_cards,
            mastered_cards,
            struggling_cards,
            average_ease_factor: mean(ease_sum),
            total_reviews,
            average_response_time_seconds: mean(response_sum),
            mastery_rate,
            categories,
            next_milestone: milestone,
            recommendations: Vec::new(),
        };
        report.recommendations = self.recommendations(&report);

        tracing::debug!(
            ?timeframe,
            total_cards,
            mastered_cards,
            struggling_cards,
            "progress report built"
        );

        report
    }

    fn recommendations(&self, report: &ProgressReport) -> Vec<String> {
        let mut recs = Vec::new();

        if report.total_cards == 0 {
            recs.push(match report.timeframe {
                Timeframe::Week => {
                    "No cards reviewed this week. A short session today restarts your momentum."
                        .to_string()
                }
                Timeframe::All => "Add some cards to start building your collection.".to_string(),
            });
            return recs;
        }

        if report.reviewed_cards == 0 {
            recs.push(format!(
                "None of your {} cards has been reviewed yet; start a session to begin.",
                report.total_cards
            ));
        }

        if report.struggling_cards > 0 {
            recs.push(format!(
                "{} challenging card(s) need extra attention; review them before adding new material.",
                report.struggling_cards
            ));
        }

        if report.categories.len() > 1 {
            let weakest = report
                .categories
                .iter()
                .filter(|(_, c)| c.struggling > 0)
                .fold(None::<(&String, &CategoryProgress)>, |best, (name, c)| match best {
                    Some((_, b)) if share(b.struggling, b.total) >= share(c.struggling, c.total) => best,
                    _ => Some((name, c)),
                });
            if let Some((name, c)) = weakest {
                recs.push(format!(
                    "Focus on '{name}', where {} of {} cards are struggling.",
                    c.struggling, c.total
                ));
            }
        }

        if report.reviewed_cards > 0
            && report.average_ease_factor < self.config.struggling_ease_factor + 0.2
        {
            recs.push(
                "Your average ease is low; try splitting hard cards into smaller facts.".to_string(),
            );
        }

        if report.total_cards >= 5 && report.mastery_rate >= 0.8 {
            recs.push(
                "Most of your cards are mastered; this is a good time to add new material."
                    .to_string(),
            );
        }

        let milestone = &report.next_milestone;
        let remaining = milestone.target.saturating_sub(milestone.current);
        if milestone.current > 0 && remaining <= 3 {
            recs.push(format!(
                "Only {remaining} more mastered card(s) to reach {}.",
                milestone.target
            ));
        }

        recs
    }
}

fn share(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}
