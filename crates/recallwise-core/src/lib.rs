//! # Recallwise Core Library
//!
//! This library provides the scheduling core of Recallwise, an adaptive
//! spaced-repetition system. It decides when each learning item is next due,
//! ranks what needs review, packs items into time-boxed study sessions and
//! reports learner progress.
//!
//! ## Architecture
//!
//! Every component is a synchronous, side-effect-free function over caller
//! supplied snapshots. The engine holds no collection state, performs no I/O
//! and never reads the system clock: "now" is always a parameter. Callers own
//! persistence and serialize read-modify-write cycles per item.
//!
//! ## Key Components
//!
//! - [`ReviewUpdater`]: prior state + review outcome -> next state
//! - [`DueCardRanker`]: selects and orders items needing review
//! - [`SessionPlanner`]: greedy time-budget packing into a [`SessionPlan`]
//! - [`ProgressAnalyzer`]: learner and category statistics
//! - [`EngineConfig`]: TOML-tunable constants for all of the above

pub mod card;
pub mod config;
pub mod error;
pub mod queue;
pub mod review;
pub mod session;
pub mod stats;

pub use card::{parse_timestamp, Difficulty, ReviewOutcome, SchedulingState, StudyItem};
pub use config::{EngineConfig, ProgressConfig, RankingConfig, ReviewConfig, SessionConfig};
pub use error::{ConfigError, CoreError, Result, ValidationError};
pub use queue::{forecast_reviews, DailyForecast, DueCardRanker, ReviewCandidate, ReviewReason};
pub use review::{
    format_interval, ui_rating_to_quality, DifficultyAdjustment, IntervalPreview, ResponseSpeed,
    ReviewUpdate, ReviewUpdater,
};
pub use session::{PlannedItem, SessionBreakdown, SessionOptions, SessionPlan, SessionPlanner};
pub use stats::{
    next_milestone, CategoryProgress, ItemStanding, Milestone, ProgressAnalyzer, ProgressReport,
    Timeframe,
};

/// All four components built from one configuration.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    pub updater: ReviewUpdater,
    pub ranker: DueCardRanker,
    pub planner: SessionPlanner,
    pub analyzer: ProgressAnalyzer,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build every component from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration is inconsistent.
    pub fn from_config(config: &EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            updater: ReviewUpdater::with_config(config.review.clone()),
            ranker: DueCardRanker::with_config(config.ranking.clone()),
            planner: SessionPlanner::with_config(config.session.clone(), config.ranking.clone()),
            analyzer: ProgressAnalyzer::with_config(config.progress.clone()),
        })
    }
}
