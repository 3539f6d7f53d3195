//! Learning progress analytics.
//!
//! This module aggregates per-item scheduling state into learner-level and
//! category-level statistics, milestone tracking and recommendations.

mod milestone;
mod progress;

pub use milestone::{next_milestone, Milestone};
pub use progress::{
    CategoryProgress, ItemStanding, ProgressAnalyzer, ProgressReport, Timeframe,
};
