//! TOML-based engine configuration.
//!
//! Every numeric constant the scheduler, ranker, planner and analyzer use
//! lives here so hosts can tune them without recompiling:
//! - Ease-factor bounds and step sizes
//! - Response-time and streak modifiers
//! - Ranking priorities per review reason
//! - Per-difficulty time estimates for session planning
//! - Mastery/struggling thresholds and the milestone ladder
//!
//! The engine never reads files itself. Hosts load the TOML text and hand it
//! to [`EngineConfig::from_toml_str`].

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Upper bound for every day-based window and interval.
const MAX_WINDOW_DAYS: i64 = 36_500;

/// ReviewUpdater tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewConfig {
    #[serde(default = "default_ease_factor")]
    pub default_ease_factor: f64,
    #[serde(default = "default_min_ease_factor")]
    pub min_ease_factor: f64,
    #[serde(default = "default_max_ease_factor")]
    pub max_ease_factor: f64,
    /// Ease gained per quality point above 3 (grows triangularly with distance)
    #[serde(default = "default_ease_gain_step")]
    pub ease_gain_step: f64,
    /// Ease lost per quality point below 3 (grows triangularly with distance)
    #[serde(default = "default_ease_loss_step")]
    pub ease_loss_step: f64,
    #[serde(default = "default_fast_response_seconds")]
    pub fast_response_seconds: f64,
    #[serde(default = "default_slow_response_seconds")]
    pub slow_response_seconds: f64,
    /// Response faster than this fraction of the running average counts as fast
    #[serde(default = "default_fast_relative_ratio")]
    pub fast_relative_ratio: f64,
    /// Response slower than this multiple of the running average counts as slow
    #[serde(default = "default_slow_relative_ratio")]
    pub slow_relative_ratio: f64,
    #[serde(default = "default_fast_response_bonus")]
    pub fast_response_bonus: f64,
    #[serde(default = "default_slow_response_penalty")]
    pub slow_response_penalty: f64,
    #[serde(default = "default_streak_threshold")]
    pub streak_threshold: u32,
    #[serde(default = "default_streak_bonus")]
    pub streak_bonus: f64,
    #[serde(default = "default_max_interval_days")]
    pub max_interval_days: u32,
}

/// DueCardRanker tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    #[serde(default = "default_new_priority")]
    pub new_priority: u32,
    /// Floor of the overdue band; the first overdue day lands one step above it
    #[serde(default = "default_overdue_base_priority")]
    pub overdue_base_priority: u32,
    #[serde(default = "default_overdue_priority_per_day")]
    pub overdue_priority_per_day: u32,
    #[serde(default = "default_due_today_priority")]
    pub due_today_priority: u32,
    #[serde(default = "default_due_soon_priority")]
    pub due_soon_priority: u32,
    #[serde(default = "default_due_soon_window_hours")]
    pub due_soon_window_hours: i64,
}

/// SessionPlanner tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_easy_seconds")]
    pub easy_seconds: u32,
    #[serde(default = "default_medium_seconds")]
    pub medium_seconds: u32,
    #[serde(default = "default_hard_seconds")]
    pub hard_seconds: u32,
    #[serde(default = "default_max_new_cards")]
    pub default_max_new_cards: u32,
}

/// ProgressAnalyzer tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressConfig {
    #[serde(default = "default_mastery_repetitions")]
    pub mastery_repetitions: u32,
    #[serde(default = "default_mastery_streak")]
    pub mastery_streak: u32,
    #[serde(default = "default_mastery_ease_factor")]
    pub mastery_ease_factor: f64,
    #[serde(default = "default_struggling_ease_factor")]
    pub struggling_ease_factor: f64,
    #[serde(default = "default_week_window_days")]
    pub week_window_days: i64,
    /// Fixed milestone targets; past the last one targets advance by `milestone_step`
    #[serde(default = "default_milestone_ladder")]
    pub milestone_ladder: Vec<u32>,
    #[serde(default = "default_milestone_step")]
    pub milestone_step: u32,
}

/// Engine configuration.
///
/// Serialized to/from TOML with one table per component.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub review: ReviewConfig,
    #[serde(default)]
    pub ranking: RankingConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub progress: ProgressConfig,
}

// Default functions
fn default_ease_factor() -> f64 {
    2.5
}
fn default_min_ease_factor() -> f64 {
    1.3
}
fn default_max_ease_factor() -> f64 {
    3.0
}
fn default_ease_gain_step() -> f64 {
    0.03
}
fn default_ease_loss_step() -> f64 {
    0.10
}
fn default_fast_response_seconds() -> f64 {
    5.0
}
fn default_slow_response_seconds() -> f64 {
    60.0
}
fn default_fast_relative_ratio() -> f64 {
    0.5
}
fn default_slow_relative_ratio() -> f64 {
    2.0
}
fn default_fast_response_bonus() -> f64 {
    1.2
}
fn default_slow_response_penalty() -> f64 {
    0.7
}
fn default_streak_threshold() -> u32 {
    5
}
fn default_streak_bonus() -> f64 {
    1.15
}
fn default_max_interval_days() -> u32 {
    36_500
}
fn default_new_priority() -> u32 {
    100
}
fn default_overdue_base_priority() -> u32 {
    50
}
fn default_overdue_priority_per_day() -> u32 {
    10
}
fn default_due_today_priority() -> u32 {
    30
}
fn default_due_soon_priority() -> u32 {
    10
}
fn default_due_soon_window_hours() -> i64 {
    24
}
fn default_easy_seconds() -> u32 {
    15
}
fn default_medium_seconds() -> u32 {
    25
}
fn default_hard_seconds() -> u32 {
    40
}
fn default_max_new_cards() -> u32 {
    10
}
fn default_mastery_repetitions() -> u32 {
    5
}
fn default_mastery_streak() -> u32 {
    5
}
fn default_mastery_ease_factor() -> f64 {
    2.5
}
fn default_struggling_ease_factor() -> f64 {
    2.0
}
fn default_week_window_days() -> i64 {
    7
}
fn default_milestone_ladder() -> Vec<u32> {
    vec![1, 10, 25, 50, 100, 250, 500, 1000]
}
fn default_milestone_step() -> u32 {
    1000
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            default_ease_factor: default_ease_factor(),
            min_ease_factor: default_min_ease_factor(),
            max_ease_factor: default_max_ease_factor(),
            ease_gain_step: default_ease_gain_step(),
            ease_loss_step: default_ease_loss_step(),
            fast_response_seconds: default_fast_response_seconds(),
            slow_response_seconds: default_slow_response_seconds(),
            fast_relative_ratio: default_fast_relative_ratio(),
            slow_relative_ratio: default_slow_relative_ratio(),
            fast_response_bonus: default_fast_response_bonus(),
            slow_response_penalty: default_slow_response_penalty(),
            streak_threshold: default_streak_threshold(),
            streak_bonus: default_streak_bonus(),
            max_interval_days: default_max_interval_days(),
        }
    }
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            new_priority: default_new_priority(),
            overdue_base_priority: default_overdue_base_priority(),
            overdue_priority_per_day: default_overdue_priority_per_day(),
            due_today_priority: default_due_today_priority(),
            due_soon_priority: default_due_soon_priority(),
            due_soon_window_hours: default_due_soon_window_hours(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            easy_seconds: default_easy_seconds(),
            medium_seconds: default_medium_seconds(),
            hard_seconds: default_hard_seconds(),
            default_max_new_cards: default_max_new_cards(),
        }
    }
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            mastery_repetitions: default_mastery_repetitions(),
            mastery_streak: default_mastery_streak(),
            mastery_ease_factor: default_mastery_ease_factor(),
            struggling_ease_factor: default_struggling_ease_factor(),
            week_window_days: default_week_window_days(),
            milestone_ladder: default_milestone_ladder(),
            milestone_step: default_milestone_step(),
        }
    }
}

impl EngineConfig {
    /// Split `section.field`; deeper or shallower paths are not keys.
    fn split_key(key: &str) -> Option<(&str, &str)> {
        let (section, field) = key.split_once('.')?;
        if section.is_empty() || field.is_empty() || field.contains('.') {
            return None;
        }
        Some((section, field))
    }

    fn parse_field_value(
        existing: &serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<serde_json::Value, ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        match existing {
            serde_json::Value::Number(current) if current.is_f64() => {
                let n: f64 = value
                    .trim()
                    .parse()
                    .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?;
                serde_json::Number::from_f64(n)
                    .map(serde_json::Value::Number)
                    .ok_or_else(|| invalid("must be a finite number".to_string()))
            }
            serde_json::Value::Number(_) => value
                .trim()
                .parse::<i64>()
                .map(|n| serde_json::Value::Number(n.into()))
                .map_err(|_| invalid(format!("cannot parse '{value}' as integer"))),
            // milestone_ladder is the only list-valued field
            serde_json::Value::Array(_) => {
                let rungs: Vec<u32> =
                    serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?;
                Ok(serde_json::Value::from(rungs))
            }
            _ => Err(ConfigError::UnknownKey(key.to_string())),
        }
    }

    /// Parse a configuration from TOML text; missing keys take defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML, has wrongly typed
    /// values, or fails [`EngineConfig::validate`].
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let cfg: EngineConfig = toml::from_str(content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Render the configuration as pretty TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Get a config value as string by `section.field` key.
    pub fn get(&self, key: &str) -> Option<String> {
        let (section, field) = Self::split_key(key)?;
        let json = serde_json::to_value(self).ok()?;
        json.get(section)?.get(field).map(|value| value.to_string())
    }

    /// Set a config value by dot-separated key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed
    /// as the existing type, or the result fails validation. On error the
    /// config is left unchanged.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let (section, field) = Self::split_key(key).ok_or_else(unknown)?;

        let mut json = serde_json::to_value(&*self)
            .map_err(|e| ConfigError::SerializeFailed(e.to_string()))?;
        let fields = json
            .get_mut(section)
            .and_then(serde_json::Value::as_object_mut)
            .ok_or_else(unknown)?;
        let existing = fields.get(field).ok_or_else(unknown)?;
        let parsed = Self::parse_field_value(existing, key, value)?;
        fields.insert(field.to_string(), parsed);

        let updated: EngineConfig =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Check cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let review = &self.review;
        let fail = |key: &str, message: &str| {
            Err(ConfigError::InvalidValue {
                key: key.to_string(),
                message: message.to_string(),
            })
        };

        let finite_fields = [
            ("review.default_ease_factor", review.default_ease_factor),
            ("review.min_ease_factor", review.min_ease_factor),
            ("review.max_ease_factor", review.max_ease_factor),
            ("review.ease_gain_step", review.ease_gain_step),
            ("review.ease_loss_step", review.ease_loss_step),
            ("review.fast_response_seconds", review.fast_response_seconds),
            ("review.slow_response_seconds", review.slow_response_seconds),
            ("review.fast_relative_ratio", review.fast_relative_ratio),
            ("review.slow_relative_ratio", review.slow_relative_ratio),
            ("review.fast_response_bonus", review.fast_response_bonus),
            ("review.slow_response_penalty", review.slow_response_penalty),
            ("review.streak_bonus", review.streak_bonus),
            ("progress.mastery_ease_factor", self.progress.mastery_ease_factor),
            ("progress.struggling_ease_factor", self.progress.struggling_ease_factor),
        ];
        for (key, value) in finite_fields {
            if !value.is_finite() {
                return fail(key, "must be a finite number");
            }
        }

        if review.min_ease_factor <= 0.0 {
            return fail("review.min_ease_factor", "must be positive");
        }
        if review.min_ease_factor > review.default_ease_factor
            || review.default_ease_factor > review.max_ease_factor
        {
            return fail(
                "review.default_ease_factor",
                "must lie between min_ease_factor and max_ease_factor",
            );
        }
        if review.ease_gain_step < 0.0 || review.ease_loss_step < 0.0 {
            return fail("review.ease_gain_step", "ease steps must not be negative");
        }
        if review.fast_response_seconds >= review.slow_response_seconds {
            return fail(
                "review.fast_response_seconds",
                "must be below slow_response_seconds",
            );
        }
        if review.fast_relative_ratio >= review.slow_relative_ratio {
            return fail(
                "review.fast_relative_ratio",
                "must be below slow_relative_ratio",
            );
        }
        if review.fast_response_bonus <= 0.0
            || review.slow_response_penalty <= 0.0
            || review.streak_bonus <= 0.0
        {
            return fail("review.fast_response_bonus", "multipliers must be positive");
        }
        if review.max_interval_days == 0 || i64::from(review.max_interval_days) > MAX_WINDOW_DAYS {
            return fail(
                "review.max_interval_days",
                "must be between 1 and 36500 days",
            );
        }

        let due_soon_hours = self.ranking.due_soon_window_hours;
        if !(0..=MAX_WINDOW_DAYS * 24).contains(&due_soon_hours) {
            return fail(
                "ranking.due_soon_window_hours",
                "must be between 0 and 876000 hours",
            );
        }

        let session = &self.session;
        if session.easy_seconds == 0 || session.medium_seconds == 0 || session.hard_seconds == 0 {
            return fail("session.easy_seconds", "per-item durations must be positive");
        }

        let progress = &self.progress;
        if !(1..=MAX_WINDOW_DAYS).contains(&progress.week_window_days) {
            return fail("progress.week_window_days", "must be between 1 and 36500 days");
        }
        if progress.milestone_ladder.is_empty() {
            return fail("progress.milestone_ladder", "must not be empty");
        }
        if progress.milestone_ladder.windows(2).any(|w| w[0] >= w[1]) {
            return fail("progress.milestone_ladder", "must be strictly increasing");
        }
        if progress.milestone_step == 0 {
            return fail("progress.milestone_step", "must be at least 1");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = EngineConfig::default();
        let toml_str = cfg.to_toml_string().unwrap();
        let parsed = EngineConfig::from_toml_str(&toml_str).unwrap();
        assert_eq!(parsed.review.min_ease_factor, 1.3);
        assert_eq!(parsed.progress.milestone_ladder, vec![1, 10, 25, 50, 100, 250, 500, 1000]);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg = EngineConfig::from_toml_str(
            r#"
            [review]
            streak_threshold = 3

            [session]
            hard_seconds = 60
            "#,
        )
        .unwrap();
        assert_eq!(cfg.review.streak_threshold, 3);
        assert_eq!(cfg.review.default_ease_factor, 2.5);
        assert_eq!(cfg.session.hard_seconds, 60);
        assert_eq!(cfg.session.easy_seconds, 15);
        assert_eq!(cfg.ranking.new_priority, 100);
    }

    #[test]
    fn malformed_toml_is_rejected() {
        let result = EngineConfig::from_toml_str("[review\nstreak_threshold = 3");
        assert!(matches!(result, Err(ConfigError::ParseFailed(_))));
    }

    #[test]
    fn inconsistent_ease_bounds_are_rejected() {
        let result = EngineConfig::from_toml_str(
            r#"
            [review]
            min_ease_factor = 2.8
            "#,
        );
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.get("review.streak_threshold").as_deref(), Some("5"));
        assert_eq!(cfg.get("session.medium_seconds").as_deref(), Some("25"));
        assert!(cfg.get("review.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn set_updates_nested_number() {
        let mut cfg = EngineConfig::default();
        cfg.set("session.hard_seconds", "45").unwrap();
        assert_eq!(cfg.session.hard_seconds, 45);

        cfg.set("review.streak_bonus", "1.25").unwrap();
        assert!((cfg.review.streak_bonus - 1.25).abs() < 1e-9);
    }

    #[test]
    fn set_updates_array_value() {
        let mut cfg = EngineConfig::default();
        cfg.set("progress.milestone_ladder", "[5, 20, 80]").unwrap();
        assert_eq!(cfg.progress.milestone_ladder, vec![5, 20, 80]);
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = EngineConfig::default();
        let result = cfg.set("review.nonexistent_key", "1");
        assert!(matches!(result, Err(ConfigError::UnknownKey(_))));
    }

    #[test]
    fn set_rejects_invalid_type() {
        let mut cfg = EngineConfig::default();
        let result = cfg.set("session.easy_seconds", "quick");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
        assert_eq!(cfg.session.easy_seconds, 15);
    }

    #[test]
    fn set_keeps_config_when_validation_fails() {
        let mut cfg = EngineConfig::default();
        let result = cfg.set("progress.milestone_ladder", "[10, 5]");
        assert!(result.is_err());
        assert_eq!(cfg.progress.milestone_ladder, default_milestone_ladder());
    }

    #[test]
    fn non_finite_floats_are_rejected() {
        for (section, field, literal) in [
            ("review", "streak_bonus", "nan"),
            ("review", "max_ease_factor", "nan"),
            ("review", "fast_response_bonus", "inf"),
            ("review", "slow_response_penalty", "nan"),
            ("review", "ease_gain_step", "nan"),
            ("review", "slow_response_seconds", "inf"),
            ("progress", "mastery_ease_factor", "nan"),
        ] {
            let text = format!("[{section}]\n{field} = {literal}\n");
            let result = EngineConfig::from_toml_str(&text);
            match result {
                Err(ConfigError::InvalidValue { key, .. }) => {
                    assert_eq!(key, format!("{section}.{field}"));
                }
                other => panic!("{section}.{field} = {literal} accepted: {other:?}"),
            }
        }
    }

    #[test]
    fn set_rejects_non_finite_number() {
        let mut cfg = EngineConfig::default();
        let result = cfg.set("review.streak_bonus", "NaN");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
        assert_eq!(cfg.review.streak_bonus, 1.15);
    }

    #[test]
    fn oversized_windows_are_rejected() {
        for text in [
            "[ranking]\ndue_soon_window_hours = 9000000000000\n",
            "[ranking]\ndue_soon_window_hours = -1\n",
            "[progress]\nweek_window_days = 1000000000\n",
            "[progress]\nweek_window_days = 0\n",
            "[review]\nmax_interval_days = 40000\n",
        ] {
            assert!(
                matches!(EngineConfig::from_toml_str(text), Err(ConfigError::InvalidValue { .. })),
                "accepted: {text}"
            );
        }

        let cfg = EngineConfig::from_toml_str(
            "[ranking]\ndue_soon_window_hours = 876000\n[progress]\nweek_window_days = 36500\n",
        )
        .unwrap();
        assert_eq!(cfg.progress.week_window_days, 36_500);
    }

    #[test]
    fn keys_must_name_a_section_field() {
        let mut cfg = EngineConfig::default();
        assert!(cfg.get("review").is_none());
        assert!(cfg.get("review.streak_bonus.extra").is_none());
        assert!(matches!(
            cfg.set("review", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            cfg.set("timer.streak_bonus", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
    }
}
