//! Mastery milestones.

use serde::{Deserialize, Serialize};

/// Next mastery goal for a learner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub current: u32,
    pub target: u32,
    pub description: String,
}

/// The first rung above `mastered` on the ladder; past the top rung targets
/// continue in multiples of `step`.
pub fn next_milestone(mastered: u32, ladder: &[u32], step: u32) -> Milestone {
    let target = ladder
        .iter()
        .copied()
        .find(|&rung| rung > mastered)
        .unwrap_or_else(|| {
            let step = step.max(1);
            (mastered / step).saturating_add(1).saturating_mul(step)
        });

    let description = if target == 1 {
        "Master your first card".to_string()
    } else {
        format!("Master {target} cards")
    };

    Milestone {
        current: mastered,
        target,
        description,
    }
}
