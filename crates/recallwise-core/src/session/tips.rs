//! Study tips derived from a planned session's composition.

use super::SessionBreakdown;

/// What the tips are derived from.
pub(super) struct Composition {
    pub breakdown: SessionBreakdown,
    /// Candidates that passed ranking and the difficulty filter
    pub candidate_count: usize,
    /// New candidates skipped because the new-item cap was reached
    pub capped_new: usize,
    pub hard_count: usize,
    pub estimated_minutes: f64,
    pub target_minutes: f64,
}

fn cards(n: usize) -> String {
    if n == 1 {
        "1 card".to_string()
    } else {
        format!("{n} cards")
    }
}

/// Deterministic advisories, most important first.
pub(super) fn study_tips(composition: &Composition) -> Vec<String> {
    let breakdown = &composition.breakdown;
    let planned = breakdown.total();
    let mut tips = Vec::new();

    if planned == 0 {
        if composition.candidate_count == 0 {
            tips.push("Nothing is due right now. Add new cards or come back later.".to_string());
        } else {
            tips.push(format!(
                "No card fits in {:.1} minutes; try a longer session.",
                composition.target_minutes
            ));
        }
        return tips;
    }

    if breakdown.overdue > 0 {
        tips.push(format!(
            "Start with the {} overdue; they need attention before they slip further.",
            cards(breakdown.overdue)
        ));
    }

    if breakdown.new > 0 {
        tips.push(format!(
            "Take the {} new at a steady pace and revisit them later today.",
            cards(breakdown.new)
        ));
    }

    if composition.hard_count * 2 >= planned && composition.hard_count > 0 {
        tips.push("This session is heavy on hard cards; take a short break halfway through.".to_string());
    }

    if composition.capped_new > 0 {
        let n = composition.capped_new;
        tips.push(format!(
            "{n} new {} held back by the new-card limit; raise the limit to see them sooner.",
            if n == 1 { "card" } else { "cards" }
        ));
    }

    let deferred = composition
        .candidate_count
        .saturating_sub(planned)
        .saturating_sub(composition.capped_new);
    if deferred > 0 {
        tips.push(format!(
            "{} still waiting; a longer session would cover them.",
            cards(deferred)
        ));
    } else if composition.estimated_minutes * 2.0 < composition.target_minutes {
        tips.push("You'll finish early; use the spare time to go over recent mistakes.".to_string());
    }

    tips
}
