//! Budget solver: turns ENERGY and the SHAPE zone into integer hit-count
//! budgets for the anchor and shimmer voices.

use crate::tuning::{
    BUDGET_ANCHOR_SYNCOPATED_END_PCT, BUDGET_ANCHOR_SYNCOPATED_START_PCT,
    BUDGET_ANCHOR_WILD_END_PCT, BUDGET_ANCHOR_WILD_START_PCT, BUDGET_SHIMMER_SYNCOPATED_END_PCT,
    BUDGET_SHIMMER_SYNCOPATED_START_PCT, BUDGET_SHIMMER_WILD_END_PCT,
    BUDGET_SHIMMER_WILD_START_PCT, BUDGET_STABLE_SHAPE_END, BUDGET_SYNCOPATED_SHAPE_END, STEPS,
};

/// Round-half-away-from-zero, matching the budget solver's tie-break rule.
fn round_half_away_from_zero(x: f32) -> i32 {
    if x >= 0.0 {
        (x + 0.5).floor() as i32
    } else {
        (x - 0.5).ceil() as i32
    }
}

/// Resolves `(anchorBudget, shimmerBudget)` from `energy` and `shape`.
#[must_use]
pub fn solve(energy: f32, shape: f32) -> (u32, u32) {
    let energy = energy.clamp(0.0, 1.0);
    let shape = shape.clamp(0.0, 1.0);

    let base_hits = round_half_away_from_zero(energy * STEPS as f32) as f32;

    let (anchor_pct, shimmer_pct) = if shape < BUDGET_STABLE_SHAPE_END {
        (1.0, 1.0)
    } else if shape < BUDGET_SYNCOPATED_SHAPE_END {
        let t = (shape - BUDGET_STABLE_SHAPE_END) / (BUDGET_SYNCOPATED_SHAPE_END - BUDGET_STABLE_SHAPE_END);
        (
            lerp(BUDGET_ANCHOR_SYNCOPATED_START_PCT, BUDGET_ANCHOR_SYNCOPATED_END_PCT, t),
            lerp(BUDGET_SHIMMER_SYNCOPATED_START_PCT, BUDGET_SHIMMER_SYNCOPATED_END_PCT, t),
        )
    } else {
        let t = ((shape - BUDGET_SYNCOPATED_SHAPE_END) / (1.0 - BUDGET_SYNCOPATED_SHAPE_END)).clamp(0.0, 1.0);
        (
            lerp(BUDGET_ANCHOR_WILD_START_PCT, BUDGET_ANCHOR_WILD_END_PCT, t),
            lerp(BUDGET_SHIMMER_WILD_START_PCT, BUDGET_SHIMMER_WILD_END_PCT, t),
        )
    };

    let anchor = round_half_away_from_zero(base_hits * anchor_pct).clamp(0, STEPS as i32) as u32;
    let shimmer = round_half_away_from_zero(base_hits * shimmer_pct).clamp(0, STEPS as i32) as u32;
    (anchor, shimmer)
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_zone_equal_budgets() {
        let (anchor, shimmer) = solve(0.25, 0.0);
        assert_eq!(anchor, shimmer);
        assert_eq!(anchor, round_half_away_from_zero(0.25 * STEPS as f32) as u32);
    }

    #[test]
    fn budgets_always_within_range() {
        for e in 0..=10 {
            for s in 0..=10 {
                let (a, sh) = solve(e as f32 / 10.0, s as f32 / 10.0);
                assert!(a <= STEPS as u32);
                assert!(sh <= STEPS as u32);
            }
        }
    }

    #[test]
    fn wild_zone_favors_shimmer_over_anchor() {
        let (anchor, shimmer) = solve(0.85, 0.9);
        assert!(shimmer > anchor);
    }

    #[test]
    fn round_half_away_from_zero_ties() {
        assert_eq!(round_half_away_from_zero(0.5), 1);
        assert_eq!(round_half_away_from_zero(-0.5), -1);
        assert_eq!(round_half_away_from_zero(2.4), 2);
    }
}
