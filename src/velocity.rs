//! ACCENT velocity computer: maps metric weight to a velocity whose floor
//! and ceiling scale with ACCENT, plus per-step micro-variation.

use crate::bar::{HitMask, VelocityArray};
use crate::control::StepSeeds;
use crate::hash::hash_float;
use crate::tuning::{
    STEPS, VELOCITY_CEILING_ACCENT_SCALE, VELOCITY_CEILING_BASE, VELOCITY_FLOOR_ACCENT_SCALE,
    VELOCITY_FLOOR_BASE, VELOCITY_MAX, VELOCITY_MICRO_VARIATION_ACCENT_SCALE,
    VELOCITY_MICRO_VARIATION_BASE, VELOCITY_MIN,
};

/// Velocity for a single hit step, before clamping is applied by the caller
/// loop (kept separate so fill-engine modifiers can reuse the core
/// computation and add their own floor boost on top).
#[must_use]
pub fn hit_velocity(step: usize, metric_weight: f32, accent: f32, seed: u32) -> f32 {
    let floor = VELOCITY_FLOOR_BASE - VELOCITY_FLOOR_ACCENT_SCALE * accent;
    let ceiling = VELOCITY_CEILING_BASE + VELOCITY_CEILING_ACCENT_SCALE * accent;
    let mut v = floor + metric_weight * (ceiling - floor);
    let micro_amp = VELOCITY_MICRO_VARIATION_BASE + VELOCITY_MICRO_VARIATION_ACCENT_SCALE * accent;
    v += (hash_float(seed, step as u32) - 0.5) * micro_amp;
    v.clamp(VELOCITY_MIN, VELOCITY_MAX)
}

/// Computes the full per-step velocity array for every hit in `mask`.
/// Non-hit steps are left at `0.0` (undefined per the data model; readers
/// MUST gate on the mask).
#[must_use]
pub fn compute(mask: HitMask, metric_weight: &[f32; STEPS], accent: f32, seeds: &StepSeeds) -> VelocityArray {
    let mut out = [0.0; STEPS];
    for step in 0..STEPS {
        if mask & (1 << step) != 0 {
            out[step] = hit_velocity(step, metric_weight[step], accent, seeds[step]);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_seeds(seed: u32) -> StepSeeds {
        StepSeeds([seed; STEPS])
    }

    #[test]
    fn velocity_always_in_bounds() {
        for accent in [0.0, 0.25, 0.5, 0.75, 1.0] {
            for step in 0..STEPS {
                for mw in [0.0, 0.3, 0.7, 1.0] {
                    let v = hit_velocity(step, mw, accent, 7);
                    assert!((VELOCITY_MIN..=VELOCITY_MAX).contains(&v));
                }
            }
        }
    }

    #[test]
    fn accent_zero_flattens_velocity_variance() {
        // At accent=0, for a fixed step position, variance across seeds is small.
        let mut values = Vec::new();
        for seed in 0..50u32 {
            values.push(hit_velocity(4, 0.7, 0.0, seed));
        }
        let mean = values.iter().sum::<f32>() / values.len() as f32;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / values.len() as f32;
        assert!(variance < 0.02, "variance too high: {variance}");
    }

    #[test]
    fn non_hit_steps_left_zero() {
        let mw = [0.5; STEPS];
        let vel = compute(0, &mw, 0.5, &flat_seeds(1));
        assert!(vel.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn hit_steps_populated() {
        let mw = [0.5; STEPS];
        let mask: HitMask = (1 << 0) | (1 << 3);
        let vel = compute(mask, &mw, 0.5, &flat_seeds(1));
        assert!(vel[0] > 0.0);
        assert!(vel[3] > 0.0);
        assert_eq!(vel[1], 0.0);
    }
}
