//! Fill engine: when armed, inflates hit budgets, raises the velocity
//! floor, expands weight eligibility, forces accents, and generates the
//! pattern-aware hat burst.

use arrayvec::ArrayVec;

use crate::bar::{HatBurst, HatHit, HitMask};
use crate::hash::{hash_float, hash_range, hash_u32};
use crate::tuning::{
    FILL_ACCENT_PROBABILITY_BASE, FILL_ACCENT_PROBABILITY_SCALE,
    FILL_DENSITY_BASE, FILL_DENSITY_ENERGY_SCALE, FILL_ELIGIBILITY_EXPANSION_PROGRESS,
    FILL_ELIGIBILITY_WEIGHT_FLOOR, FILL_FORCE_CEILING_PROGRESS, FILL_VELOCITY_FLOOR_BOOST_BASE,
    FILL_VELOCITY_FLOOR_BOOST_SCALE, HAT_BURST_CAPACITY, HAT_BURST_DUCK_FACTOR,
    HAT_BURST_DUCK_WINDOW, HAT_BURST_SHAPE_EUCLIDEAN_END, HAT_BURST_SHAPE_EVEN_END,
    HAT_BURST_TRIGGER_BASE, HAT_BURST_TRIGGER_ENERGY_SCALE, HAT_BURST_VELOCITY_BASE,
    HAT_BURST_VELOCITY_ENERGY_SCALE, STEPS, VELOCITY_MAX,
};

/// Multiplier applied to both voice budgets while a fill is active.
#[must_use]
pub fn density_multiplier(energy: f32, fill_progress: f32) -> f32 {
    1.0 + (FILL_DENSITY_BASE + FILL_DENSITY_ENERGY_SCALE * energy) * fill_progress * fill_progress
}

/// Inflates a budget by the fill's density multiplier, clamped to `[0, N]`.
#[must_use]
pub fn inflate_budget(budget: u32, multiplier: f32) -> u32 {
    let scaled = budget as f32 * multiplier;
    (scaled.round().max(0.0) as u32).min(STEPS as u32)
}

/// Additive velocity floor boost while a fill is active.
#[must_use]
pub fn velocity_floor_boost(fill_progress: f32) -> f32 {
    FILL_VELOCITY_FLOOR_BOOST_BASE + FILL_VELOCITY_FLOOR_BOOST_SCALE * fill_progress
}

/// Probability that any given hit is forced to ceiling velocity.
#[must_use]
pub fn accent_probability(fill_progress: f32) -> f32 {
    if fill_progress > FILL_FORCE_CEILING_PROGRESS {
        1.0
    } else {
        FILL_ACCENT_PROBABILITY_BASE + FILL_ACCENT_PROBABILITY_SCALE * fill_progress
    }
}

/// Whether step `step`'s hit should be forced to ceiling velocity this bar.
#[must_use]
pub fn should_force_ceiling(fill_progress: f32, seed: u32, step: usize) -> bool {
    let p = accent_probability(fill_progress);
    if p >= 1.0 {
        return true;
    }
    hash_float(seed, 0x7000 + step as u32) < p
}

/// Applies the fill's velocity floor boost, and forces ceiling velocity
/// when `should_force_ceiling` says so.
#[must_use]
pub fn apply_fill_velocity(base_velocity: f32, fill_progress: f32, force_ceiling: bool) -> f32 {
    if force_ceiling {
        return VELOCITY_MAX;
    }
    (base_velocity + velocity_floor_boost(fill_progress)).min(VELOCITY_MAX)
}

/// Lifts the weight floor of weak (`< 0.5`) steps to at least
/// `FILL_ELIGIBILITY_WEIGHT_FLOOR` once the fill has progressed past its
/// midpoint, widening which steps the sampler can pick.
pub fn expand_eligibility(weights: &mut [f32; STEPS], fill_progress: f32) {
    if fill_progress <= FILL_ELIGIBILITY_EXPANSION_PROGRESS {
        return;
    }
    for w in weights.iter_mut() {
        if *w < 0.5 {
            *w = w.max(FILL_ELIGIBILITY_WEIGHT_FLOOR);
        }
    }
}

/// Bjorklund-style even distribution of `pulses` onto `steps` positions.
/// Ported from the rhythm-sequencer pattern used elsewhere in the pack for
/// the hat burst's "Euclidean-style" distribution.
fn euclidean_positions(steps: usize, pulses: usize) -> Vec<usize> {
    if pulses == 0 || steps == 0 {
        return Vec::new();
    }
    if pulses >= steps {
        return (0..steps).collect();
    }

    let mut pattern: Vec<Vec<u8>> = Vec::new();
    for _ in 0..pulses {
        pattern.push(vec![1]);
    }
    for _ in 0..(steps - pulses) {
        pattern.push(vec![0]);
    }

    let mut count = pulses.min(steps - pulses);
    let mut remainder = pattern.len() - count;
    while remainder > 1 && count > 0 {
        for i in 0..count {
            let last = pattern.pop().unwrap();
            pattern[i].extend(last);
        }
        remainder = pattern.len() - count;
        count = count.min(remainder);
    }

    let mut flat = Vec::with_capacity(steps);
    for group in pattern {
        flat.extend(group);
    }
    flat.iter().enumerate().filter(|&(_, &v)| v == 1).map(|(i, _)| i).collect()
}

/// Generates the hat burst for a fill window `[fill_start, fill_start +
/// fill_duration)`, when `auxMode = HatBurst` and a fill is active.
/// `underlying_hits` is the union of anchor and shimmer hit masks, used for
/// velocity ducking near the main pattern.
#[must_use]
pub fn generate_hat_burst(
    fill_start: u16,
    fill_duration: u16,
    shape: f32,
    energy: f32,
    seed: u32,
    underlying_hits: HitMask,
) -> HatBurst {
    let mut burst = HatBurst { fill_start, fill_duration, hits: ArrayVec::new() };
    if fill_duration == 0 {
        return burst;
    }

    let duration = fill_duration as usize;
    let trigger_count = ((HAT_BURST_TRIGGER_BASE + HAT_BURST_TRIGGER_ENERGY_SCALE * energy)
        .round()
        .max(1.0) as usize)
        .min(HAT_BURST_CAPACITY);

    let euclid_positions = if shape >= HAT_BURST_SHAPE_EVEN_END && shape < HAT_BURST_SHAPE_EUCLIDEAN_END {
        euclidean_positions(duration, trigger_count)
    } else {
        Vec::new()
    };

    let mut used = [false; STEPS];
    let base_velocity = HAT_BURST_VELOCITY_BASE + HAT_BURST_VELOCITY_ENERGY_SCALE * energy;

    for i in 0..trigger_count {
        let mut rel: i32 = if shape < HAT_BURST_SHAPE_EVEN_END {
            ((i * duration) / trigger_count) as i32
        } else if shape < HAT_BURST_SHAPE_EUCLIDEAN_END {
            let base = *euclid_positions.get(i).unwrap_or(&0) as i32;
            let jitter = (hash_u32(seed, i as u32) % 3) as i32 - 1;
            base + jitter
        } else {
            hash_range(seed, i as u32, 0, duration as i32)
        };
        rel = rel.clamp(0, duration as i32 - 1);

        let Some(rel) = resolve_collision(rel as usize, duration, &used) else {
            continue;
        };
        used[rel] = true;

        let abs_step = (fill_start as usize + rel) % STEPS;
        let mut velocity = base_velocity;
        if near_hit(abs_step, underlying_hits) {
            velocity *= HAT_BURST_DUCK_FACTOR;
        }

        if burst.hits.try_push(HatHit { step: abs_step as u8, velocity }).is_err() {
            break; // capacity reached
        }
    }

    burst
}

/// Nudges `candidate` to the nearest unused step within `[0, duration)`.
/// Returns `None` if every step in the window is already used.
fn resolve_collision(candidate: usize, duration: usize, used: &[bool; STEPS]) -> Option<usize> {
    if !used[candidate] {
        return Some(candidate);
    }
    for distance in 1..duration {
        if candidate + distance < duration && !used[candidate + distance] {
            return Some(candidate + distance);
        }
        if candidate >= distance && !used[candidate - distance] {
            return Some(candidate - distance);
        }
    }
    None
}

fn near_hit(step: usize, hits: HitMask) -> bool {
    for delta in -HAT_BURST_DUCK_WINDOW..=HAT_BURST_DUCK_WINDOW {
        let probe = (step as i32 + delta).rem_euclid(STEPS as i32) as usize;
        if hits & (1 << probe) != 0 {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pathological_zero_duration_gives_empty_burst() {
        let burst = generate_hat_burst(0, 0, 0.5, 0.5, 1, 0);
        assert!(burst.hits.is_empty());
    }

    #[test]
    fn trigger_count_scales_with_energy_and_caps_at_capacity() {
        let low = generate_hat_burst(0, 16, 0.1, 0.0, 1, 0);
        let high = generate_hat_burst(0, 16, 0.1, 1.0, 1, 0);
        assert!(high.hits.len() >= low.hits.len());
        assert!(high.hits.len() <= HAT_BURST_CAPACITY);
    }

    #[test]
    fn hits_have_distinct_steps_within_window() {
        let burst = generate_hat_burst(5, 8, 0.9, 0.8, 0xBEEF, 0);
        let mut seen = std::collections::HashSet::new();
        for hit in &burst.hits {
            assert!(seen.insert(hit.step), "duplicate step {}", hit.step);
            let rel = (hit.step as usize + STEPS - 5) % STEPS;
            assert!(rel < 8);
        }
    }

    #[test]
    fn ducking_lowers_velocity_near_underlying_hits() {
        let underlying: HitMask = 1 << 2;
        let burst_near = generate_hat_burst(0, 8, 0.9, 0.9, 0xCAFE, underlying);
        for hit in &burst_near.hits {
            if near_hit(hit.step as usize, underlying) {
                let base = HAT_BURST_VELOCITY_BASE + HAT_BURST_VELOCITY_ENERGY_SCALE * 0.9;
                assert!((hit.velocity - base * HAT_BURST_DUCK_FACTOR).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn density_multiplier_is_one_at_progress_zero() {
        assert!((density_multiplier(0.5, 0.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn force_ceiling_past_085_progress() {
        assert!(should_force_ceiling(0.9, 123, 5));
    }

    #[test]
    fn eligibility_expansion_noop_before_midpoint() {
        let mut w = [0.1; STEPS];
        expand_eligibility(&mut w, 0.3);
        assert!(w.iter().all(|&v| v == 0.1));
    }

    #[test]
    fn eligibility_expansion_raises_weak_steps_past_midpoint() {
        let mut w = [0.1; STEPS];
        expand_eligibility(&mut w, 0.8);
        assert!(w.iter().all(|&v| v >= FILL_ELIGIBILITY_WEIGHT_FLOOR));
    }
}
