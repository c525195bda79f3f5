//! Metric-weight tables: the three character profiles (stable, syncopated,
//! wild) plus the standalone metric-weight and stability tables.
//!
//! These are computed once, from pure position arithmetic over
//! [`crate::tuning::STEPS`], and never mutated afterward — the "compile-time"
//! tables of the generation pipeline. They're plain functions rather than
//! `const` arrays because the crossfade-adjacent math reads better as loops;
//! callers build them once (at [`crate::engine::Engine::new`]) and hold them
//! for the session.

use crate::tuning::STEPS;

/// Which metric tier a step falls on, finest-grained last.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Tier {
    Downbeat,
    Quarter,
    Eighth,
    Sixteenth,
}

fn tier_of(step: usize) -> Tier {
    let quarter_span = STEPS / 4;
    let eighth_span = STEPS / 8;
    if step == 0 {
        Tier::Downbeat
    } else if step % quarter_span == 0 {
        Tier::Quarter
    } else if step % eighth_span == 0 {
        Tier::Eighth
    } else {
        Tier::Sixteenth
    }
}

/// True for the "anticipation" step immediately before each quarter-note
/// position (the `3, 7, 11, 15, ...` positions at N=16).
fn is_anticipation(step: usize) -> bool {
    let quarter_span = STEPS / 4;
    (step + 1) % quarter_span == 0
}

/// Stable profile: strong on downbeats and quarters, soft elsewhere.
#[must_use]
pub fn stable_profile() -> [f32; STEPS] {
    let mut out = [0.0; STEPS];
    for (step, w) in out.iter_mut().enumerate() {
        *w = match tier_of(step) {
            Tier::Downbeat => 1.0,
            Tier::Quarter => 0.7,
            Tier::Eighth => 0.3,
            Tier::Sixteenth => 0.15,
        };
    }
    out
}

/// Syncopated profile: on-beat positions dampened, anticipation positions
/// raised.
#[must_use]
pub fn syncopated_profile() -> [f32; STEPS] {
    let mut out = stable_profile();
    for step in 0..STEPS {
        match tier_of(step) {
            Tier::Downbeat => out[step] *= 0.8,
            Tier::Quarter => out[step] *= 0.6,
            _ => {}
        }
        if is_anticipation(step) {
            out[step] = out[step].max(0.75);
        }
    }
    out
}

/// Wild profile: near-flat, mean ~0.5, slight bias away from the downbeat.
#[must_use]
pub fn wild_profile() -> [f32; STEPS] {
    let mut out = [0.5; STEPS];
    out[0] = 0.4;
    out
}

/// Metric weight: the step's raw perceptual strength, independent of SHAPE.
/// Used by ACCENT velocity and shimmer placement scoring.
#[must_use]
pub fn metric_weight() -> [f32; STEPS] {
    let mut out = [0.0; STEPS];
    let half = STEPS / 2;
    for (step, w) in out.iter_mut().enumerate() {
        *w = if step == 0 {
            1.0
        } else if step == half {
            0.9
        } else {
            match tier_of(step) {
                Tier::Downbeat | Tier::Quarter => 0.75,
                Tier::Eighth => 0.3,
                Tier::Sixteenth => 0.15,
            }
        };
    }
    out
}

/// Stability table: how strongly a step resists drift. Downbeats
/// lock the hardest, 16ths the least.
#[must_use]
pub fn stability() -> [f32; STEPS] {
    let mut out = [0.0; STEPS];
    let half = STEPS / 2;
    for (step, s) in out.iter_mut().enumerate() {
        *s = if step == 0 {
            1.0
        } else if step == half {
            0.85
        } else {
            match tier_of(step) {
                Tier::Downbeat | Tier::Quarter => 0.7,
                Tier::Eighth => 0.4,
                Tier::Sixteenth => 0.2,
            }
        };
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_zero_downbeats() {
        assert!(stable_profile()[0] > 0.0);
        assert!(syncopated_profile()[0] > 0.0);
        assert!(wild_profile()[0] > 0.0);
        assert!(metric_weight()[0] > 0.0);
    }

    #[test]
    fn all_tables_positive() {
        for w in stable_profile().iter().chain(syncopated_profile().iter()).chain(wild_profile().iter()) {
            assert!(*w > 0.0);
        }
    }

    #[test]
    fn metric_weight_step_zero_is_one() {
        assert_eq!(metric_weight()[0], 1.0);
    }

    #[test]
    fn stability_downbeat_is_max() {
        let s = stability();
        assert_eq!(s[0], 1.0);
        assert!(s.iter().all(|&v| v <= 1.0));
    }

    #[test]
    fn syncopated_raises_anticipation() {
        let sync = syncopated_profile();
        let stable = stable_profile();
        let quarter_span = STEPS / 4;
        let antic = quarter_span - 1;
        assert!(sync[antic] >= stable[antic]);
    }
}
