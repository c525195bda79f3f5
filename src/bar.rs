//! Data model for bar-scope state: hit masks, velocity arrays, hat burst,
//! and the aggregate `BarState` published from the control context to the
//! audio context.

use arrayvec::ArrayVec;

use crate::tuning::{HAT_BURST_CAPACITY, STEPS};

/// A bitset over the N steps of a bar. One bit per step; bit `i` set means
/// the voice fires on step `i`. `STEPS <= 32` so this fits one machine word.
pub type HitMask = u32;

/// Per-voice velocities, indexed by step. Only meaningful where the
/// corresponding [`HitMask`] bit is set.
pub type VelocityArray = [f32; STEPS];

/// One entry in the hat burst: a step within the fill window and its
/// (possibly ducked) velocity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HatHit {
    pub step: u8,
    pub velocity: f32,
}

/// Fixed-capacity pattern-aware auxiliary trigger stream, generated only
/// while a fill is active and `auxMode == HatBurst`.
#[derive(Clone, Debug, Default)]
pub struct HatBurst {
    pub hits: ArrayVec<HatHit, HAT_BURST_CAPACITY>,
    pub fill_start: u16,
    pub fill_duration: u16,
}

impl HatBurst {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains_step(&self, step: u8) -> bool {
        self.hits.iter().any(|h| h.step == step)
    }
}

/// Everything the step scheduler needs for one bar: the three hit masks,
/// their velocity arrays, an optional hat burst, and the bar counter this
/// state was generated for.
#[derive(Clone, Debug)]
pub struct BarState {
    pub bar_counter: u64,
    pub anchor_mask: HitMask,
    pub anchor_velocity: VelocityArray,
    pub shimmer_mask: HitMask,
    pub shimmer_velocity: VelocityArray,
    pub hat_burst: HatBurst,
}

impl Default for BarState {
    fn default() -> Self {
        Self {
            bar_counter: 0,
            anchor_mask: 0,
            anchor_velocity: [0.0; STEPS],
            shimmer_mask: 0,
            shimmer_velocity: [0.0; STEPS],
            hat_burst: HatBurst::empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bar_state_has_no_hits() {
        let bar = BarState::default();
        assert_eq!(bar.anchor_mask, 0);
        assert_eq!(bar.shimmer_mask, 0);
        assert!(bar.hat_burst.hits.is_empty());
    }

    #[test]
    fn hat_burst_contains_step() {
        let mut burst = HatBurst::empty();
        burst.hits.push(HatHit { step: 5, velocity: 0.7 });
        assert!(burst.contains_step(5));
        assert!(!burst.contains_step(6));
    }
}
