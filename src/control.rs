//! Control snapshot, seed state, and the `AuxMode` enum: session-scope
//! state owned exclusively by the control context.

use crate::tuning::{DEFAULT_PATTERN_SEED, STEPS};

/// What the third voice does: a continuous fill gate, or a pattern-aware
/// hat burst.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuxMode {
    FillGate,
    HatBurst,
}

impl Default for AuxMode {
    fn default() -> Self {
        AuxMode::FillGate
    }
}

/// The eight user-visible control parameters plus the two discrete
/// externally-owned states, as last observed by the control context.
#[derive(Clone, Copy, Debug)]
pub struct ControlSnapshot {
    pub energy: f32,
    pub shape: f32,
    pub axis_x: f32,
    pub axis_y: f32,
    /// Quantized into 5 buckets (÷4, ÷2, ×1, ×2, ×4) by the external clock
    /// source, which owns applying the division to its own tick stream; the
    /// core only stores the raw knob value for the collaborator to read back.
    pub clock_div: f32,
    pub swing: f32,
    pub drift: f32,
    pub accent: f32,
    pub aux_mode: AuxMode,
    pub fill_armed: bool,
}

impl Default for ControlSnapshot {
    fn default() -> Self {
        Self {
            energy: 0.5,
            shape: 0.0,
            axis_x: 0.5,
            axis_y: 0.5,
            clock_div: 0.4,
            swing: 0.0,
            drift: 0.0,
            accent: 0.5,
            aux_mode: AuxMode::FillGate,
            fill_armed: false,
        }
    }
}

impl ControlSnapshot {
    /// Clamps every float field into its documented range. Control inputs
    /// are trusted to already be well-formed, but this gives a cheap
    /// guarantee at the boundary.
    #[must_use]
    pub fn clamped(mut self) -> Self {
        self.energy = self.energy.clamp(0.0, 1.0);
        self.shape = self.shape.clamp(0.0, 1.0);
        self.axis_x = self.axis_x.clamp(0.0, 1.0);
        self.axis_y = self.axis_y.clamp(0.0, 1.0);
        self.clock_div = self.clock_div.clamp(0.0, 1.0);
        self.swing = self.swing.clamp(0.0, 1.0);
        self.drift = self.drift.clamp(0.0, 1.0);
        self.accent = self.accent.clamp(0.0, 1.0);
        self
    }
}

/// `patternSeed` (stable across the session) and the per-bar `phraseSeed`
/// derived from it.
#[derive(Clone, Copy, Debug)]
pub struct SeedState {
    pub pattern_seed: u32,
    pub phrase_seed: u32,
}

impl Default for SeedState {
    fn default() -> Self {
        Self {
            pattern_seed: DEFAULT_PATTERN_SEED,
            phrase_seed: DEFAULT_PATTERN_SEED,
        }
    }
}

impl SeedState {
    #[must_use]
    pub fn new(pattern_seed: u32) -> Self {
        let mut s = Self { pattern_seed, phrase_seed: pattern_seed };
        s.derive_phrase_seed(0);
        s
    }

    /// Derives this bar's `phraseSeed` as `mix(patternSeed, barCounter)`.
    pub fn derive_phrase_seed(&mut self, bar_counter: u64) {
        self.phrase_seed = crate::hash::hash_u32(self.pattern_seed, bar_counter as u32 ^ (bar_counter >> 32) as u32);
    }

    /// Returns `patternSeed` or `phraseSeed` depending on whether `stability`
    /// is at or above the (role-scaled) drift threshold.
    #[must_use]
    pub fn seed_for_stability(&self, stability: f32, effective_drift: f32) -> u32 {
        if stability >= effective_drift {
            self.pattern_seed
        } else {
            self.phrase_seed
        }
    }

    /// Resolves one seed per step: a step whose
    /// stability is at or above `effective_drift` keys off `patternSeed`,
    /// otherwise off `phraseSeed`. `effective_drift` is the role-scaled
    /// drift value (anchor ×0.7, shimmer ×1.3) the caller has already
    /// computed.
    #[must_use]
    pub fn step_seeds(&self, stability_table: &[f32; STEPS], effective_drift: f32) -> StepSeeds {
        let mut seeds = [0u32; STEPS];
        for step in 0..STEPS {
            seeds[step] = self.seed_for_stability(stability_table[step], effective_drift);
        }
        StepSeeds(seeds)
    }
}

/// Per-step resolved seed: step `i`'s decisions use `seeds[i]` rather than a
/// single bar-wide seed, so that downbeats (high stability) can stay locked
/// to `patternSeed` while weaker steps drift with `phraseSeed`.
#[derive(Clone, Copy, Debug)]
pub struct StepSeeds(pub [u32; STEPS]);

impl std::ops::Index<usize> for StepSeeds {
    type Output = u32;
    fn index(&self, step: usize) -> &u32 {
        &self.0[step]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reseed_to_same_value_is_idempotent() {
        let a = SeedState::new(7);
        let b = SeedState::new(7);
        assert_eq!(a.phrase_seed, b.phrase_seed);
    }

    #[test]
    fn drift_zero_always_uses_pattern_seed() {
        let seeds = SeedState::new(1);
        assert_eq!(seeds.seed_for_stability(0.2, 0.0), seeds.pattern_seed);
        assert_eq!(seeds.seed_for_stability(1.0, 0.0), seeds.pattern_seed);
    }

    #[test]
    fn drift_one_can_select_phrase_seed() {
        let mut seeds = SeedState::new(1);
        seeds.derive_phrase_seed(3);
        assert_eq!(seeds.seed_for_stability(0.2, 1.0), seeds.phrase_seed);
    }
}
