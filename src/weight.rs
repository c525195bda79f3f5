//! SHAPE weight blender: mixes the three character profiles according to
//! `shape`, crossfading at zone boundaries and adding seed-driven noise at
//! the extremes.

use crate::control::StepSeeds;
use crate::hash::hash_float;
use crate::tuning::{
    SHAPE_ZONE_1_END, SHAPE_ZONE_2_END, SHAPE_ZONE_3_END, SHAPE_ZONE_4_END, STABLE_NOISE_AMPLITUDE,
    STEPS, WILD_NOISE_AMPLITUDE, WILD_NOISE_SALT,
};

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

/// Blends `stable`, `syncopated`, `wild` into a single per-step weight
/// vector according to `shape`, adding humanization/chaos noise at the
/// pure-stable and pure-wild extremes. `seeds` is already stratified per
/// step: each step's noise draws from its own resolved seed.
#[must_use]
pub fn blend(
    stable: &[f32; STEPS],
    syncopated: &[f32; STEPS],
    wild: &[f32; STEPS],
    shape: f32,
    seeds: &StepSeeds,
) -> [f32; STEPS] {
    let shape = shape.clamp(0.0, 1.0);
    let mut out = [0.0; STEPS];

    for step in 0..STEPS {
        let lo = (stable[step], syncopated[step], wild[step]);
        out[step] = blend_step(lo, shape, seeds[step], step);
    }
    out
}

fn blend_step(profiles: (f32, f32, f32), shape: f32, seed: u32, step: usize) -> f32 {
    let (stable, syncopated, wild) = profiles;

    // Zone 1: pure stable with humanization noise.
    if shape < SHAPE_ZONE_1_END {
        let noise_amp = STABLE_NOISE_AMPLITUDE * (1.0 - shape / SHAPE_ZONE_1_END);
        let noise = (hash_float(seed, step as u32) - 0.5) * 2.0 * noise_amp;
        return stable + noise;
    }

    // Crossfade zone 1 -> zone 2 (stable -> syncopated).
    if shape < SHAPE_ZONE_2_END {
        let fade = (shape - SHAPE_ZONE_1_END) / (SHAPE_ZONE_2_END - SHAPE_ZONE_1_END);
        return lerp(stable, syncopated, fade);
    }

    if shape < SHAPE_ZONE_3_END {
        let t = (shape - SHAPE_ZONE_2_END) / (SHAPE_ZONE_3_END - SHAPE_ZONE_2_END);
        return if t < 0.5 {
            lerp(stable, syncopated, 2.0 * t)
        } else {
            lerp(syncopated, wild, 2.0 * t - 1.0)
        };
    }

    if shape < SHAPE_ZONE_4_END {
        let fade = (shape - SHAPE_ZONE_3_END) / (SHAPE_ZONE_4_END - SHAPE_ZONE_3_END);
        return lerp(syncopated, wild, fade);
    }

    let noise_amp = WILD_NOISE_AMPLITUDE * (shape - SHAPE_ZONE_4_END) / (1.0 - SHAPE_ZONE_4_END);
    let noise = (hash_float(seed ^ WILD_NOISE_SALT, step as u32) - 0.5) * 2.0 * noise_amp;
    wild + noise
}
