//! AXIS X/Y biaser: additively reshapes a weight vector to favor downbeats
//! vs offbeats (X) and weak-position intricacy (Y), plus "broken mode"
//! downbeat suppression at the high-SHAPE/high-AXIS-X corner.

use crate::control::StepSeeds;
use crate::hash::hash_float;
use crate::tuning::{
    AXIS_X_DOWNBEAT_SUPPRESS, AXIS_X_OFFBEAT_BOOST, AXIS_Y_STRONG_BOOST_NEGATIVE,
    AXIS_Y_STRONG_BOOST_POSITIVE, AXIS_Y_WEAK_BOOST, AXIS_Y_WEAK_THRESHOLD,
    BROKEN_MODE_AXIS_X_SCALE, BROKEN_MODE_AXIS_X_THRESHOLD, BROKEN_MODE_PROBABILITY_SCALE,
    BROKEN_MODE_SALT, BROKEN_MODE_SHAPE_SCALE, BROKEN_MODE_SHAPE_THRESHOLD,
    BROKEN_MODE_WEIGHT_MULTIPLIER, STEPS, WEIGHT_CEILING, WEIGHT_FLOOR,
};

/// `positionStrength`: negative (and larger in magnitude) for strong,
/// downbeat-class steps; positive for weak, off-beat-class steps.
fn position_strength(metric_weight: f32) -> f32 {
    if metric_weight >= AXIS_Y_WEAK_THRESHOLD {
        -metric_weight
    } else {
        1.0 - metric_weight
    }
}

/// Reshapes `weights` in place according to `axis_x`, `axis_y`, and the
/// broken-mode interaction between `shape` and `axis_x`. `seeds` is already
/// stratified per step; the broken-mode coin flip for step `i` uses
/// `seeds[i]`.
pub fn apply(weights: &mut [f32; STEPS], metric_weight: &[f32; STEPS], axis_x: f32, axis_y: f32, shape: f32, seeds: &StepSeeds) {
    let x_bias = 2.0 * axis_x - 1.0;
    let y_bias = 2.0 * axis_y - 1.0;

    for step in 0..STEPS {
        let mw = metric_weight[step];
        let strength = position_strength(mw);
        let is_downbeat_class = strength < 0.0;

        if x_bias > 0.0 {
            if is_downbeat_class {
                weights[step] -= x_bias * strength.abs() * AXIS_X_DOWNBEAT_SUPPRESS;
            } else {
                weights[step] += x_bias * strength * AXIS_X_OFFBEAT_BOOST;
            }
        } else if x_bias < 0.0 {
            let mag = x_bias.abs();
            if is_downbeat_class {
                weights[step] += mag * strength.abs() * AXIS_X_OFFBEAT_BOOST;
            } else {
                weights[step] -= mag * strength * AXIS_X_DOWNBEAT_SUPPRESS;
            }
        }

        let weak = mw < AXIS_Y_WEAK_THRESHOLD;
        if y_bias > 0.0 {
            if weak {
                weights[step] += y_bias * AXIS_Y_WEAK_BOOST;
            } else {
                weights[step] += y_bias * AXIS_Y_STRONG_BOOST_POSITIVE;
            }
        } else if y_bias < 0.0 {
            let mag = y_bias.abs();
            if weak {
                weights[step] -= mag * AXIS_Y_WEAK_BOOST;
            } else {
                weights[step] += mag * AXIS_Y_STRONG_BOOST_NEGATIVE;
            }
        }
    }

    if shape > BROKEN_MODE_SHAPE_THRESHOLD && axis_x > BROKEN_MODE_AXIS_X_THRESHOLD {
        let broken_intensity = ((shape - BROKEN_MODE_SHAPE_THRESHOLD) * BROKEN_MODE_SHAPE_SCALE
            * (axis_x - BROKEN_MODE_AXIS_X_THRESHOLD) * BROKEN_MODE_AXIS_X_SCALE)
            .clamp(0.0, 1.0);
        let probability = broken_intensity * BROKEN_MODE_PROBABILITY_SCALE;
        for step in 0..STEPS {
            if metric_weight[step] >= AXIS_Y_WEAK_THRESHOLD {
                let roll = hash_float(seeds[step] ^ BROKEN_MODE_SALT, step as u32);
                if roll < probability {
                    weights[step] *= BROKEN_MODE_WEIGHT_MULTIPLIER;
                }
            }
        }
    }

    for w in weights.iter_mut() {
        *w = w.clamp(WEIGHT_FLOOR, WEIGHT_CEILING);
    }
}
