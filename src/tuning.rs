//! Named constants for every magic number in the generation pipeline.
//! Centralized the way `harmonium_core::tuning` keeps
//! algorithm constants in one place, but `pub const` rather than a runtime
//! struct: the core's contract takes no runtime configuration.

/// Pattern length. Fixed at build time; 16 or 32 are the supported values.
pub const STEPS: usize = 32;

/// Default `patternSeed` on boot.
pub const DEFAULT_PATTERN_SEED: u32 = 0x5EED_0001;

/// Hat burst fixed capacity.
pub const HAT_BURST_CAPACITY: usize = 12;

// --- SHAPE zone boundaries ---
pub const SHAPE_ZONE_1_END: f32 = 0.28;
pub const SHAPE_ZONE_2_END: f32 = 0.32;
pub const SHAPE_ZONE_3_END: f32 = 0.68;
pub const SHAPE_ZONE_4_END: f32 = 0.72;
pub const SHAPE_CROSSFADE_WIDTH: f32 = 0.04;

pub const STABLE_NOISE_AMPLITUDE: f32 = 0.05;
pub const WILD_NOISE_AMPLITUDE: f32 = 0.15;
pub const WILD_NOISE_SALT: u32 = 0xCAFE_BABE;

// --- Axis biaser ---
pub const AXIS_X_DOWNBEAT_SUPPRESS: f32 = 0.45;
pub const AXIS_X_OFFBEAT_BOOST: f32 = 0.60;
pub const AXIS_Y_WEAK_BOOST: f32 = 0.50;
pub const AXIS_Y_STRONG_BOOST_POSITIVE: f32 = 0.15;
pub const AXIS_Y_STRONG_BOOST_NEGATIVE: f32 = 0.25;
pub const AXIS_Y_WEAK_THRESHOLD: f32 = 0.5;

pub const BROKEN_MODE_SHAPE_THRESHOLD: f32 = 0.60;
pub const BROKEN_MODE_AXIS_X_THRESHOLD: f32 = 0.70;
pub const BROKEN_MODE_SHAPE_SCALE: f32 = 2.5;
pub const BROKEN_MODE_AXIS_X_SCALE: f32 = 3.33;
pub const BROKEN_MODE_PROBABILITY_SCALE: f32 = 0.6;
pub const BROKEN_MODE_WEIGHT_MULTIPLIER: f32 = 0.25;
pub const BROKEN_MODE_SALT: u32 = 0xDEAD_BEEF;

pub const WEIGHT_FLOOR: f32 = 0.05;
pub const WEIGHT_CEILING: f32 = 1.0;

// --- Budget solver ---
pub const BUDGET_STABLE_SHAPE_END: f32 = 0.30;
pub const BUDGET_SYNCOPATED_SHAPE_END: f32 = 0.70;
pub const BUDGET_ANCHOR_SYNCOPATED_START_PCT: f32 = 1.00;
pub const BUDGET_ANCHOR_SYNCOPATED_END_PCT: f32 = 0.90;
pub const BUDGET_SHIMMER_SYNCOPATED_START_PCT: f32 = 1.10;
pub const BUDGET_SHIMMER_SYNCOPATED_END_PCT: f32 = 1.30;
pub const BUDGET_ANCHOR_WILD_START_PCT: f32 = 0.90;
pub const BUDGET_ANCHOR_WILD_END_PCT: f32 = 0.80;
pub const BUDGET_SHIMMER_WILD_START_PCT: f32 = 1.30;
pub const BUDGET_SHIMMER_WILD_END_PCT: f32 = 1.50;

// --- Velocity / ACCENT ---
pub const VELOCITY_FLOOR_BASE: f32 = 0.80;
pub const VELOCITY_FLOOR_ACCENT_SCALE: f32 = 0.50;
pub const VELOCITY_CEILING_BASE: f32 = 0.88;
pub const VELOCITY_CEILING_ACCENT_SCALE: f32 = 0.12;
pub const VELOCITY_MICRO_VARIATION_BASE: f32 = 0.02;
pub const VELOCITY_MICRO_VARIATION_ACCENT_SCALE: f32 = 0.05;
pub const VELOCITY_MIN: f32 = 0.30;
pub const VELOCITY_MAX: f32 = 1.00;

// --- Fill engine ---
pub const FILL_DENSITY_BASE: f32 = 0.6;
pub const FILL_DENSITY_ENERGY_SCALE: f32 = 0.4;
pub const FILL_VELOCITY_FLOOR_BOOST_BASE: f32 = 0.10;
pub const FILL_VELOCITY_FLOOR_BOOST_SCALE: f32 = 0.15;
pub const FILL_ACCENT_PROBABILITY_BASE: f32 = 0.50;
pub const FILL_ACCENT_PROBABILITY_SCALE: f32 = 0.50;
pub const FILL_FORCE_CEILING_PROGRESS: f32 = 0.85;
pub const FILL_ELIGIBILITY_EXPANSION_PROGRESS: f32 = 0.5;
pub const FILL_ELIGIBILITY_WEIGHT_FLOOR: f32 = 0.3;
pub const FILL_MIN_DURATION_STEPS: usize = 4;

pub const HAT_BURST_TRIGGER_BASE: f32 = 2.0;
pub const HAT_BURST_TRIGGER_ENERGY_SCALE: f32 = 10.0;
pub const HAT_BURST_SHAPE_EVEN_END: f32 = 0.3;
pub const HAT_BURST_SHAPE_EUCLIDEAN_END: f32 = 0.7;
pub const HAT_BURST_VELOCITY_BASE: f32 = 0.65;
pub const HAT_BURST_VELOCITY_ENERGY_SCALE: f32 = 0.35;
pub const HAT_BURST_DUCK_FACTOR: f32 = 0.30;
pub const HAT_BURST_DUCK_WINDOW: i32 = 1;

// --- Step scheduler / swing ---
pub const SWING_MIN: f32 = 0.5;
pub const SWING_RANGE: f32 = 0.18;
pub const ANCHOR_SWING_SCALE: f32 = 0.70;
pub const CLOCK_LOSS_INTERNAL_PERIODS: u32 = 2;

// --- Drift ---
pub const ANCHOR_DRIFT_SCALE: f32 = 0.7;
pub const SHIMMER_DRIFT_SCALE: f32 = 1.3;

/// Regeneration trigger threshold for AXIS X/Y mid-bar changes.
pub const AXIS_CHANGE_REGEN_THRESHOLD: f32 = 0.10;
