//! Deterministic, seedable drum-voice pattern generation pipeline: the
//! Anchor/Shimmer/Aux triggers a eurorack drum-trigger module derives from
//! four performance knobs (ENERGY, SHAPE, AXIS X/Y), four configuration
//! knobs (SWING, DRIFT, ACCENT, a seed), and an internal or external clock.
//!
//! [`engine::Engine`] is the entry point: it owns every module below and
//! exposes the control-context / audio-context split described in the
//! concurrency design notes.

pub mod axis;
pub mod bar;
pub mod budget;
pub mod complement;
pub mod control;
pub mod engine;
pub mod error;
pub mod fill;
pub mod hash;
pub mod log_bridge;
pub mod rt_check;
pub mod scheduler;
pub mod tables;
pub mod topk;
pub mod tuning;
pub mod velocity;
pub mod weight;

pub use bar::{BarState, HatBurst, HatHit, HitMask, VelocityArray};
pub use control::{AuxMode, ControlSnapshot, SeedState};
pub use engine::Engine;
pub use scheduler::{ClockState, Event, Voice};
