//! Step scheduler: swing delay, trigger emission, sample-and-hold output,
//! and the Idle/Slaved clock-source state machine.
//!
//! This is the sole audio-context writer: no allocation, no locks, no
//! suspension. It borrows the current [`crate::bar::BarState`] and advances
//! a step index on each clock edge, modeled as the pure function the design
//! notes call for rather than an async generator.

use arrayvec::ArrayVec;

use crate::bar::BarState;
use crate::tuning::{ANCHOR_SWING_SCALE, CLOCK_LOSS_INTERNAL_PERIODS, STEPS, SWING_MIN, SWING_RANGE};

/// Which gate a trigger event targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Voice {
    Anchor,
    Shimmer,
    Aux,
}

/// One trigger event emitted on a step edge. `delay_fraction` is the
/// fraction of a step duration to hold before firing (0.0 = immediate);
/// the audio-I/O collaborator translates this into sample count using its
/// own sample rate, per the design notes' timing-seam guidance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Event {
    pub voice: Voice,
    pub velocity: f32,
    pub delay_fraction: f32,
}

/// Whether the internal tempo or an external gate stream is authoritative.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockState {
    Idle,
    Slaved,
}

/// Remaps the raw `[0,1]` swing knob into the documented `[0.5, 0.68]`
/// range.
#[must_use]
fn remap_swing(swing_knob: f32) -> f32 {
    swing_knob.clamp(0.0, 1.0) * SWING_RANGE + SWING_MIN
}

/// Per-bar, per-step scheduling state. Owned by the audio context.
pub struct StepScheduler {
    step_index: usize,
    clock_state: ClockState,
    internal_ticks_since_external_edge: u32,
    sample_hold: [f32; 3],
    aux_gate_active: bool,
}

impl Default for StepScheduler {
    fn default() -> Self {
        Self {
            step_index: 0,
            clock_state: ClockState::Idle,
            internal_ticks_since_external_edge: CLOCK_LOSS_INTERNAL_PERIODS,
            sample_hold: [0.0; 3],
            aux_gate_active: false,
        }
    }
}

impl StepScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn step_index(&self) -> usize {
        self.step_index
    }

    #[must_use]
    pub fn clock_state(&self) -> ClockState {
        self.clock_state
    }

    #[must_use]
    pub fn current_velocity(&self, voice: Voice) -> f32 {
        self.sample_hold[voice_index(voice)]
    }

    #[must_use]
    pub fn aux_gate_active(&self) -> bool {
        self.aux_gate_active
    }

    pub fn set_aux_gate(&mut self, active: bool) {
        self.aux_gate_active = active;
    }

    /// Rising-edge reset: `stepIndex = 0`, pattern is not regenerated.
    pub fn reset(&mut self) {
        self.step_index = 0;
    }

    /// Records an external clock edge: advances the step and marks the
    /// clock as externally slaved.
    pub fn on_external_edge(&mut self, bar: &BarState, swing_knob: f32) -> ArrayVec<Event, 3> {
        self.internal_ticks_since_external_edge = 0;
        self.clock_state = ClockState::Slaved;
        self.advance(bar, swing_knob)
    }

    /// Records an internal tempo tick. If no external edge has arrived
    /// within `CLOCK_LOSS_INTERNAL_PERIODS` internal periods, the internal
    /// clock drives and this call advances the step; otherwise it is a
    /// no-op (an external-driven bar is still waiting on its own edges).
    pub fn on_internal_tick(&mut self, bar: &BarState, swing_knob: f32) -> ArrayVec<Event, 3> {
        if self.clock_state == ClockState::Slaved {
            self.internal_ticks_since_external_edge += 1;
            if self.internal_ticks_since_external_edge <= CLOCK_LOSS_INTERNAL_PERIODS {
                return ArrayVec::new();
            }
            self.clock_state = ClockState::Idle;
        }
        self.advance(bar, swing_knob)
    }

    fn advance(&mut self, bar: &BarState, swing_knob: f32) -> ArrayVec<Event, 3> {
        self.step_index = (self.step_index + 1) % STEPS;
        self.emit(bar, swing_knob)
    }

    fn emit(&mut self, bar: &BarState, swing_knob: f32) -> ArrayVec<Event, 3> {
        let mut events = ArrayVec::new();
        let step = self.step_index;
        let off_beat = step % 2 == 1;
        let base_delay = if off_beat { remap_swing(swing_knob) - SWING_MIN } else { 0.0 };

        if bar.anchor_mask & (1 << step) != 0 {
            let velocity = bar.anchor_velocity[step];
            self.sample_hold[voice_index(Voice::Anchor)] = velocity;
            events.push(Event { voice: Voice::Anchor, velocity, delay_fraction: base_delay * ANCHOR_SWING_SCALE });
        }
        if bar.shimmer_mask & (1 << step) != 0 {
            let velocity = bar.shimmer_velocity[step];
            self.sample_hold[voice_index(Voice::Shimmer)] = velocity;
            events.push(Event { voice: Voice::Shimmer, velocity, delay_fraction: base_delay });
        }
        if let Some(hit) = bar.hat_burst.hits.iter().find(|h| h.step as usize == step) {
            self.sample_hold[voice_index(Voice::Aux)] = hit.velocity;
            events.push(Event { voice: Voice::Aux, velocity: hit.velocity, delay_fraction: base_delay });
        }
        events
    }
}

fn voice_index(voice: Voice) -> usize {
    match voice {
        Voice::Anchor => 0,
        Voice::Shimmer => 1,
        Voice::Aux => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_zeroes_step_index_without_touching_bar_state() {
        let mut sched = StepScheduler::new();
        let bar = BarState::default();
        sched.on_internal_tick(&bar, 0.0);
        sched.on_internal_tick(&bar, 0.0);
        sched.reset();
        assert_eq!(sched.step_index(), 0);
    }

    #[test]
    fn on_beat_steps_have_zero_delay() {
        let mut sched = StepScheduler::new();
        let mut bar = BarState::default();
        bar.anchor_mask = 1 << 2; // even step, on-beat
        bar.anchor_velocity[2] = 0.9;
        for _ in 0..2 {
            sched.on_internal_tick(&bar, 0.68);
        }
        let events = sched.on_internal_tick(&bar, 0.68);
        assert!(events.is_empty() || events.iter().all(|e| e.delay_fraction == 0.0));
    }

    #[test]
    fn off_beat_anchor_swing_scaled_down() {
        let mut sched = StepScheduler::new();
        let mut bar = BarState::default();
        bar.anchor_mask = 1 << 1;
        bar.anchor_velocity[1] = 0.8;
        bar.shimmer_mask = 1 << 1;
        bar.shimmer_velocity[1] = 0.6;
        let events = sched.on_internal_tick(&bar, 1.0);
        let anchor = events.iter().find(|e| e.voice == Voice::Anchor).unwrap();
        let shimmer = events.iter().find(|e| e.voice == Voice::Shimmer).unwrap();
        assert!(anchor.delay_fraction < shimmer.delay_fraction);
    }

    #[test]
    fn external_edge_marks_slaved_then_times_out_to_idle() {
        let mut sched = StepScheduler::new();
        let bar = BarState::default();
        sched.on_external_edge(&bar, 0.0);
        assert_eq!(sched.clock_state(), ClockState::Slaved);
        for _ in 0..(CLOCK_LOSS_INTERNAL_PERIODS + 1) {
            sched.on_internal_tick(&bar, 0.0);
        }
        assert_eq!(sched.clock_state(), ClockState::Idle);
    }

    #[test]
    fn sample_and_hold_persists_until_next_hit() {
        let mut sched = StepScheduler::new();
        let mut bar = BarState::default();
        bar.anchor_mask = 1;
        bar.anchor_velocity[0] = 0.77;
        // Advance through the whole bar back to step 0.
        for _ in 0..STEPS {
            sched.on_internal_tick(&bar, 0.0);
        }
        assert_eq!(sched.current_velocity(Voice::Anchor), 0.77);
    }
}
