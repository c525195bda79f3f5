//! `Engine`: owns all session- and bar-scope state and orchestrates the
//! full generation pipeline. Publication of bar-scope state from
//! the control context to the audio/step context goes through a
//! `triple_buffer` double-buffer + generation-counter swap; no locks
//! anywhere in the crate.

use arrayvec::ArrayVec;

use crate::axis;
use crate::bar::{BarState, HatBurst};
use crate::budget;
use crate::complement;
use crate::control::{AuxMode, ControlSnapshot, SeedState, StepSeeds};
use crate::error::{debug_check_budget, debug_check_disjoint};
use crate::fill;
use crate::hash::hash_u32;
use crate::log_bridge;
use crate::scheduler::{ClockState, Event, StepScheduler, Voice};
use crate::tables;
use crate::topk;
use crate::tuning::{
    ANCHOR_DRIFT_SCALE, AXIS_CHANGE_REGEN_THRESHOLD, FILL_MIN_DURATION_STEPS,
    SHIMMER_DRIFT_SCALE, STEPS,
};
use crate::velocity;
use crate::weight;

/// Tracks the transient fill ramp. `armed` mirrors the `fillArmed` boolean;
/// `progress` is the per-step-advanced `fillProgress` ramp — a
/// timing quantity, so it is advanced from the step context even though
/// `fillArmed` itself stays control-context-owned.
#[derive(Clone, Copy, Debug, Default)]
struct FillRuntime {
    armed: bool,
    progress: f32,
    start_step_in_bar: u16,
    duration: u16,
}

/// Precomputed, session-lifetime tables: the three character
/// profiles, the standalone metric-weight table, and the stability table.
struct Tables {
    stable: [f32; STEPS],
    syncopated: [f32; STEPS],
    wild: [f32; STEPS],
    metric_weight: [f32; STEPS],
    stability: [f32; STEPS],
}

impl Tables {
    fn build() -> Self {
        Self {
            stable: tables::stable_profile(),
            syncopated: tables::syncopated_profile(),
            wild: tables::wild_profile(),
            metric_weight: tables::metric_weight(),
            stability: tables::stability(),
        }
    }
}

pub struct Engine {
    tables: Tables,
    controls: ControlSnapshot,
    seeds: SeedState,
    pending_reseed: Option<u32>,
    bar_counter: u64,
    last_regen_axis: (f32, f32),
    mid_bar_regen_pending: bool,
    fill: FillRuntime,
    scheduler: StepScheduler,
    bar_input: triple_buffer::Input<BarState>,
    bar_output: triple_buffer::Output<BarState>,
}

impl Engine {
    #[must_use]
    pub fn new(pattern_seed: u32, aux_mode: AuxMode) -> Self {
        let (bar_input, bar_output) = triple_buffer::triple_buffer(&BarState::default());
        let mut controls = ControlSnapshot::default();
        controls.aux_mode = aux_mode;
        let seeds = SeedState::new(pattern_seed);
        let mut engine = Self {
            tables: Tables::build(),
            last_regen_axis: (controls.axis_x, controls.axis_y),
            controls,
            seeds,
            pending_reseed: None,
            bar_counter: 0,
            mid_bar_regen_pending: false,
            fill: FillRuntime::default(),
            scheduler: StepScheduler::new(),
            bar_input,
            bar_output,
        };
        engine.regenerate_bar();
        engine
    }

    // ---------------------------------------------------------------
    // Control context
    // ---------------------------------------------------------------

    /// Applies a freshly-polled control snapshot. Flags a mid-bar
    /// regeneration if AXIS X or AXIS Y moved by more than 10% since the
    /// last regeneration; the actual regeneration happens at the
    /// next beat boundary, driven from the step context.
    pub fn update_controls(&mut self, new_controls: ControlSnapshot) {
        let new_controls = new_controls.clamped();
        let dx = (new_controls.axis_x - self.last_regen_axis.0).abs();
        let dy = (new_controls.axis_y - self.last_regen_axis.1).abs();
        if dx > AXIS_CHANGE_REGEN_THRESHOLD || dy > AXIS_CHANGE_REGEN_THRESHOLD {
            self.mid_bar_regen_pending = true;
            log_bridge::mid_bar_regeneration_armed(dx.max(dy));
        }
        self.controls = new_controls;
    }

    pub fn set_aux_mode(&mut self, mode: AuxMode) {
        self.controls.aux_mode = mode;
    }

    /// Rising edge of the `fillArmed` collaborator input.
    pub fn arm_fill(&mut self) {
        self.controls.fill_armed = true;
        self.fill.armed = true;
        self.fill.progress = 0.0;
        self.fill.start_step_in_bar = self.scheduler.step_index() as u16;
        self.fill.duration = (STEPS / 4).max(FILL_MIN_DURATION_STEPS) as u16;
    }

    /// Requests a reseed to `new_seed`. Deferred until any active fill
    /// completes, so a fill climax is never replaced mid-phrase.
    pub fn request_reseed(&mut self, new_seed: u32) {
        if self.fill.armed {
            self.pending_reseed = Some(new_seed);
            log_bridge::reseed_deferred(new_seed);
        } else {
            self.seeds = SeedState::new(new_seed);
        }
    }

    /// Rising edge of the reset input: re-phases without regenerating.
    pub fn reset(&mut self) {
        self.scheduler.reset();
    }

    /// Applies `new_controls` and regenerates immediately, bypassing the
    /// beat-boundary gating `update_controls` otherwise applies. Intended
    /// for bench/test callers that need a deterministic bar for a given
    /// knob set without stepping the clock first.
    pub fn configure(&mut self, new_controls: ControlSnapshot) {
        self.controls = new_controls.clamped();
        self.regenerate_bar();
    }

    /// Polls the published bar state and returns a copy. Safe to call from
    /// either context; the audio/step path already does this once per tick
    /// internally.
    #[must_use]
    pub fn bar_state(&mut self) -> BarState {
        self.bar_output.update();
        self.bar_output.read().clone()
    }

    /// Runs the full generation pipeline and publishes the result.
    /// Called once per bar boundary from the control context, and also
    /// (re-running with the same `bar_counter`) for mid-bar axis-driven
    /// regeneration at a beat boundary.
    fn regenerate_bar(&mut self) {
        let c = self.controls;

        let anchor_effective_drift = (c.drift * ANCHOR_DRIFT_SCALE).clamp(0.0, 1.0);
        let shimmer_effective_drift = (c.drift * SHIMMER_DRIFT_SCALE).clamp(0.0, 1.0);
        let anchor_seeds = self.seeds.step_seeds(&self.tables.stability, anchor_effective_drift);
        let shimmer_seeds = self.seeds.step_seeds(&self.tables.stability, shimmer_effective_drift);

        // Shimmer reuses the anchor's axis-biased weight vector rather than
        // deriving its own table: the complement placer already scores
        // candidate positions with it for the weighted-best/seed-varied
        // strategies, and a second independently-derived table never
        // produced an audibly different result worth the extra tables.
        let mut weights = weight::blend(&self.tables.stable, &self.tables.syncopated, &self.tables.wild, c.shape, &anchor_seeds);
        axis::apply(&mut weights, &self.tables.metric_weight, c.axis_x, c.axis_y, c.shape, &anchor_seeds);

        let (mut anchor_budget, mut shimmer_budget) = budget::solve(c.energy, c.shape);

        if self.fill.armed {
            let mult = fill::density_multiplier(c.energy, self.fill.progress);
            anchor_budget = fill::inflate_budget(anchor_budget, mult);
            shimmer_budget = fill::inflate_budget(shimmer_budget, mult);
            fill::expand_eligibility(&mut weights, self.fill.progress);
        }

        debug_check_budget(anchor_budget, STEPS);
        debug_check_budget(shimmer_budget, STEPS);
        if anchor_budget == 0 {
            log_bridge::degenerate_budget("anchor", anchor_budget);
        }

        let anchor_mask = topk::sample(&weights, anchor_budget as usize, &anchor_seeds);
        let shimmer_mask = complement::place(anchor_mask, shimmer_budget as usize, &weights, c.drift, &shimmer_seeds);
        debug_check_disjoint(anchor_mask, shimmer_mask);

        let mut anchor_velocity = velocity::compute(anchor_mask, &self.tables.metric_weight, c.accent, &anchor_seeds);
        let mut shimmer_velocity = velocity::compute(shimmer_mask, &self.tables.metric_weight, c.accent, &shimmer_seeds);

        if self.fill.armed {
            apply_fill_velocity_modifiers(&mut anchor_velocity, anchor_mask, self.fill.progress, &anchor_seeds, 0);
            apply_fill_velocity_modifiers(&mut shimmer_velocity, shimmer_mask, self.fill.progress, &shimmer_seeds, 1);
        }

        let hat_burst = if self.fill.armed && c.aux_mode == AuxMode::HatBurst {
            let burst = fill::generate_hat_burst(
                self.fill.start_step_in_bar,
                self.fill.duration,
                c.shape,
                c.energy,
                self.seeds.phrase_seed,
                anchor_mask | shimmer_mask,
            );
            if burst.hits.is_empty() {
                log_bridge::hat_burst_could_not_place(self.fill.duration);
            }
            burst
        } else {
            HatBurst::empty()
        };

        let state = BarState {
            bar_counter: self.bar_counter,
            anchor_mask,
            anchor_velocity,
            shimmer_mask,
            shimmer_velocity,
            hat_burst,
        };
        self.bar_input.write(state);
        self.last_regen_axis = (c.axis_x, c.axis_y);
        self.mid_bar_regen_pending = false;
        log_bridge::bar_regenerated(self.bar_counter, self.seeds.pattern_seed, self.seeds.phrase_seed);

        // The climax bar itself is rendered with the fill's modifiers above;
        // only the regeneration *after* it returns to the unmodified pipeline.
        if self.fill.armed && self.fill.progress >= 1.0 {
            self.fill.armed = false;
            self.controls.fill_armed = false;
        }
        self.scheduler.set_aux_gate(self.fill.armed && self.controls.aux_mode == AuxMode::FillGate);
    }

    /// Advances to the next bar: derives a fresh `phraseSeed`, applies any
    /// deferred reseed, and re-runs the pipeline.
    fn start_next_bar(&mut self) {
        self.bar_counter += 1;
        if let Some(pending) = self.pending_reseed.take() {
            self.seeds = SeedState::new(pending);
        }
        self.seeds.derive_phrase_seed(self.bar_counter);
        self.regenerate_bar();
    }

    // ---------------------------------------------------------------
    // Audio / step context
    // ---------------------------------------------------------------

    /// Advances fill progress by one step's worth, and handles bar-wrap /
    /// beat-boundary regeneration bookkeeping. Called from both tick paths
    /// before the scheduler emits events for the new step.
    ///
    /// While a fill is active, every *beat* boundary (not just bar
    /// boundaries) re-runs the pipeline with the freshly-advanced
    /// `fillProgress`, so the escalation is audible across the fill window
    /// rather than snapping once at the next bar.
    fn advance_fill_and_regen(&mut self) {
        if self.fill.armed && self.fill.duration > 0 {
            self.fill.progress = (self.fill.progress + 1.0 / self.fill.duration as f32).min(1.0);
        }

        let next_index = (self.scheduler.step_index() + 1) % STEPS;
        if next_index == 0 {
            self.start_next_bar();
            return;
        }

        let beat_span = (STEPS / 4).max(1);
        if next_index % beat_span == 0 && (self.mid_bar_regen_pending || self.fill.armed) {
            self.regenerate_bar();
        }
    }

    /// One internal-tempo tick. Returns the events for the new step.
    pub fn tick_internal(&mut self) -> ArrayVec<Event, 3> {
        crate::rt_check::enter_step_context();
        self.advance_fill_and_regen();
        self.bar_output.update();
        let bar = self.bar_output.read().clone();
        let events = self.scheduler.on_internal_tick(&bar, self.controls.swing);
        crate::rt_check::exit_step_context();
        events
    }

    /// One external clock edge. Returns the events for the new step.
    pub fn tick_external(&mut self) -> ArrayVec<Event, 3> {
        crate::rt_check::enter_step_context();
        self.advance_fill_and_regen();
        self.bar_output.update();
        let bar = self.bar_output.read().clone();
        let events = self.scheduler.on_external_edge(&bar, self.controls.swing);
        crate::rt_check::exit_step_context();
        events
    }

    #[must_use]
    pub fn clock_state(&self) -> ClockState {
        self.scheduler.clock_state()
    }

    #[must_use]
    pub fn current_velocity(&self, voice: Voice) -> f32 {
        self.scheduler.current_velocity(voice)
    }

    /// `true` while `auxMode == FillGate` and a fill is active; the
    /// firmware publishes this continuously as the aux gate output.
    #[must_use]
    pub fn aux_gate_active(&self) -> bool {
        self.scheduler.aux_gate_active()
    }

    #[must_use]
    pub fn bar_counter(&self) -> u64 {
        self.bar_counter
    }

    #[must_use]
    pub fn fill_progress(&self) -> f32 {
        self.fill.progress
    }
}

/// Applies the fill's velocity floor boost and forced-ceiling accents to an
/// already-computed velocity array, in place. `voice_salt` keeps the
/// anchor and shimmer force-ceiling rolls independent of one another.
fn apply_fill_velocity_modifiers(velocity_arr: &mut [f32; STEPS], mask: u32, fill_progress: f32, seeds: &StepSeeds, voice_salt: u32) {
    for step in 0..STEPS {
        if mask & (1 << step) == 0 {
            continue;
        }
        let seed = hash_u32(seeds[step], 0x4000 + voice_salt);
        let force = fill::should_force_ceiling(fill_progress, seed, step);
        velocity_arr[step] = fill::apply_fill_velocity(velocity_arr[step], fill_progress, force);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controls(energy: f32, shape: f32, axis_x: f32, axis_y: f32, accent: f32, drift: f32) -> ControlSnapshot {
        ControlSnapshot {
            energy,
            shape,
            axis_x,
            axis_y,
            accent,
            drift,
            swing: 0.0,
            clock_div: 0.4,
            aux_mode: AuxMode::FillGate,
            fill_armed: false,
        }
    }

    #[test]
    fn stable_zone_budget_and_disjointness() {
        let mut engine = Engine::new(0xDEAD_BEEF, AuxMode::FillGate);
        engine.update_controls(controls(0.25, 0.0, 0.5, 0.5, 0.5, 0.0));
        engine.regenerate_bar();
        engine.bar_output.update();
        let bar = engine.bar_output.read();
        assert_eq!(bar.anchor_mask.count_ones(), 8);
        // Pure-stable SHAPE strongly favors the downbeat; it must always win.
        assert!(bar.anchor_mask & 1 != 0, "downbeat must be present in the stable zone");
        assert_eq!(bar.anchor_mask & bar.shimmer_mask, 0);
    }

    #[test]
    fn drift_zero_locks_bars() {
        let mut engine = Engine::new(1, AuxMode::FillGate);
        engine.update_controls(controls(0.5, 0.5, 0.5, 0.5, 0.5, 0.0));
        engine.regenerate_bar();
        engine.bar_output.update();
        let first = engine.bar_output.read().anchor_mask;
        for _ in 0..STEPS {
            engine.tick_internal();
        }
        engine.bar_output.update();
        let second = engine.bar_output.read().anchor_mask;
        assert_eq!(first, second);
    }

    #[test]
    fn fill_climax_forces_ceiling_velocity() {
        let mut engine = Engine::new(7, AuxMode::HatBurst);
        engine.update_controls(controls(0.6, 0.4, 0.5, 0.5, 0.5, 0.2));
        engine.arm_fill();
        engine.fill.progress = 0.95;
        engine.regenerate_bar();
        engine.bar_output.update();
        let bar = engine.bar_output.read();
        for step in 0..STEPS {
            if bar.anchor_mask & (1 << step) != 0 {
                assert_eq!(bar.anchor_velocity[step], 1.0);
            }
        }
    }

    #[test]
    fn mid_bar_axis_change_is_armed_and_cleared_on_regen() {
        let mut engine = Engine::new(3, AuxMode::FillGate);
        engine.update_controls(controls(0.5, 0.5, 0.9, 0.5, 0.5, 0.0));
        assert!(engine.mid_bar_regen_pending);
        engine.regenerate_bar();
        assert!(!engine.mid_bar_regen_pending);
    }
}
