//! Thin wrapper around the `log` facade for control-context decisions:
//! bar/mid-bar regeneration, deferred reseed, degenerate-input cases. The
//! audio/step path never calls this — the formatting machinery behind
//! `log::debug!`/`log::trace!` can allocate, which is forbidden there.

pub fn bar_regenerated(bar_counter: u64, pattern_seed: u32, phrase_seed: u32) {
    log::debug!("bar {bar_counter} regenerated (pattern_seed={pattern_seed:#x}, phrase_seed={phrase_seed:#x})");
}

pub fn mid_bar_regeneration_armed(axis_delta: f32) {
    log::trace!("axis delta {axis_delta:.3} exceeded threshold; regeneration armed for next beat boundary");
}

pub fn reseed_deferred(requested_seed: u32) {
    log::debug!("reseed to {requested_seed:#x} deferred until current fill completes");
}

pub fn degenerate_budget(voice: &str, budget: u32) {
    log::trace!("{voice} budget resolved to {budget}; mask will be empty this bar");
}

pub fn hat_burst_could_not_place(fill_duration: u16) {
    log::warn!("hat burst generation produced no hits for fill_duration={fill_duration}");
}
