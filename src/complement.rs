//! Complement placer: places the shimmer voice's hits strictly inside the
//! gaps left by the anchor mask, with placement strategy chosen by DRIFT.

use crate::bar::HitMask;
use crate::control::StepSeeds;
use crate::hash::hash_u32;
use crate::topk;
use crate::tuning::STEPS;

/// A run of consecutive unset bits in the anchor mask, treated circularly
/// (a tail gap and head gap combine into one wrap-around gap when both are
/// nonempty).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Gap {
    start: usize,
    len: usize,
}

impl Gap {
    fn position(&self, offset: usize) -> usize {
        (self.start + offset) % STEPS
    }
}

/// Finds every circular gap in `mask`. Returns an empty vec if the mask has
/// no zero bits (no room for shimmer); returns a single full-length gap if
/// the mask is entirely zero.
fn find_gaps(mask: HitMask) -> Vec<Gap> {
    if mask == 0 {
        return vec![Gap { start: 0, len: STEPS }];
    }
    if mask.count_ones() as usize == STEPS {
        return Vec::new();
    }

    let pivot = mask.trailing_zeros() as usize; // any set bit
    let mut gaps = Vec::new();
    let mut run_start: Option<usize> = None;

    for i in 0..STEPS {
        let pos = (pivot + 1 + i) % STEPS;
        let is_set = mask & (1 << pos) != 0;
        if is_set {
            if let Some(start) = run_start.take() {
                let len = (pos + STEPS - start) % STEPS;
                gaps.push(Gap { start, len });
            }
        } else if run_start.is_none() {
            run_start = Some(pos);
        }
    }
    debug_assert!(run_start.is_none(), "scan always closes on the pivot bit");
    gaps
}

/// Resolves each gap's integer share of `budget`, respecting each gap's
/// capacity and summing to `min(budget, totalGapLength)`.
fn gap_shares(gaps: &[Gap], budget: usize) -> Vec<usize> {
    let total_len: usize = gaps.iter().map(|g| g.len).sum();
    if total_len == 0 || budget == 0 {
        return vec![0; gaps.len()];
    }
    let effective_budget = budget.min(total_len);

    let mut shares: Vec<usize> = gaps
        .iter()
        .map(|g| {
            let raw = effective_budget as f32 * g.len as f32 / total_len as f32;
            (raw.round().max(1.0) as usize).min(g.len)
        })
        .collect();

    let mut order: Vec<usize> = (0..gaps.len()).collect();
    order.sort_by_key(|&i| std::cmp::Reverse(gaps[i].len));

    let mut sum: usize = shares.iter().sum();
    // Floors can overshoot the budget when many small gaps each claim >= 1;
    // trim from the shortest gaps first.
    let mut shrink_order = order.clone();
    shrink_order.reverse();
    let mut si = 0;
    while sum > effective_budget && si < shrink_order.len() {
        let idx = shrink_order[si];
        if shares[idx] > 0 {
            shares[idx] -= 1;
            sum -= 1;
        } else {
            si += 1;
        }
        if si >= shrink_order.len() && sum > effective_budget {
            si = 0;
        }
        if shrink_order.iter().all(|&i| shares[i] == 0) {
            break;
        }
    }

    // Undershoot: grant the residual to the longest gaps first, up to
    // their capacity.
    let mut gi = 0;
    while sum < effective_budget && !order.is_empty() {
        let idx = order[gi % order.len()];
        if shares[idx] < gaps[idx].len {
            shares[idx] += 1;
            sum += 1;
        }
        gi += 1;
        if gi > order.len() * (total_len + 1) {
            break; // capacity exhausted everywhere; effective_budget was already capped
        }
    }

    shares
}

fn round_half_away_from_zero(x: f32) -> i64 {
    if x >= 0.0 {
        (x + 0.5).floor() as i64
    } else {
        (x - 0.5).ceil() as i64
    }
}

/// Placement strategy selected by DRIFT.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Strategy {
    Even,
    WeightedBest,
    SeedVaried,
}

fn strategy_for(drift: f32) -> Strategy {
    if drift < 0.30 {
        Strategy::Even
    } else if drift < 0.70 {
        Strategy::WeightedBest
    } else {
        Strategy::SeedVaried
    }
}

/// Places `budget` shimmer hits into the gaps of `anchor_mask`, disjoint
/// from it by construction. `weights` scores candidate positions for the
/// weighted-best and seed-varied strategies.
#[must_use]
pub fn place(anchor_mask: HitMask, budget: usize, weights: &[f32; STEPS], drift: f32, seeds: &StepSeeds) -> HitMask {
    let gaps = find_gaps(anchor_mask);
    if gaps.is_empty() {
        return 0;
    }
    let shares = gap_shares(&gaps, budget);
    let strategy = strategy_for(drift);

    let mut mask: HitMask = 0;
    for (gap_idx, (gap, &share)) in gaps.iter().zip(shares.iter()).enumerate() {
        if share == 0 {
            continue;
        }
        match strategy {
            Strategy::Even => place_even(gap, share, &mut mask),
            Strategy::WeightedBest => place_weighted_best(gap, share, weights, &mut mask),
            Strategy::SeedVaried => place_seed_varied(gap, share, weights, seeds, gap_idx, &mut mask),
        }
    }

    debug_assert_eq!(mask & anchor_mask, 0, "complement placement collided with anchor mask");
    mask
}

fn place_even(gap: &Gap, share: usize, mask: &mut HitMask) {
    for j in 0..share {
        let offset = round_half_away_from_zero((j as f32 + 0.5) * gap.len as f32 / share as f32);
        let offset = (offset.max(0) as usize).min(gap.len.saturating_sub(1));
        *mask |= 1 << gap.position(offset);
    }
}

fn place_weighted_best(gap: &Gap, share: usize, weights: &[f32; STEPS], mask: &mut HitMask) {
    let mut candidates: Vec<(f32, usize)> = (0..gap.len)
        .map(|offset| {
            let pos = gap.position(offset);
            (weights[pos], pos)
        })
        .collect();
    candidates.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap().then(a.1.cmp(&b.1)));
    for &(_, pos) in candidates.iter().take(share) {
        *mask |= 1 << pos;
    }
}

fn place_seed_varied(gap: &Gap, share: usize, weights: &[f32; STEPS], seeds: &StepSeeds, gap_idx: usize, mask: &mut HitMask) {
    let mut gap_weights = [0.0f32; STEPS];
    let mut gap_seeds = [0u32; STEPS];
    for offset in 0..gap.len {
        let pos = gap.position(offset);
        gap_weights[pos] = weights[pos];
        gap_seeds[pos] = hash_u32(seeds[pos], 0x9000 + gap_idx as u32);
    }
    let result = topk::sample(&gap_weights, share, &StepSeeds(gap_seeds));
    *mask |= result;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_seeds(seed: u32) -> StepSeeds {
        StepSeeds([seed; STEPS])
    }

    #[test]
    fn disjoint_from_anchor_even() {
        let anchor: HitMask = 0b0001_0001_0001_0001_0001_0001_0001_0001; // every 4th step
        let w = [0.5; STEPS];
        for &drift in &[0.1, 0.5, 0.9] {
            let shimmer = place(anchor, 8, &w, drift, &flat_seeds(3));
            assert_eq!(anchor & shimmer, 0);
        }
    }

    #[test]
    fn full_anchor_mask_yields_no_shimmer() {
        let anchor: HitMask = u32::MAX;
        let w = [0.5; STEPS];
        let shimmer = place(anchor, 4, &w, 0.1, &flat_seeds(1));
        assert_eq!(shimmer, 0);
    }

    #[test]
    fn empty_anchor_mask_places_in_one_big_gap() {
        let w = [0.5; STEPS];
        let shimmer = place(0, 5, &w, 0.1, &flat_seeds(1));
        assert_eq!(shimmer.count_ones(), 5);
    }

    #[test]
    fn budget_capped_by_gap_length() {
        // Anchor occupies every other step, leaving 16 single-step gaps.
        let anchor: HitMask = 0x5555_5555 & ((1u32 << STEPS) - 1);
        let w = [0.5; STEPS];
        let shimmer = place(anchor, 100, &w, 0.1, &flat_seeds(1));
        let gaps = find_gaps(anchor);
        let total_gap: usize = gaps.iter().map(|g| g.len).sum();
        assert_eq!(shimmer.count_ones() as usize, total_gap);
        assert_eq!(anchor & shimmer, 0);
    }

    #[test]
    fn weighted_best_picks_highest_weight_positions() {
        let anchor: HitMask = 1; // only step 0 occupied, one big gap of 31
        let mut w = [0.1; STEPS];
        w[5] = 0.99;
        w[10] = 0.95;
        let shimmer = place(anchor, 2, &w, 0.5, &flat_seeds(1));
        assert_eq!(shimmer, (1 << 5) | (1 << 10));
    }
}
