//! Typed precondition-violation errors. These are never part of the
//! core's runtime contract — the pipeline itself has no recoverable error
//! kind, every numeric input is clamped at the boundary. This enum exists
//! only so `debug_assert!`-style checks have a consistent, `Display`-able
//! message; it is compiled into nothing in release builds.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error("budget {budget} exceeds pattern length {steps}")]
    BudgetExceedsSteps { budget: u32, steps: usize },

    #[error("weight vector length {got} does not match pattern length {expected}")]
    WeightLengthMismatch { got: usize, expected: usize },

    #[error("hat burst overflow: attempted to place entry {attempted} beyond capacity {capacity}")]
    HatBurstOverflow { attempted: usize, capacity: usize },

    #[error("anchor and shimmer masks overlap at bit(s) {overlap:#x}")]
    MaskOverlap { overlap: u32 },
}

/// Panics in debug builds if `budget` can't fit in `steps` slots; no-op in
/// release (the contract is "clamp and continue").
#[inline]
pub fn debug_check_budget(budget: u32, steps: usize) {
    if cfg!(debug_assertions) && budget as usize > steps {
        panic!("{}", PipelineError::BudgetExceedsSteps { budget, steps });
    }
}

/// Panics in debug builds if the two masks overlap.
#[inline]
pub fn debug_check_disjoint(anchor: u32, shimmer: u32) {
    let overlap = anchor & shimmer;
    if cfg!(debug_assertions) && overlap != 0 {
        panic!("{}", PipelineError::MaskOverlap { overlap });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages_are_stable() {
        let e = PipelineError::BudgetExceedsSteps { budget: 40, steps: 32 };
        assert_eq!(e.to_string(), "budget 40 exceeds pattern length 32");
    }

    #[test]
    #[should_panic(expected = "exceeds pattern length")]
    fn debug_check_budget_panics_when_exceeded() {
        debug_check_budget(100, 32);
    }

    #[test]
    fn debug_check_disjoint_passes_when_clean() {
        debug_check_disjoint(0b1010, 0b0101);
    }
}
