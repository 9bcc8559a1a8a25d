//! Decision-count estimates and progress reporting.
//!
//! The estimate shown to the mob is `n · ln(n)`. It uses the natural log on
//! purpose and can undercount the true merge-sort worst case, so the
//! reported fraction may run past 1.0 near the end of a sort. It is a visual
//! hint, never a ceiling.

use serde::Serialize;

/// Estimated total decisions for `n` records.
pub fn estimate_decisions(n: usize) -> f64 {
    if n <= 1 {
        return 0.0;
    }
    let n = n as f64;
    n * n.ln()
}

/// `made / estimate`, unclamped.
pub fn progress_fraction(made: u64, estimate: f64) -> f64 {
    if estimate <= 0.0 || !estimate.is_finite() {
        return 0.0;
    }
    made as f64 / estimate
}

/// Lower bound on decisions for any comparison sort that confirms an order: `n − 1`.
pub fn best_case_decisions(n: usize) -> u64 {
    n.saturating_sub(1) as u64
}

/// Decisions the top-down merge sort makes on an already-ordered input.
///
/// Every merge then drains its left half first, costing `⌊n/2⌋` per level.
/// This is the fewest the engine ever requests for `n` records.
pub fn presorted_decisions(n: usize) -> u64 {
    if n <= 1 {
        return 0;
    }
    let half = n / 2;
    presorted_decisions(half) + presorted_decisions(n - half) + half as u64
}

/// Exact top-down merge-sort worst case: `n·⌈log2 n⌉ − 2^⌈log2 n⌉ + 1`.
pub fn worst_case_decisions(n: usize) -> u64 {
    if n <= 1 {
        return 0;
    }
    let n = n as u64;
    let ceil_log2 = u64::from(64 - (n - 1).leading_zeros());
    n * ceil_log2 - (1u64 << ceil_log2) + 1
}

/// Progress snapshot handed to presenters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Progress {
    pub made: u64,
    pub estimated: f64,
}

impl Progress {
    pub fn new(made: u64, estimated: f64) -> Self {
        Self { made, estimated }
    }

    pub fn fraction(&self) -> f64 {
        progress_fraction(self.made, self.estimated)
    }

    /// Whole percent; may exceed 100.
    pub fn percent(&self) -> u64 {
        (self.fraction() * 100.0).round() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_uses_natural_log() {
        assert_eq!(estimate_decisions(0), 0.0);
        assert_eq!(estimate_decisions(1), 0.0);
        let four = estimate_decisions(4);
        assert!((four - 4.0 * 4f64.ln()).abs() < 1e-12);
        // ln undercounts log2
        assert!(four < 8.0);
    }

    #[test]
    fn fraction_is_not_clamped() {
        let estimate = estimate_decisions(2);
        assert!(progress_fraction(2, estimate) > 1.0);
        assert_eq!(progress_fraction(3, 0.0), 0.0);
    }

    #[test]
    fn worst_case_matches_known_values() {
        let expected = [(0, 0), (1, 0), (2, 1), (3, 3), (4, 5), (5, 8), (8, 17), (10, 25)];
        for (n, worst) in expected {
            assert_eq!(worst_case_decisions(n), worst, "n={n}");
        }
    }

    #[test]
    fn best_case_is_n_minus_one() {
        assert_eq!(best_case_decisions(0), 0);
        assert_eq!(best_case_decisions(1), 0);
        assert_eq!(best_case_decisions(7), 6);
    }

    #[test]
    fn presorted_sits_between_bounds() {
        assert_eq!(presorted_decisions(4), 4);
        assert_eq!(presorted_decisions(16), 32);
        for n in 0..64 {
            assert!(best_case_decisions(n) <= presorted_decisions(n));
            assert!(presorted_decisions(n) <= worst_case_decisions(n));
        }
    }

    #[test]
    fn progress_percent_can_overshoot() {
        let p = Progress::new(9, 6.0);
        assert_eq!(p.percent(), 150);
    }
}
