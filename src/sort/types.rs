//! Core types shared by the sort engine, decision channel and run loop.

use std::cmp::Ordering;

use serde::Serialize;

use crate::record::RankedRecord;

/// Signed outcome of comparing an ordered pair (A, B).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// A ranks before B.
    Less,
    /// A and B are indistinguishable.
    Equal,
    /// B ranks before A.
    Greater,
}

impl Decision {
    pub fn signum(self) -> i8 {
        match self {
            Decision::Less => -1,
            Decision::Equal => 0,
            Decision::Greater => 1,
        }
    }

    /// True when the merge should take the left head.
    pub fn keeps_left(self) -> bool {
        matches!(self, Decision::Less | Decision::Equal)
    }
}

impl From<Ordering> for Decision {
    fn from(ordering: Ordering) -> Self {
        match ordering {
            Ordering::Less => Decision::Less,
            Ordering::Equal => Decision::Equal,
            Ordering::Greater => Decision::Greater,
        }
    }
}

/// Which card of a choice the mob picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn decision(self) -> Decision {
        match self {
            Side::Left => Decision::Less,
            Side::Right => Decision::Greater,
        }
    }
}

/// Per-sort mutable context.
///
/// `decisions_made` only moves forward, one step per resolved decision.
#[derive(Debug, Clone, PartialEq)]
pub struct SortSession {
    decisions_made: u64,
    decisions_estimated: f64,
}

impl SortSession {
    pub fn new(decisions_estimated: f64) -> Self {
        Self {
            decisions_made: 0,
            decisions_estimated,
        }
    }

    pub fn decisions_made(&self) -> u64 {
        self.decisions_made
    }

    pub fn decisions_estimated(&self) -> f64 {
        self.decisions_estimated
    }

    /// Count one resolved decision and return the new total.
    pub fn record_decision(&mut self) -> u64 {
        self.decisions_made = self.decisions_made.saturating_add(1);
        self.decisions_made
    }
}

/// Metadata for a completed sort.
#[derive(Debug, Clone, Serialize)]
pub struct SortMeta {
    /// Number of input records.
    pub record_count: usize,
    /// Decisions resolved by the mob.
    pub decisions_made: u64,
    /// Natural-log estimate shown to the mob while sorting.
    pub decisions_estimated: f64,
    /// Exact merge-sort worst case for this input size.
    pub worst_case_decisions: u64,
    /// Elapsed wall time.
    pub latency_ms: u128,
}

/// Ranked records plus run metadata.
#[derive(Debug, Clone, Serialize)]
pub struct SortResponse {
    pub ranked: Vec<RankedRecord>,
    pub meta: SortMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_from_ordering() {
        assert_eq!(Decision::from(1.cmp(&2)), Decision::Less);
        assert_eq!(Decision::from(2.cmp(&2)), Decision::Equal);
        assert_eq!(Decision::from(3.cmp(&2)), Decision::Greater);
        assert_eq!(Decision::Greater.signum(), 1);
    }

    #[test]
    fn ties_keep_left() {
        assert!(Decision::Less.keeps_left());
        assert!(Decision::Equal.keeps_left());
        assert!(!Decision::Greater.keeps_left());
    }

    #[test]
    fn session_counts_one_per_decision() {
        let mut session = SortSession::new(5.5);
        assert_eq!(session.decisions_made(), 0);
        assert_eq!(session.record_decision(), 1);
        assert_eq!(session.record_decision(), 2);
        assert!((session.decisions_estimated() - 5.5).abs() < 1e-12);
    }
}
