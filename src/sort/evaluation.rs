//! Synthetic evaluation of the sort against a simulated, truthful mob.
//!
//! Each case hides a score per record and lets an [`AutoPresenter`] answer
//! from it. The report checks order, rank contiguity and the decision-count
//! bounds, and shows how far the `n · ln(n)` estimate over- or undershoots.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;

use crate::record::{Attribute, Record};

use super::presenter::AutoPresenter;
use super::progress::{best_case_decisions, presorted_decisions, worst_case_decisions};
use super::run::{run_sort_with_trace, SortError};
use super::types::Side;

const SCORE_ATTRIBUTE: &str = "hidden_score";

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputShape {
    Sorted,
    Reversed,
    Shuffled,
    AllTied,
}

#[derive(Debug, Clone)]
pub struct SyntheticCase {
    pub name: &'static str,
    pub n: usize,
    pub shape: InputShape,
    pub seed: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationResult {
    pub case_name: String,
    pub n: usize,
    pub decisions_made: u64,
    pub decisions_estimated: f64,
    /// `n − 1` lower bound.
    pub best_case: u64,
    /// What the engine spends on an already-ordered input.
    pub presorted: u64,
    pub worst_case: u64,
    /// Decisions ran past the displayed estimate.
    pub overshoot: bool,
    pub within_bounds: bool,
    pub ordered_correctly: bool,
    pub ranks_contiguous: bool,
}

pub fn synthetic_cases() -> Vec<SyntheticCase> {
    vec![
        SyntheticCase {
            name: "empty",
            n: 0,
            shape: InputShape::Sorted,
            seed: 0,
        },
        SyntheticCase {
            name: "singleton",
            n: 1,
            shape: InputShape::Sorted,
            seed: 0,
        },
        SyntheticCase {
            name: "sorted_16",
            n: 16,
            shape: InputShape::Sorted,
            seed: 0,
        },
        SyntheticCase {
            name: "reversed_16",
            n: 16,
            shape: InputShape::Reversed,
            seed: 0,
        },
        SyntheticCase {
            name: "shuffled_10",
            n: 10,
            shape: InputShape::Shuffled,
            seed: 42,
        },
        SyntheticCase {
            name: "shuffled_50",
            n: 50,
            shape: InputShape::Shuffled,
            seed: 43,
        },
        SyntheticCase {
            name: "shuffled_200",
            n: 200,
            shape: InputShape::Shuffled,
            seed: 44,
        },
        SyntheticCase {
            name: "all_tied_12",
            n: 12,
            shape: InputShape::AllTied,
            seed: 0,
        },
    ]
}

pub async fn run_synthetic_suite(
    filter: Option<&str>,
) -> Result<Vec<EvaluationResult>, SortError> {
    let mut results = Vec::new();
    for case in synthetic_cases() {
        if let Some(name) = filter {
            if case.name != name {
                continue;
            }
        }
        results.push(run_synthetic_case(&case).await?);
    }
    Ok(results)
}

pub async fn run_synthetic_case(case: &SyntheticCase) -> Result<EvaluationResult, SortError> {
    let input = build_input(case);

    // Stable reference order: by hidden score, ties in input order.
    let mut expected: Vec<String> = Vec::with_capacity(input.len());
    let mut keyed: Vec<(i64, String)> = input
        .iter()
        .map(|r| (hidden_score(r), r.subject().display_value()))
        .collect();
    keyed.sort_by_key(|(score, _)| *score);
    expected.extend(keyed.into_iter().map(|(_, subject)| subject));

    let presenter = AutoPresenter::new(|left: &Record, right: &Record| {
        if hidden_score(right) < hidden_score(left) {
            Side::Right
        } else {
            Side::Left
        }
    });
    let resp = run_sort_with_trace(input, &presenter, None, None).await?;

    let actual: Vec<String> = resp
        .ranked
        .iter()
        .map(|r| r.record.subject().display_value())
        .collect();
    let ranks_contiguous = resp
        .ranked
        .iter()
        .enumerate()
        .all(|(idx, r)| r.rank == idx + 1);

    let best_case = best_case_decisions(case.n);
    let worst_case = worst_case_decisions(case.n);
    let made = resp.meta.decisions_made;

    Ok(EvaluationResult {
        case_name: case.name.to_string(),
        n: case.n,
        decisions_made: made,
        decisions_estimated: resp.meta.decisions_estimated,
        best_case,
        presorted: presorted_decisions(case.n),
        worst_case,
        overshoot: made as f64 > resp.meta.decisions_estimated,
        within_bounds: (best_case..=worst_case).contains(&made),
        ordered_correctly: actual == expected,
        ranks_contiguous,
    })
}

fn build_input(case: &SyntheticCase) -> Vec<Record> {
    let mut scores: Vec<i64> = match case.shape {
        InputShape::AllTied => vec![0; case.n],
        _ => (0..case.n as i64).collect(),
    };
    match case.shape {
        InputShape::Reversed => scores.reverse(),
        InputShape::Shuffled => {
            let mut rng = StdRng::seed_from_u64(case.seed);
            scores.shuffle(&mut rng);
        }
        InputShape::Sorted | InputShape::AllTied => {}
    }

    scores
        .into_iter()
        .enumerate()
        .map(|(position, score)| {
            Record::new(
                Attribute::new("item", format!("item-{position}")),
                vec![Attribute::new(SCORE_ATTRIBUTE, score)],
            )
        })
        .collect()
}

fn hidden_score(record: &Record) -> i64 {
    record
        .get(SCORE_ATTRIBUTE)
        .and_then(|v| v.as_i64())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn suite_orders_every_case_within_bounds() {
        let results = run_synthetic_suite(None).await.unwrap();
        assert_eq!(results.len(), synthetic_cases().len());
        for r in &results {
            assert!(r.ordered_correctly, "{} misordered", r.case_name);
            assert!(r.ranks_contiguous, "{} ranks broken", r.case_name);
            assert!(
                r.within_bounds,
                "{} out of bounds: {}",
                r.case_name,
                r.decisions_made
            );
            assert!(r.decisions_made >= r.presorted, "{}", r.case_name);
        }
    }

    #[tokio::test]
    async fn sorted_input_costs_the_presorted_minimum() {
        let results = run_synthetic_suite(Some("sorted_16")).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].decisions_made, results[0].presorted);
        assert_eq!(results[0].decisions_made, 32);
    }

    #[tokio::test]
    async fn trivial_cases_make_no_decisions() {
        for name in ["empty", "singleton"] {
            let results = run_synthetic_suite(Some(name)).await.unwrap();
            assert_eq!(results[0].decisions_made, 0);
            assert!(!results[0].overshoot);
        }
    }
}
