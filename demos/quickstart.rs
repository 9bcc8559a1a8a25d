//! Minimal end-to-end example for `mob-sort`.
//!
//! Ranks the Harry Potter films by run time with a simulated mob that always
//! prefers the shorter film, printing progress as each decision lands.
//!
//! To run:
//! - `cargo run --example quickstart`

use mob_sort::sort::{AutoPresenter, DecisionEvent, DecisionObserver, ObserverError, Side};
use mob_sort::{run_sort_with_trace, Attribute, Record};

struct PrintProgress;

#[async_trait::async_trait]
impl DecisionObserver for PrintProgress {
    async fn on_decision(&self, event: DecisionEvent) -> Result<(), ObserverError> {
        println!(
            "decision {:>2} (~{:.0}%): {} vs {}",
            event.decision_index,
            event.progress * 100.0,
            event.left_subject,
            event.right_subject
        );
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let films = [
        ("Sorcerer's Stone", 152),
        ("Chamber of Secrets", 161),
        ("Prisoner of Azkaban", 142),
        ("Goblet of Fire", 157),
        ("Order of the Phoenix", 138),
        ("Half-Blood Prince", 153),
        ("Deathly Hallows: Part 1", 146),
        ("Deathly Hallows: Part 2", 130),
    ];
    let records: Vec<Record> = films
        .iter()
        .map(|(title, minutes)| {
            Record::new(
                Attribute::new("Movie Title", *title),
                vec![Attribute::new("Run Time (minutes)", *minutes)],
            )
        })
        .collect();

    // -- The mob -------------------------------------------------------------

    let minutes = |r: &Record| {
        r.get("Run Time (minutes)")
            .and_then(|v| v.as_u64())
            .unwrap_or_default()
    };
    let presenter = AutoPresenter::new(move |left: &Record, right: &Record| {
        if minutes(left) <= minutes(right) {
            Side::Left
        } else {
            Side::Right
        }
    });

    // -- The actual sort -----------------------------------------------------

    let resp = run_sort_with_trace(records, &presenter, None, Some(&PrintProgress)).await?;

    println!(
        "\n{} decisions (estimated {:.1}, worst case {})",
        resp.meta.decisions_made, resp.meta.decisions_estimated, resp.meta.worst_case_decisions
    );
    for ranked in &resp.ranked {
        println!(
            "{:>2}. {}",
            ranked.rank,
            ranked.record.subject().display_value()
        );
    }

    Ok(())
}
