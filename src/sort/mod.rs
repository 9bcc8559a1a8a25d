//! Mob sort core.
//!
//! Ranks records with a merge sort whose comparator is a person (or a crowd)
//! picking the better of two cards:
//! - `decision`: one outstanding binary choice, resolved through handles
//! - `progress`: the `n · ln(n)` estimate and exact merge-sort bounds
//! - `engine`: the sequential, stable top-down merge sort
//! - `rank`: 1-based rank assignment
//!
//! `run_sort` composes them; the remaining modules are optional extras.

pub mod decision;
pub mod engine;
pub mod evaluation;
pub mod hooks;
pub mod presenter;
pub mod progress;
pub mod rank;
pub mod run;
pub mod trace;
pub mod types;

pub use decision::{
    ChoiceHandle, ChoicePrompt, ChoiceResolver, DecisionChannel, DecisionError,
    DecisionPresenter, HandleId, PresentError, TriggerOutcome,
};
pub use engine::{merge_sort, Comparator, SortEngine, SortOutcome};
pub use hooks::{DecisionEvent, DecisionObserver, ObserverError};
pub use presenter::{write_card, AutoPresenter, TerminalPresenter};
pub use progress::{
    best_case_decisions, estimate_decisions, presorted_decisions, progress_fraction,
    worst_case_decisions, Progress,
};
pub use rank::assign_ranks;
pub use run::{run_sort, run_sort_with_trace, SortError};
pub use trace::{DecisionTrace, JsonlSink, JsonlTraceSink, TraceError, TraceSink, TraceWorker};
pub use types::*;
