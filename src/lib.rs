#![forbid(unsafe_code)]

//! # mob-sort
//!
//! Rank a list by asking a crowd which of two items is better, one pair at a
//! time.
//!
//! A stable top-down merge sort drives every comparison through a decision
//! channel: the channel shows two cards to the mob via a caller-supplied
//! presenter and waits until one of two handles fires. The number of
//! decisions is counted on a per-sort session and compared against an
//! `n · ln(n)` estimate for progress display. When the merge finishes, each
//! record gets a 1-based rank.
//!
//! Ingestion, export and the terminal front end are thin collaborators around
//! that core.

pub mod config;
pub mod record;
pub mod sort;
pub mod tabular;
pub mod workflow;

pub use config::{load_config_from_path, ConfigError, MobSortConfig};
pub use record::{Attribute, RankedRecord, Record, RecordError};
pub use sort::{
    assign_ranks, run_sort, run_sort_with_trace, ChoicePrompt, Decision, DecisionChannel,
    DecisionError, DecisionEvent, DecisionObserver, DecisionPresenter, JsonlTraceSink,
    SortEngine, SortError, SortResponse, TraceSink, TraceWorker,
};
pub use tabular::{ExportOptions, TabularFormat};
pub use workflow::{Phase, SortTicket, Workflow, WorkflowError};
