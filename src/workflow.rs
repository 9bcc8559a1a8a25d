//! Application-level state machine around a sort.
//!
//! `NoData → Confirming → Sorting → Complete`. Loading new input from any
//! state returns to `Confirming` and bumps the generation, so a result from a
//! sort that was started earlier can never land on top of the new data.

use serde::Serialize;

use crate::record::{RankedRecord, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    NoData,
    Confirming,
    Sorting,
    Complete,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::NoData => "no_data",
            Phase::Confirming => "confirming",
            Phase::Sorting => "sorting",
            Phase::Complete => "complete",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("cannot {action} while {from}")]
    InvalidTransition { from: Phase, action: &'static str },
    #[error("sort result belongs to a discarded session")]
    Stale,
}

#[derive(Debug, Clone)]
enum State {
    NoData,
    Confirming(Vec<Record>),
    Sorting,
    Complete(Vec<RankedRecord>),
}

/// Input handed out when a sort begins.
#[derive(Debug, Clone)]
pub struct SortTicket {
    pub generation: u64,
    pub records: Vec<Record>,
}

#[derive(Debug, Clone)]
pub struct Workflow {
    state: State,
    generation: u64,
}

impl Default for Workflow {
    fn default() -> Self {
        Self::new()
    }
}

impl Workflow {
    pub fn new() -> Self {
        Self {
            state: State::NoData,
            generation: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        phase_of(&self.state)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Records awaiting confirmation, if any.
    pub fn pending(&self) -> Option<&[Record]> {
        match &self.state {
            State::Confirming(records) => Some(records),
            _ => None,
        }
    }

    /// Final ranking, once complete.
    pub fn results(&self) -> Option<&[RankedRecord]> {
        match &self.state {
            State::Complete(ranked) => Some(ranked),
            _ => None,
        }
    }

    /// Replace the input from any phase. Any in-flight sort becomes stale.
    pub fn load(&mut self, records: Vec<Record>) {
        if self.phase() == Phase::Sorting {
            tracing::info!(
                generation = self.generation,
                "new input arrived mid-sort; discarding session"
            );
        }
        self.generation += 1;
        self.state = State::Confirming(records);
    }

    pub fn begin_sort(&mut self) -> Result<SortTicket, WorkflowError> {
        match std::mem::replace(&mut self.state, State::Sorting) {
            State::Confirming(records) => Ok(SortTicket {
                generation: self.generation,
                records,
            }),
            other => {
                let from = phase_of(&other);
                self.state = other;
                Err(WorkflowError::InvalidTransition {
                    from,
                    action: "begin sort",
                })
            }
        }
    }

    pub fn complete(
        &mut self,
        generation: u64,
        ranked: Vec<RankedRecord>,
    ) -> Result<(), WorkflowError> {
        if generation != self.generation {
            return Err(WorkflowError::Stale);
        }
        if !matches!(self.state, State::Sorting) {
            return Err(WorkflowError::InvalidTransition {
                from: self.phase(),
                action: "complete sort",
            });
        }
        self.state = State::Complete(ranked);
        Ok(())
    }
}

fn phase_of(state: &State) -> Phase {
    match state {
        State::NoData => Phase::NoData,
        State::Confirming(_) => Phase::Confirming,
        State::Sorting => Phase::Sorting,
        State::Complete(_) => Phase::Complete,
    }
}
