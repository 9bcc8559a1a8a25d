//! Entry point that wires the engine, decision channel, progress estimate and
//! rank assignment together.
//!
//! 1. Create a decision channel over the caller's presenter.
//! 2. Merge-sort the records, resolving each comparison through the channel.
//!    The session seeds its estimate from `n · ln(n)` before the first request.
//! 3. Assign ranks 1..n to the sorted records.
//!
//! Any failure aborts the run; there is no partial result.

use std::time::Instant;

use tracing::info;

use crate::record::{RankedRecord, Record};

use super::decision::{DecisionChannel, DecisionError, DecisionPresenter};
use super::engine::{Comparator, SortEngine};
use super::hooks::{DecisionEvent, DecisionObserver, ObserverError};
use super::progress::{progress_fraction, worst_case_decisions};
use super::rank::assign_ranks;
use super::trace::{now_epoch_ms, record_hash, DecisionTrace, TraceError, TraceSink};
use super::types::{Decision, SortMeta, SortResponse, SortSession};

#[derive(Debug, thiserror::Error)]
pub enum SortError {
    #[error("Decision error: {0}")]
    Decision(#[from] DecisionError),
    #[error("Trace error: {0}")]
    Trace(#[from] TraceError),
    #[error("Observer error: {0}")]
    Observer(#[from] ObserverError),
}

/// Rank `items` by asking the mob through `presenter`.
pub async fn run_sort(
    items: Vec<Record>,
    presenter: &dyn DecisionPresenter,
) -> Result<Vec<RankedRecord>, SortError> {
    run_sort_with_trace(items, presenter, None, None)
        .await
        .map(|resp| resp.ranked)
}

/// Rank `items` with optional per-decision trace output and observer.
pub async fn run_sort_with_trace(
    items: Vec<Record>,
    presenter: &dyn DecisionPresenter,
    trace: Option<&dyn TraceSink>,
    observer: Option<&dyn DecisionObserver>,
) -> Result<SortResponse, SortError> {
    let start_time = Instant::now();
    let record_count = items.len();

    let mut comparator = InstrumentedChannel {
        channel: DecisionChannel::new(presenter),
        trace,
        observer,
    };
    let outcome = SortEngine::sort(items, &mut comparator).await?;
    let ranked = assign_ranks(outcome.items);

    let meta = SortMeta {
        record_count,
        decisions_made: outcome.decisions_made,
        decisions_estimated: outcome.decisions_estimated,
        worst_case_decisions: worst_case_decisions(record_count),
        latency_ms: start_time.elapsed().as_millis(),
    };
    info!(
        records = meta.record_count,
        decisions_made = meta.decisions_made,
        decisions_estimated = meta.decisions_estimated,
        latency_ms = meta.latency_ms as u64,
        "ranking complete"
    );

    Ok(SortResponse { ranked, meta })
}

struct InstrumentedChannel<'a, 'p> {
    channel: DecisionChannel<'p>,
    trace: Option<&'a dyn TraceSink>,
    observer: Option<&'a dyn DecisionObserver>,
}

impl InstrumentedChannel<'_, '_> {
    fn build_trace(
        &self,
        session: &SortSession,
        decision_index: u64,
        left: &Record,
        right: &Record,
    ) -> DecisionTrace {
        DecisionTrace {
            timestamp_ms: now_epoch_ms(),
            decision_index,
            left_subject: left.subject().display_value(),
            right_subject: right.subject().display_value(),
            left_hash: record_hash(left),
            right_hash: record_hash(right),
            chosen: None,
            decisions_estimated: session.decisions_estimated(),
            error: None,
        }
    }
}

#[async_trait::async_trait]
impl Comparator<Record> for InstrumentedChannel<'_, '_> {
    type Error = SortError;

    async fn compare(
        &mut self,
        session: &mut SortSession,
        a: &Record,
        b: &Record,
    ) -> Result<Decision, Self::Error> {
        let decision = match self.channel.request(session, a, b).await {
            Ok(decision) => decision,
            Err(err) => {
                if let Some(trace) = self.trace {
                    let mut event = self.build_trace(session, session.decisions_made() + 1, a, b);
                    event.error = Some(err.to_string());
                    trace.record(event)?;
                }
                return Err(err.into());
            }
        };

        let decision_index = session.decisions_made();
        if let Some(trace) = self.trace {
            let mut event = self.build_trace(session, decision_index, a, b);
            event.chosen = Some(
                if decision.keeps_left() { "left" } else { "right" }.to_string(),
            );
            trace.record(event)?;
        }

        if let Some(observer) = self.observer {
            let event = DecisionEvent {
                decision_index,
                left_subject: a.subject().display_value(),
                right_subject: b.subject().display_value(),
                decision,
                decisions_made: session.decisions_made(),
                decisions_estimated: session.decisions_estimated(),
                progress: progress_fraction(session.decisions_made(), session.decisions_estimated()),
            };
            observer.on_decision(event).await?;
        }

        Ok(decision)
    }
}
