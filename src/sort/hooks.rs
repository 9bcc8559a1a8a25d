//! Extension hooks for embedding the sort in an application.
//!
//! Callers can inject a per-decision side effect (progress bars, persistence
//! of an audit log) without the core knowing what it is.

use serde::Serialize;

use super::types::Decision;

#[derive(Debug, Clone, Serialize)]
pub struct DecisionEvent {
    /// 1-based index of this decision within the sort.
    pub decision_index: u64,
    pub left_subject: String,
    pub right_subject: String,
    pub decision: Decision,
    pub decisions_made: u64,
    pub decisions_estimated: f64,
    /// `decisions_made / decisions_estimated`; may exceed 1.0.
    pub progress: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum ObserverError {
    #[error("{0}")]
    Message(String),
}

#[async_trait::async_trait]
pub trait DecisionObserver: Send + Sync {
    async fn on_decision(&self, event: DecisionEvent) -> Result<(), ObserverError>;
}
