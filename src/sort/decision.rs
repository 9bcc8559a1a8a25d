//! Decision channel: one outstanding binary choice at a time.
//!
//! Each request mints two handles and parks a oneshot sender for each in a
//! shared slot. Whichever handle fires first takes *both* senders out of the
//! slot, so the losing handle (or any handle from an earlier request, or from
//! a channel that has since been dropped) resolves nothing and reports
//! [`TriggerOutcome::Stale`].

use std::sync::{Arc, Mutex, MutexGuard, Weak};

use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::record::Record;

use super::engine::Comparator;
use super::progress::Progress;
use super::types::{Decision, Side, SortSession};

/// Identifier of one acceptance handle. Never reused within a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(u64);

impl HandleId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for HandleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "choice-{}", self.0)
    }
}

/// What happened when a handle was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// The handle settled the outstanding request.
    Resolved(Side),
    /// The handle no longer refers to an outstanding request.
    Stale,
}

#[derive(Debug, thiserror::Error)]
pub enum PresentError {
    #[error("{0}")]
    Message(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum DecisionError {
    #[error("presenter failed: {0}")]
    Presenter(#[from] PresentError),
    #[error("decision channel closed before a choice was made")]
    Abandoned,
    #[error("a decision request is already outstanding")]
    Busy,
}

/// Collaborator that shows a choice to the mob.
///
/// `present` should return once the choice is on screen; the answer comes back
/// later through one of the prompt's handles. Firing a handle from inside
/// `present` is also fine.
#[async_trait::async_trait]
pub trait DecisionPresenter: Send + Sync {
    async fn present(&self, prompt: ChoicePrompt) -> Result<(), PresentError>;
}

/// Everything a presenter needs to draw one choice.
#[derive(Debug, Clone)]
pub struct ChoicePrompt {
    pub decisions_made: u64,
    pub decisions_estimated: f64,
    pub left: Record,
    pub left_handle: ChoiceHandle,
    pub right: Record,
    pub right_handle: ChoiceHandle,
}

impl ChoicePrompt {
    pub fn progress(&self) -> Progress {
        Progress::new(self.decisions_made, self.decisions_estimated)
    }

    pub fn handle(&self, side: Side) -> &ChoiceHandle {
        match side {
            Side::Left => &self.left_handle,
            Side::Right => &self.right_handle,
        }
    }
}

/// One side of an outstanding choice.
#[derive(Debug, Clone)]
pub struct ChoiceHandle {
    id: HandleId,
    slot: Weak<Mutex<Slot>>,
}

impl ChoiceHandle {
    pub fn id(&self) -> HandleId {
        self.id
    }

    pub fn trigger(&self) -> TriggerOutcome {
        report(&self.slot, self.id)
    }
}

/// Reports fired handles by id, for callers that only keep ids around.
#[derive(Debug, Clone)]
pub struct ChoiceResolver {
    slot: Weak<Mutex<Slot>>,
}

impl ChoiceResolver {
    pub fn report(&self, id: HandleId) -> TriggerOutcome {
        report(&self.slot, id)
    }
}

#[derive(Debug, Default)]
struct Slot {
    next_id: u64,
    closed: bool,
    pending: Option<Pending>,
}

#[derive(Debug)]
struct Pending {
    left_id: HandleId,
    right_id: HandleId,
    left_tx: oneshot::Sender<()>,
    right_tx: oneshot::Sender<()>,
}

fn lock(slot: &Mutex<Slot>) -> MutexGuard<'_, Slot> {
    // The slot holds no invariant a panicking holder could break halfway.
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn report(slot: &Weak<Mutex<Slot>>, id: HandleId) -> TriggerOutcome {
    let Some(slot) = slot.upgrade() else {
        warn!(handle = %id, "choice reported after its channel was discarded");
        return TriggerOutcome::Stale;
    };
    let mut guard = lock(&slot);
    let side = match guard.pending.as_ref() {
        Some(p) if p.left_id == id => Side::Left,
        Some(p) if p.right_id == id => Side::Right,
        _ => {
            warn!(handle = %id, "ignoring stale choice");
            return TriggerOutcome::Stale;
        }
    };
    let Some(pending) = guard.pending.take() else {
        return TriggerOutcome::Stale;
    };
    drop(guard);

    // Sending into a dropped receiver only happens if the request was torn
    // down concurrently; the choice is then moot either way.
    let sent = match side {
        Side::Left => pending.left_tx.send(()),
        Side::Right => pending.right_tx.send(()),
    };
    if sent.is_err() {
        return TriggerOutcome::Stale;
    }
    TriggerOutcome::Resolved(side)
}

/// Mediates binary choices between records through a presenter.
pub struct DecisionChannel<'p> {
    presenter: &'p dyn DecisionPresenter,
    slot: Arc<Mutex<Slot>>,
}

impl std::fmt::Debug for DecisionChannel<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecisionChannel")
            .field("slot", &self.slot)
            .finish_non_exhaustive()
    }
}

impl<'p> DecisionChannel<'p> {
    pub fn new(presenter: &'p dyn DecisionPresenter) -> Self {
        Self {
            presenter,
            slot: Arc::new(Mutex::new(Slot::default())),
        }
    }

    pub fn resolver(&self) -> ChoiceResolver {
        ChoiceResolver {
            slot: Arc::downgrade(&self.slot),
        }
    }

    /// Whether a request is waiting on the mob.
    pub fn is_pending(&self) -> bool {
        lock(&self.slot).pending.is_some()
    }

    /// Abandon any outstanding request and refuse new ones.
    ///
    /// A suspended [`DecisionChannel::request`] returns
    /// [`DecisionError::Abandoned`].
    pub fn close(&self) {
        let mut guard = lock(&self.slot);
        guard.closed = true;
        guard.pending = None;
    }

    /// Ask the mob to choose between `left` and `right`.
    ///
    /// Resolves to [`Decision::Less`] when the left record wins and
    /// [`Decision::Greater`] when the right one does, and counts exactly one
    /// decision on the session either way.
    pub async fn request(
        &self,
        session: &mut SortSession,
        left: &Record,
        right: &Record,
    ) -> Result<Decision, DecisionError> {
        let (left_handle, right_handle, left_rx, right_rx) = self.open()?;
        debug!(
            left = %left.subject().display_value(),
            right = %right.subject().display_value(),
            decisions_made = session.decisions_made(),
            "requesting decision"
        );

        let prompt = ChoicePrompt {
            decisions_made: session.decisions_made(),
            decisions_estimated: session.decisions_estimated(),
            left: left.clone(),
            left_handle,
            right: right.clone(),
            right_handle,
        };
        if let Err(err) = self.presenter.present(prompt).await {
            lock(&self.slot).pending = None;
            return Err(DecisionError::Presenter(err));
        }

        let side = tokio::select! {
            biased;
            Ok(()) = left_rx => Side::Left,
            Ok(()) = right_rx => Side::Right,
            else => return Err(DecisionError::Abandoned),
        };

        session.record_decision();
        debug!(
            side = ?side,
            decisions_made = session.decisions_made(),
            "decision resolved"
        );
        Ok(side.decision())
    }

    #[allow(clippy::type_complexity)]
    fn open(
        &self,
    ) -> Result<
        (
            ChoiceHandle,
            ChoiceHandle,
            oneshot::Receiver<()>,
            oneshot::Receiver<()>,
        ),
        DecisionError,
    > {
        let mut guard = lock(&self.slot);
        if guard.closed {
            return Err(DecisionError::Abandoned);
        }
        if let Some(pending) = guard.pending.as_ref() {
            // A request whose future was dropped leaves only closed senders behind.
            if !(pending.left_tx.is_closed() && pending.right_tx.is_closed()) {
                return Err(DecisionError::Busy);
            }
            guard.pending = None;
        }

        let left_id = HandleId(guard.next_id);
        let right_id = HandleId(guard.next_id + 1);
        guard.next_id += 2;

        let (left_tx, left_rx) = oneshot::channel();
        let (right_tx, right_rx) = oneshot::channel();
        guard.pending = Some(Pending {
            left_id,
            right_id,
            left_tx,
            right_tx,
        });

        let weak = Arc::downgrade(&self.slot);
        Ok((
            ChoiceHandle {
                id: left_id,
                slot: weak.clone(),
            },
            ChoiceHandle {
                id: right_id,
                slot: weak,
            },
            left_rx,
            right_rx,
        ))
    }
}

#[async_trait::async_trait]
impl Comparator<Record> for DecisionChannel<'_> {
    type Error = DecisionError;

    async fn compare(
        &mut self,
        session: &mut SortSession,
        a: &Record,
        b: &Record,
    ) -> Result<Decision, Self::Error> {
        self.request(session, a, b).await
    }
}
