//! Write-back Dispatch
//!
//! Persists full-order snapshots in the background after an optimistic
//! reorder. Two policies:
//! - `Concurrent`: every snapshot gets its own task; completions may land
//!   in any order.
//! - `SingleFlight`: one writer task; at most one write in flight, and
//!   snapshots queued behind it collapse to the latest.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::collection_sync::SyncError;
use super::notice::{Notice, Notifier};
use crate::domain::Positioned;
use crate::repository::{PositionedRepository, TableRepository};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteBackPolicy {
    #[default]
    Concurrent,
    SingleFlight,
}

/// Write `order` as dense positions and report the outcome once
pub(crate) async fn persist_order<T: Positioned>(
    repo: &TableRepository<T>,
    notifier: &dyn Notifier,
    order: &[T::Id],
) -> Result<(), SyncError> {
    match repo.write_positions(order).await {
        Ok(()) => {
            log::info!("{}: order of {} items persisted", T::TABLE, order.len());
            notifier.notify(Notice::success(T::TABLE, "Order updated"));
            Ok(())
        }
        Err(e) => {
            log::error!("{}: failed to persist order: {}", T::TABLE, e);
            notifier.notify(Notice::error(T::TABLE, format!("Failed to update order: {}", e)));
            Err(SyncError::Persist(e))
        }
    }
}

#[derive(Clone)]
struct Snapshot<Id> {
    seq: u64,
    order: Vec<Id>,
}

struct SingleFlight<Id> {
    sender: watch::Sender<Snapshot<Id>>,
    completed: watch::Receiver<u64>,
}

// Tasks are detached, never aborted: dropping the sync does not cancel
// a write that was already issued.
enum Mode<Id> {
    Concurrent(Vec<JoinHandle<()>>),
    SingleFlight(Option<SingleFlight<Id>>),
}

pub(crate) struct WriteBack<T: Positioned> {
    repo: TableRepository<T>,
    notifier: Arc<dyn Notifier>,
    mode: Mode<T::Id>,
    submitted: u64,
    /// Runtime the sync was built on, if any; writes are spawned there
    runtime: Option<Handle>,
}

impl<T: Positioned> WriteBack<T> {
    pub(crate) fn new(
        repo: TableRepository<T>,
        notifier: Arc<dyn Notifier>,
        policy: WriteBackPolicy,
    ) -> Self {
        let mode = match policy {
            WriteBackPolicy::Concurrent => Mode::Concurrent(Vec::new()),
            WriteBackPolicy::SingleFlight => Mode::SingleFlight(None),
        };
        Self {
            repo,
            notifier,
            mode,
            submitted: 0,
            runtime: Handle::try_current().ok(),
        }
    }

    /// Runtime to spawn on: the one captured at construction, else the
    /// caller's. Reports an error notice when there is neither.
    fn runtime(&self) -> Option<Handle> {
        let handle = self.runtime.clone().or_else(|| Handle::try_current().ok());
        if handle.is_none() {
            log::error!("{}: no async runtime, order not persisted", T::TABLE);
            self.notifier.notify(Notice::error(
                T::TABLE,
                "Failed to update order: no async runtime available",
            ));
        }
        handle
    }

    /// Queue a snapshot for persistence
    pub(crate) fn submit(&mut self, order: Vec<T::Id>) {
        let needs_spawn = matches!(self.mode, Mode::Concurrent(_) | Mode::SingleFlight(None));
        let runtime = if needs_spawn {
            match self.runtime() {
                Some(handle) => Some(handle),
                None => return,
            }
        } else {
            None
        };

        self.submitted += 1;
        let seq = self.submitted;
        match (&mut self.mode, runtime) {
            (Mode::Concurrent(tasks), Some(runtime)) => {
                tasks.retain(|task| !task.is_finished());
                let repo = self.repo.clone();
                let notifier = self.notifier.clone();
                tasks.push(runtime.spawn(async move {
                    let _ = persist_order(&repo, notifier.as_ref(), &order).await;
                }));
            }
            (Mode::SingleFlight(slot), runtime) => {
                if let Some(runtime) = runtime {
                    *slot = Some(spawn_writer(&runtime, self.repo.clone(), self.notifier.clone()));
                }
                if let Some(flight) = slot {
                    // Replaces any snapshot the writer has not picked up yet
                    flight.sender.send_replace(Snapshot { seq, order });
                }
            }
            (Mode::Concurrent(_), None) => {}
        }
    }

    /// Wait until every submitted snapshot is written or superseded
    pub(crate) async fn settle(&mut self) {
        match &mut self.mode {
            Mode::Concurrent(tasks) => {
                for task in tasks.drain(..) {
                    if let Err(e) = task.await {
                        log::error!("{}: write-back task failed: {}", T::TABLE, e);
                    }
                }
            }
            Mode::SingleFlight(Some(flight)) => {
                let target = self.submitted;
                if flight.completed.wait_for(|done| *done >= target).await.is_err() {
                    log::error!("{}: write-back worker stopped", T::TABLE);
                }
            }
            Mode::SingleFlight(None) => {}
        }
    }
}

fn spawn_writer<T: Positioned>(
    runtime: &Handle,
    repo: TableRepository<T>,
    notifier: Arc<dyn Notifier>,
) -> SingleFlight<T::Id> {
    let (sender, mut receiver) = watch::channel(Snapshot { seq: 0, order: Vec::new() });
    let (completed_tx, completed) = watch::channel(0u64);
    runtime.spawn(async move {
        while receiver.changed().await.is_ok() {
            let snapshot = receiver.borrow_and_update().clone();
            let _ = persist_order(&repo, notifier.as_ref(), &snapshot.order).await;
            let _ = completed_tx.send(snapshot.seq);
        }
    });
    SingleFlight { sender, completed }
}
