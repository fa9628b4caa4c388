//! Ordered Collection Sync
//!
//! Client-held ordered list of positioned entities, kept consistent with
//! the store under single-user drag reordering.
//!
//! The local list is authoritative for the duration of a gesture:
//! `reorder` rewrites it synchronously and hands a full-order snapshot to
//! the write-back dispatcher. A failed write is reported, not reverted;
//! the next `load` is the only resync path.

use dragdrop::MoveEvent;
use std::sync::Arc;
use thiserror::Error;

use super::notice::{Notice, Notifier};
use super::ordered_list::{densify, index_of, move_item};
use super::write_back::{persist_order, WriteBack, WriteBackPolicy};
use crate::domain::{DomainError, Positioned};
use crate::repository::{PositionedRepository, RemoteStore, Repository, TableRepository};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// Reading the collection failed; the previous list is kept
    #[error("load failed: {0}")]
    Load(DomainError),
    /// Writing positions failed; the local order is kept
    #[error("persist failed: {0}")]
    Persist(DomainError),
    /// Add, edit or delete failed; the local list is unchanged
    #[error("{action} failed: {source}")]
    Mutation {
        action: &'static str,
        source: DomainError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    NotLoaded,
    Loaded,
    /// Last load failed; the UI offers a retry
    Failed { message: String },
}

pub struct OrderedCollectionSync<T: Positioned> {
    repo: TableRepository<T>,
    notifier: Arc<dyn Notifier>,
    items: Vec<T>,
    load_state: LoadState,
    write_back: WriteBack<T>,
}

impl<T: Positioned> OrderedCollectionSync<T> {
    pub fn new(
        store: Arc<dyn RemoteStore>,
        notifier: Arc<dyn Notifier>,
        policy: WriteBackPolicy,
    ) -> Self {
        let repo = TableRepository::new(store);
        let write_back = WriteBack::new(repo.clone(), notifier.clone(), policy);
        Self {
            repo,
            notifier,
            items: Vec::new(),
            load_state: LoadState::NotLoaded,
            write_back,
        }
    }

    /// Items in display order
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Ids in display order
    pub fn order_index(&self) -> Vec<T::Id> {
        self.items.iter().map(|item| item.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub fn can_retry(&self) -> bool {
        matches!(self.load_state, LoadState::Failed { .. })
    }

    /// Replace the local list with the store's, ordered by position
    pub async fn load(&mut self) -> Result<&[T], SyncError> {
        match self.repo.list_ordered().await {
            Ok(items) => {
                log::info!("{}: loaded {} items", T::TABLE, items.len());
                self.items = items;
                self.load_state = LoadState::Loaded;
                Ok(&self.items)
            }
            Err(e) => {
                log::error!("{}: load failed: {}", T::TABLE, e);
                self.notifier
                    .notify(Notice::error(T::TABLE, format!("Failed to load: {}", e)));
                self.load_state = LoadState::Failed { message: e.to_string() };
                Err(SyncError::Load(e))
            }
        }
    }

    /// Move `moved` into the slot `target` occupies, then persist in the
    /// background. Unknown ids (or `moved == target`) leave everything
    /// untouched. Returns whether the list changed.
    pub fn reorder(&mut self, moved: T::Id, target: T::Id) -> bool {
        let (Some(old_index), Some(new_index)) =
            (index_of(&self.items, moved), index_of(&self.items, target))
        else {
            log::debug!("{}: ignoring move of unknown id {} -> {}", T::TABLE, moved, target);
            return false;
        };
        if old_index == new_index {
            return false;
        }

        move_item(&mut self.items, old_index, new_index);
        densify(&mut self.items);
        log::debug!("{}: moved {} from {} to {}", T::TABLE, moved, old_index, new_index);

        let order = self.order_index();
        self.write_back.submit(order);
        true
    }

    /// Feed a drag gesture from the pointer or keyboard tracker
    pub fn apply(&mut self, event: MoveEvent<T::Id>) -> bool {
        self.reorder(event.moved, event.target)
    }

    /// Write `order` as positions 0..n-1 and report the outcome.
    /// Idempotent: the batch carries the whole order.
    pub async fn persist(&self, order: &[T::Id]) -> Result<(), SyncError> {
        persist_order(&self.repo, self.notifier.as_ref(), order).await
    }

    /// Wait for every background write-back issued so far
    pub async fn settle(&mut self) {
        self.write_back.settle().await;
    }

    /// Create `item` at the end of the list
    pub async fn add(&mut self, mut item: T) -> Result<&T, SyncError> {
        item.set_position(self.items.len() as i64);
        match self.repo.create(&item).await {
            Ok(created) => {
                log::info!("{}: added {}", T::TABLE, created.id());
                self.notifier.notify(Notice::success(T::TABLE, "Added"));
                self.items.push(created);
                let last = self.items.len() - 1;
                Ok(&self.items[last])
            }
            Err(e) => Err(self.mutation_failed("add", e)),
        }
    }

    /// Save edited fields of an item already in the list; its position stays
    pub async fn update(&mut self, item: &T) -> Result<&T, SyncError> {
        let Some(index) = index_of(&self.items, item.id()) else {
            return Err(self.mutation_failed(
                "update",
                DomainError::NotFound(format!("{} {} is not loaded", T::TABLE, item.id())),
            ));
        };
        let mut edited = item.clone();
        edited.set_position(self.items[index].position());
        match self.repo.update(&edited).await {
            Ok(saved) => {
                self.notifier.notify(Notice::success(T::TABLE, "Saved"));
                self.items[index] = saved;
                Ok(&self.items[index])
            }
            Err(e) => Err(self.mutation_failed("update", e)),
        }
    }

    /// Delete `id`, then close the gap and persist the remaining order.
    /// An id that is not in the list is ignored.
    ///
    /// Pending write-backs land first: a queued snapshot still holding `id`
    /// must not reach the store after the row is gone.
    pub async fn remove(&mut self, id: T::Id) -> Result<(), SyncError> {
        let Some(index) = index_of(&self.items, id) else {
            return Ok(());
        };
        self.write_back.settle().await;
        match self.repo.delete(id).await {
            Ok(()) => {}
            Err(DomainError::NotFound(_)) => {
                log::warn!("{}: {} was already deleted in the store", T::TABLE, id);
            }
            Err(e) => return Err(self.mutation_failed("delete", e)),
        }

        self.items.remove(index);
        self.notifier.notify(Notice::success(T::TABLE, "Deleted"));
        densify(&mut self.items);
        if self.items.is_empty() {
            return Ok(());
        }
        let order = self.order_index();
        self.persist(&order).await
    }

    fn mutation_failed(&self, action: &'static str, source: DomainError) -> SyncError {
        log::error!("{}: {} failed: {}", T::TABLE, action, source);
        self.notifier
            .notify(Notice::error(T::TABLE, format!("Failed to {}: {}", action, source)));
        SyncError::Mutation { action, source }
    }
}
