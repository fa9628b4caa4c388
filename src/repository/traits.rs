//! Repository Layer - Core Traits
//!
//! `RemoteStore` is the untyped contract of the hosted relational backend.
//! `Repository` and `PositionedRepository` are the typed views the rest of
//! the crate works with.

use async_trait::async_trait;

use crate::domain::{DomainResult, Entity, Positioned, Record};

/// Untyped table access offered by the relational backend
///
/// One long-lived store is built at startup and shared as
/// `Arc<dyn RemoteStore>`. Rows are JSON objects; the typed layer validates
/// them on the way in and out.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// All rows of `table`, ascending by the integer or text column `order_by`
    async fn select(&self, table: &str, order_by: &str) -> DomainResult<Vec<Record>>;

    /// Insert one row; the store assigns `id` when the record has none.
    /// Returns the stored row.
    async fn insert(&self, table: &str, record: Record) -> DomainResult<Record>;

    /// Overwrite the given fields of row `id`. Returns the stored row.
    async fn update(&self, table: &str, id: &str, patch: Record) -> DomainResult<Record>;

    /// Apply every record as one all-or-nothing batch: on a `conflict_key`
    /// match only the listed fields are overwritten, otherwise the record is
    /// inserted. Replaying the same batch yields the same state.
    async fn upsert_batch(
        &self,
        table: &str,
        records: Vec<Record>,
        conflict_key: &str,
    ) -> DomainResult<()>;

    /// Delete row `id`
    async fn delete(&self, table: &str, id: &str) -> DomainResult<()>;
}

/// Core repository trait for CRUD operations
///
/// Generic over any Entity type.
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// Create a new entity
    async fn create(&self, entity: &T) -> DomainResult<T>;

    /// Find entity by ID
    async fn find_by_id(&self, id: T::Id) -> DomainResult<Option<T>>;

    /// List all entities in the table's default order
    async fn list(&self) -> DomainResult<Vec<T>>;

    /// Update an existing entity
    async fn update(&self, entity: &T) -> DomainResult<T>;

    /// Delete entity by ID
    async fn delete(&self, id: T::Id) -> DomainResult<()>;
}

/// Extension for entities ranked by a dense `position`
#[async_trait]
pub trait PositionedRepository<T: Positioned>: Repository<T> {
    /// All entities, ascending by position
    async fn list_ordered(&self) -> DomainResult<Vec<T>>;

    /// Write `position = index` for every id of `order` in one batch
    async fn write_positions(&self, order: &[T::Id]) -> DomainResult<()>;
}
