//! Table Repository
//!
//! Typed repository over any `RemoteStore`. Every row read is decoded and
//! validated; every row written is validated first.

use async_trait::async_trait;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;

use super::traits::{PositionedRepository, RemoteStore, Repository};
use crate::domain::{DomainError, DomainResult, Positioned, Record, TableRecord};

/// Fields the store owns; never sent in an update patch
const STORE_OWNED: [&str; 3] = ["id", "created_at", "updated_at"];

/// `{id, position}` pairs for a full ordering, position = index
pub fn position_batch<Id: std::fmt::Display>(order: &[Id]) -> Vec<Record> {
    order
        .iter()
        .enumerate()
        .map(|(index, id)| {
            let mut record = Record::new();
            record.insert("id".to_string(), Value::String(id.to_string()));
            record.insert("position".to_string(), Value::from(index as i64));
            record
        })
        .collect()
}

pub struct TableRepository<T> {
    store: Arc<dyn RemoteStore>,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for TableRepository<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T: TableRecord> TableRepository<T> {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    /// Insert or overwrite by `conflict_key` (e.g. one hero per page)
    pub async fn upsert_by(&self, entity: &T, conflict_key: &str) -> DomainResult<()> {
        let mut record = entity.to_record()?;
        if entity_id_is_nil(&record) {
            record.remove("id");
        }
        self.store.upsert_batch(T::TABLE, vec![record], conflict_key).await
    }

    fn decode_all(rows: Vec<Record>) -> DomainResult<Vec<T>> {
        rows.into_iter().map(T::from_record).collect()
    }
}

fn entity_id_is_nil(record: &Record) -> bool {
    match record.get("id") {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty() || s == "00000000-0000-0000-0000-000000000000",
        _ => false,
    }
}

#[async_trait]
impl<T: TableRecord> Repository<T> for TableRepository<T> {
    async fn create(&self, entity: &T) -> DomainResult<T> {
        let mut record = entity.to_record()?;
        if entity_id_is_nil(&record) {
            record.remove("id");
        }
        let row = self.store.insert(T::TABLE, record).await?;
        T::from_record(row)
    }

    async fn find_by_id(&self, id: T::Id) -> DomainResult<Option<T>> {
        let all = self.list().await?;
        Ok(all.into_iter().find(|e| e.id() == id))
    }

    async fn list(&self) -> DomainResult<Vec<T>> {
        let rows = self.store.select(T::TABLE, T::ORDER_BY).await?;
        Self::decode_all(rows)
    }

    async fn update(&self, entity: &T) -> DomainResult<T> {
        let mut patch = entity.to_record()?;
        for key in STORE_OWNED {
            patch.remove(key);
        }
        let row = self
            .store
            .update(T::TABLE, &entity.id().to_string(), patch)
            .await?;
        T::from_record(row)
    }

    async fn delete(&self, id: T::Id) -> DomainResult<()> {
        self.store.delete(T::TABLE, &id.to_string()).await
    }
}

#[async_trait]
impl<T: Positioned> PositionedRepository<T> for TableRepository<T> {
    async fn list_ordered(&self) -> DomainResult<Vec<T>> {
        let mut all = self.list().await?;
        all.sort_by_key(|e| e.position());
        Ok(all)
    }

    async fn write_positions(&self, order: &[T::Id]) -> DomainResult<()> {
        if order.is_empty() {
            return Ok(());
        }
        let ids: Vec<String> = order.iter().map(|id| id.to_string()).collect();
        let mut seen = std::collections::HashSet::new();
        if !ids.iter().all(|id| seen.insert(id.as_str())) {
            return Err(DomainError::InvalidInput("duplicate id in ordering".to_string()));
        }
        self.store
            .upsert_batch(T::TABLE, position_batch(&ids), "id")
            .await
    }
}
