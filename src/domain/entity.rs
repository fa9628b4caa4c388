//! Domain Layer - Core Entity Traits
//!
//! Every stored entity has a unique ID, a home table, and a validation
//! rule that runs whenever a record crosses the store boundary.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Untyped row as exchanged with the remote store
pub type Record = serde_json::Map<String, Value>;

/// Core trait for all domain entities
pub trait Entity: Sized + Send + Sync + Clone {
    /// The type of the entity's unique identifier
    type Id: Copy + Eq + std::hash::Hash + Send + Sync + std::fmt::Display + std::fmt::Debug + 'static;

    /// Returns the entity's unique identifier
    fn id(&self) -> Self::Id;
}

/// An entity persisted as one row of a remote table
pub trait TableRecord: Entity + Serialize + DeserializeOwned + 'static {
    /// Table holding the rows
    const TABLE: &'static str;
    /// Column the default listing is sorted by (ascending)
    const ORDER_BY: &'static str;

    /// Field-level rules; called on every record read or written
    fn validate(&self) -> DomainResult<()>;

    /// Decode and validate a row coming from the store
    fn from_record(record: Record) -> DomainResult<Self> {
        let entity: Self = serde_json::from_value(Value::Object(record)).map_err(|e| {
            DomainError::InvalidInput(format!("malformed {} row: {}", Self::TABLE, e))
        })?;
        entity.validate()?;
        Ok(entity)
    }

    /// Validate and encode for the store
    fn to_record(&self) -> DomainResult<Record> {
        self.validate()?;
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(DomainError::Internal(format!(
                "{} did not serialize to an object: {}",
                Self::TABLE,
                other
            ))),
            Err(e) => Err(DomainError::Internal(e.to_string())),
        }
    }
}

/// Entity with a dense display rank inside its table
pub trait Positioned: TableRecord {
    fn position(&self) -> i64;
    fn set_position(&mut self, position: i64);
}

/// Common result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level errors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum DomainError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

pub(crate) fn require_non_empty(field: &str, value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::InvalidInput(format!("{} must not be empty", field)));
    }
    Ok(())
}

pub(crate) fn require_url(field: &str, value: &str) -> DomainResult<()> {
    if value.starts_with("https://") || value.starts_with("http://") {
        Ok(())
    } else {
        Err(DomainError::InvalidInput(format!(
            "{} must be an http(s) URL, got '{}'",
            field, value
        )))
    }
}

pub(crate) fn require_position(position: i64) -> DomainResult<()> {
    if position < 0 {
        return Err(DomainError::InvalidInput(format!(
            "position must be non-negative, got {}",
            position
        )));
    }
    Ok(())
}
