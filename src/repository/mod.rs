//! Repository Layer
//!
//! Data access abstractions and implementations.

mod db;
mod rest_store;
mod sqlite_store;
mod table_repo;
mod traits;


pub use db::{open_db, open_in_memory};
pub use rest_store::RestStore;
pub use sqlite_store::SqliteStore;
pub use table_repo::{position_batch, TableRepository};
pub use traits::{PositionedRepository, RemoteStore, Repository};
