//! BuildCo Admin Core
//!
//! Layered architecture:
//! - domain: Core entities and business rules
//! - repository: Remote store contract, backends and typed repositories
//! - sync: Optimistic ordered collections with background write-back
//! - commands: Admin command handlers

use std::sync::Arc;
use thiserror::Error;

pub mod commands;
pub mod config;
pub mod domain;
pub mod filter;
pub mod repository;
pub mod sync;

use config::{AppConfig, Backend, ConfigError};
use domain::{DomainError, Positioned};
use repository::{RemoteStore, RestStore, SqliteStore};
use sync::{Notifier, OrderedCollectionSync};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Failed to open store: {0}")]
    Store(#[from] DomainError),
}

/// Application state shared across commands
pub struct AppState {
    pub store: Arc<dyn RemoteStore>,
    pub notifier: Arc<dyn Notifier>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn RemoteStore>, notifier: Arc<dyn Notifier>, config: AppConfig) -> Self {
        Self {
            store,
            notifier,
            config,
        }
    }

    /// Build the one store client for the configured backend
    pub fn connect(config: AppConfig, notifier: Arc<dyn Notifier>) -> Result<Self, StartupError> {
        let store: Arc<dyn RemoteStore> = match &config.backend {
            Backend::Sqlite { path } => {
                log::info!("Opening SQLite store at {}", path.display());
                Arc::new(SqliteStore::open(path)?)
            }
            Backend::Rest { url, .. } => {
                let api_key = config.api_key(|var| std::env::var(var).ok())?;
                log::info!("Using REST store at {}", url);
                Arc::new(RestStore::new(url, &api_key, config.request_timeout())?)
            }
        };
        Ok(Self::new(store, notifier, config))
    }

    /// Fresh, unloaded collection over the shared store
    pub fn collection<T: Positioned>(&self) -> OrderedCollectionSync<T> {
        OrderedCollectionSync::new(self.store.clone(), self.notifier.clone(), self.config.write_back)
    }
}
