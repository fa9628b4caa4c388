//! Commands Layer
//!
//! Admin command handlers. Each takes the shared `AppState` and reports
//! failures as strings for the CLI or UI boundary.

mod hero_cmd;
mod logo_cmd;
mod project_cmd;
mod slide_cmd;

pub use hero_cmd::*;
pub use logo_cmd::*;
pub use project_cmd::*;
pub use slide_cmd::*;

#[cfg(test)]
mod tests;

use crate::domain::Positioned;
use crate::sync::OrderedCollectionSync;
use crate::AppState;

/// Collection loaded from the store, ready for edits
async fn loaded<T: Positioned>(state: &AppState) -> Result<OrderedCollectionSync<T>, String> {
    let mut sync = state.collection::<T>();
    sync.load().await.map_err(|e| e.to_string())?;
    Ok(sync)
}

/// Clean up optional text input: blank means unset
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
