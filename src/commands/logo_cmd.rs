//! Commands for Client Logo operations
//!
//! The logo wall is an ordered collection: moves and removals keep
//! positions dense.

use uuid::Uuid;

use super::{loaded, non_blank};
use crate::domain::ClientLogo;
use crate::AppState;

/// List logos in wall order
pub async fn list_logos(state: &AppState) -> Result<Vec<ClientLogo>, String> {
    let sync = loaded::<ClientLogo>(state).await?;
    Ok(sync.items().to_vec())
}

/// Append a logo to the end of the wall
pub async fn add_logo(
    state: &AppState,
    name: String,
    image_url: String,
    link_url: Option<String>,
) -> Result<ClientLogo, String> {
    let mut sync = loaded::<ClientLogo>(state).await?;
    let mut logo = ClientLogo::new(name, image_url);
    logo.link_url = non_blank(link_url);
    sync.add(logo).await.cloned().map_err(|e| e.to_string())
}

/// Edit a logo's fields; its place on the wall is unchanged
pub async fn edit_logo(
    state: &AppState,
    id: Uuid,
    name: Option<String>,
    image_url: Option<String>,
    link_url: Option<String>,
) -> Result<ClientLogo, String> {
    let mut sync = loaded::<ClientLogo>(state).await?;
    let existing = sync
        .items()
        .iter()
        .find(|l| l.id == id)
        .ok_or_else(|| format!("Logo {} not found", id))?;

    let updated = ClientLogo {
        name: name.unwrap_or_else(|| existing.name.clone()),
        image_url: image_url.unwrap_or_else(|| existing.image_url.clone()),
        // An explicit blank clears the link
        link_url: match link_url {
            Some(link) => non_blank(Some(link)),
            None => existing.link_url.clone(),
        },
        ..existing.clone()
    };

    sync.update(&updated).await.cloned().map_err(|e| e.to_string())
}

/// Delete a logo and close the gap
pub async fn remove_logo(state: &AppState, id: Uuid) -> Result<(), String> {
    let mut sync = loaded::<ClientLogo>(state).await?;
    sync.remove(id).await.map_err(|e| e.to_string())
}

/// Move `moved` into `target`'s slot and wait for the write-back.
/// Returns the new wall order.
pub async fn move_logo(
    state: &AppState,
    moved: Uuid,
    target: Uuid,
) -> Result<Vec<ClientLogo>, String> {
    let mut sync = loaded::<ClientLogo>(state).await?;
    if !sync.reorder(moved, target) {
        log::info!("move_logo: nothing to do for {} -> {}", moved, target);
    }
    sync.settle().await;
    Ok(sync.items().to_vec())
}
