//! Commands for Page Hero operations
//!
//! One hero per page; setting a page's hero overwrites the previous one.

use crate::domain::{Page, PageHero};
use crate::repository::{Repository, TableRepository};
use crate::sync::Notice;
use crate::AppState;

fn repo(state: &AppState) -> TableRepository<PageHero> {
    TableRepository::new(state.store.clone())
}

pub async fn list_page_heroes(state: &AppState) -> Result<Vec<PageHero>, String> {
    repo(state).list().await.map_err(|e| e.to_string())
}

pub async fn get_page_hero(state: &AppState, page: Page) -> Result<Option<PageHero>, String> {
    let heroes = list_page_heroes(state).await?;
    Ok(heroes.into_iter().find(|h| h.page == page))
}

/// Insert or replace the hero of `page`
pub async fn set_page_hero(
    state: &AppState,
    page: Page,
    image_url: String,
    headline: Option<String>,
) -> Result<PageHero, String> {
    let mut hero = PageHero::new(page, image_url);
    hero.headline = headline.filter(|h| !h.trim().is_empty());

    if let Err(e) = repo(state).upsert_by(&hero, "page").await {
        state
            .notifier
            .notify(Notice::error("page_heroes", format!("Failed to save {} hero: {}", page, e)));
        return Err(e.to_string());
    }
    state
        .notifier
        .notify(Notice::success("page_heroes", format!("{} hero saved", page)));

    get_page_hero(state, page)
        .await?
        .ok_or_else(|| format!("{} hero missing after save", page))
}
