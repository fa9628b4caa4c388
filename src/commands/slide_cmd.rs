//! Commands for Hero Slide operations

use uuid::Uuid;

use super::{loaded, non_blank};
use crate::domain::HeroSlide;
use crate::AppState;

/// List slides in carousel order
pub async fn list_slides(state: &AppState) -> Result<Vec<HeroSlide>, String> {
    let sync = loaded::<HeroSlide>(state).await?;
    Ok(sync.items().to_vec())
}

/// Append a slide to the carousel
pub async fn add_slide(
    state: &AppState,
    title: String,
    image_url: String,
    subtitle: Option<String>,
    cta: Option<(String, String)>,
) -> Result<HeroSlide, String> {
    let mut sync = loaded::<HeroSlide>(state).await?;
    let mut slide = HeroSlide::new(title, image_url);
    slide.subtitle = non_blank(subtitle);
    if let Some((label, href)) = cta {
        slide.cta_label = Some(label);
        slide.cta_href = Some(href);
    }
    sync.add(slide).await.cloned().map_err(|e| e.to_string())
}

pub async fn remove_slide(state: &AppState, id: Uuid) -> Result<(), String> {
    let mut sync = loaded::<HeroSlide>(state).await?;
    sync.remove(id).await.map_err(|e| e.to_string())
}

pub async fn move_slide(
    state: &AppState,
    moved: Uuid,
    target: Uuid,
) -> Result<Vec<HeroSlide>, String> {
    let mut sync = loaded::<HeroSlide>(state).await?;
    if !sync.reorder(moved, target) {
        log::info!("move_slide: nothing to do for {} -> {}", moved, target);
    }
    sync.settle().await;
    Ok(sync.items().to_vec())
}
