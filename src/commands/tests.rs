//! Command Layer Tests
//!
//! Drives the admin commands against an in-memory SQLite store.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use uuid::Uuid;

    use crate::commands::*;
    use crate::config::AppConfig;
    use crate::domain::{Page, ProjectCategory};
    use crate::filter::ProjectFilter;
    use crate::repository::SqliteStore;
    use crate::sync::{ChannelNotifier, Notice};
    use crate::AppState;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn setup_state() -> (AppState, UnboundedReceiver<Notice>) {
        let store = SqliteStore::open_in_memory().expect("Failed to init test DB");
        let (notifier, rx) = ChannelNotifier::new();
        let state = AppState::new(Arc::new(store), Arc::new(notifier), AppConfig::default());
        (state, rx)
    }

    async fn add(state: &AppState, name: &str) -> Uuid {
        add_logo(state, name.to_string(), format!("https://cdn.example.com/{}.png", name), None)
            .await
            .unwrap()
            .id
    }

    fn names(logos: &[crate::domain::ClientLogo]) -> Vec<&str> {
        logos.iter().map(|l| l.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_logo_lifecycle() {
        let (state, _rx) = setup_state();
        let a = add(&state, "acme").await;
        let b = add(&state, "bolt").await;
        let c = add(&state, "crane").await;

        let moved = move_logo(&state, c, a).await.unwrap();
        assert_eq!(names(&moved), vec!["crane", "acme", "bolt"]);

        remove_logo(&state, a).await.unwrap();
        let logos = list_logos(&state).await.unwrap();
        assert_eq!(names(&logos), vec!["crane", "bolt"]);
        assert_eq!(logos.iter().map(|l| l.position).collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(logos[1].id, b);
    }

    #[tokio::test]
    async fn test_edit_logo_keeps_position_and_clears_link() {
        let (state, _rx) = setup_state();
        add(&state, "acme").await;
        let id = add_logo(
            &state,
            "bolt".to_string(),
            "https://cdn.example.com/bolt.png".to_string(),
            Some("https://bolt.example.com".to_string()),
        )
        .await
        .unwrap()
        .id;

        let edited = edit_logo(&state, id, Some("Bolt Ltd".to_string()), None, Some(String::new()))
            .await
            .unwrap();

        assert_eq!(edited.name, "Bolt Ltd");
        assert_eq!(edited.position, 1);
        assert!(edited.link_url.is_none());
        assert!(edit_logo(&state, Uuid::new_v4(), None, None, None).await.is_err());
    }

    #[tokio::test]
    async fn test_add_logo_reports_validation_error() {
        let (state, mut rx) = setup_state();
        let result = add_logo(&state, "acme".to_string(), "not-a-url".to_string(), None).await;

        let message = result.unwrap_err();
        assert!(message.contains("image_url"), "{}", message);
        assert!(rx.try_recv().unwrap().is_error());
    }

    #[tokio::test]
    async fn test_move_with_unknown_id_changes_nothing() {
        let (state, _rx) = setup_state();
        let a = add(&state, "acme").await;
        add(&state, "bolt").await;

        let logos = move_logo(&state, Uuid::new_v4(), a).await.unwrap();
        assert_eq!(names(&logos), vec!["acme", "bolt"]);
    }

    #[tokio::test]
    async fn test_slides_order_and_cta() {
        let (state, _rx) = setup_state();
        let first = add_slide(
            &state,
            "Built to last".to_string(),
            "https://cdn.example.com/s1.jpg".to_string(),
            None,
            Some(("Our work".to_string(), "/projects".to_string())),
        )
        .await
        .unwrap();
        let second = add_slide(
            &state,
            "On time".to_string(),
            "https://cdn.example.com/s2.jpg".to_string(),
            Some("Every time".to_string()),
            None,
        )
        .await
        .unwrap();

        let slides = move_slide(&state, second.id, first.id).await.unwrap();
        assert_eq!(slides[0].title, "On time");
        assert_eq!(slides[1].cta_href.as_deref(), Some("/projects"));

        remove_slide(&state, second.id).await.unwrap();
        let slides = list_slides(&state).await.unwrap();
        assert_eq!(slides.len(), 1);
        assert_eq!(slides[0].position, 0);
    }

    #[tokio::test]
    async fn test_projects_filter_and_delete() {
        let (state, _rx) = setup_state();
        create_project(
            &state,
            "Harbor Warehouse".to_string(),
            ProjectCategory::Industrial,
            Some("Portside".to_string()),
            Some(2021),
        )
        .await
        .unwrap();
        let clinic = create_project(
            &state,
            "Clinic Fit-out".to_string(),
            ProjectCategory::Commercial,
            None,
            None,
        )
        .await
        .unwrap();

        let filter = ProjectFilter::parse(Some("harbor"), None).unwrap();
        let found = list_projects(&state, &filter).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Harbor Warehouse");

        let mut edited = clinic.clone();
        edited.featured = true;
        assert!(update_project(&state, edited).await.unwrap().featured);

        delete_project(&state, clinic.id).await.unwrap();
        assert!(get_project(&state, clinic.id).await.unwrap().is_none());
        assert_eq!(list_projects(&state, &ProjectFilter::default()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_page_hero_set_replaces() {
        let (state, _rx) = setup_state();
        set_page_hero(&state, Page::Contact, "https://cdn.example.com/a.jpg".to_string(), None)
            .await
            .unwrap();
        let hero = set_page_hero(
            &state,
            Page::Contact,
            "https://cdn.example.com/b.jpg".to_string(),
            Some("Talk to us".to_string()),
        )
        .await
        .unwrap();

        assert_eq!(hero.image_url, "https://cdn.example.com/b.jpg");
        assert_eq!(list_page_heroes(&state).await.unwrap().len(), 1);
        assert!(get_page_hero(&state, Page::Home).await.unwrap().is_none());
    }
}
