//! Commands for Project operations
//!
//! Projects are not reordered; they are listed newest first.

use uuid::Uuid;

use crate::domain::{Project, ProjectCategory};
use crate::filter::ProjectFilter;
use crate::repository::{Repository, TableRepository};
use crate::sync::Notice;
use crate::AppState;

fn repo(state: &AppState) -> TableRepository<Project> {
    TableRepository::new(state.store.clone())
}

/// List projects matching `filter`, newest first
pub async fn list_projects(state: &AppState, filter: &ProjectFilter) -> Result<Vec<Project>, String> {
    let projects = repo(state).list().await.map_err(|e| e.to_string())?;
    Ok(filter.apply(projects))
}

pub async fn get_project(state: &AppState, id: Uuid) -> Result<Option<Project>, String> {
    repo(state).find_by_id(id).await.map_err(|e| e.to_string())
}

/// Create a project
pub async fn create_project(
    state: &AppState,
    title: String,
    category: ProjectCategory,
    location: Option<String>,
    year: Option<i32>,
) -> Result<Project, String> {
    let mut project = Project::new(title, category);
    project.location = location;
    project.year = year;

    match repo(state).create(&project).await {
        Ok(created) => {
            state.notifier.notify(Notice::success("projects", "Project created"));
            Ok(created)
        }
        Err(e) => {
            state
                .notifier
                .notify(Notice::error("projects", format!("Failed to create project: {}", e)));
            Err(e.to_string())
        }
    }
}

/// Save every field of `project`
pub async fn update_project(state: &AppState, project: Project) -> Result<Project, String> {
    let saved = repo(state).update(&project).await.map_err(|e| e.to_string())?;
    state.notifier.notify(Notice::success("projects", "Project saved"));
    Ok(saved)
}

pub async fn delete_project(state: &AppState, id: Uuid) -> Result<(), String> {
    repo(state).delete(id).await.map_err(|e| e.to_string())?;
    state.notifier.notify(Notice::success("projects", "Project deleted"));
    Ok(())
}
