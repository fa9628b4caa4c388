//! Project Filtering
//!
//! Search box plus category tab of the projects page.

use crate::domain::{DomainResult, Project, ProjectCategory};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectFilter {
    /// Case-insensitive substring over title, location and description
    pub query: String,
    /// `None` shows every category
    pub category: Option<ProjectCategory>,
}

impl ProjectFilter {
    /// Build from raw inputs; an empty or "all" category matches everything
    pub fn parse(query: Option<&str>, category: Option<&str>) -> DomainResult<Self> {
        let category = match category.map(str::trim) {
            None | Some("") => None,
            Some(c) if c.eq_ignore_ascii_case("all") => None,
            Some(c) => Some(c.parse()?),
        };
        Ok(Self {
            query: query.unwrap_or_default().trim().to_lowercase(),
            category,
        })
    }

    pub fn matches(&self, project: &Project) -> bool {
        if let Some(category) = self.category {
            if project.category != category {
                return false;
            }
        }
        if self.query.is_empty() {
            return true;
        }
        let needle = self.query.to_lowercase();
        [
            Some(project.title.as_str()),
            project.location.as_deref(),
            Some(project.description.as_str()),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
    }

    /// Matching projects, newest first
    pub fn apply(&self, projects: Vec<Project>) -> Vec<Project> {
        let mut matched: Vec<Project> = projects.into_iter().filter(|p| self.matches(p)).collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matched
    }
}
