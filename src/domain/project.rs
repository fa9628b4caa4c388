//! Project Entity
//!
//! A completed or ongoing job shown on the projects and gallery pages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entity::{require_non_empty, require_url, DomainError, DomainResult, Entity, TableRecord};

/// Project category determines which filter tab shows it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProjectCategory {
    #[default]
    Residential,
    Commercial,
    Industrial,
    Renovation,
    Infrastructure,
}

impl ProjectCategory {
    pub const ALL: [ProjectCategory; 5] = [
        ProjectCategory::Residential,
        ProjectCategory::Commercial,
        ProjectCategory::Industrial,
        ProjectCategory::Renovation,
        ProjectCategory::Infrastructure,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectCategory::Residential => "residential",
            ProjectCategory::Commercial => "commercial",
            ProjectCategory::Industrial => "industrial",
            ProjectCategory::Renovation => "renovation",
            ProjectCategory::Infrastructure => "infrastructure",
        }
    }
}

impl std::str::FromStr for ProjectCategory {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProjectCategory::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::InvalidInput(format!("unknown project category '{}'", s)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default, skip_serializing_if = "Uuid::is_nil")]
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: ProjectCategory,
    #[serde(default)]
    pub location: Option<String>,
    /// Completion year
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub cover_image_url: Option<String>,
    /// Gallery image URLs, in display order
    #[serde(default)]
    pub gallery: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Project {
    pub fn new(title: impl Into<String>, category: ProjectCategory) -> Self {
        Self {
            id: Uuid::nil(),
            title: title.into(),
            description: String::new(),
            category,
            location: None,
            year: None,
            cover_image_url: None,
            gallery: Vec::new(),
            featured: false,
            created_at: None,
        }
    }

    /// Every image of the project, cover first
    pub fn images(&self) -> impl Iterator<Item = &str> {
        self.cover_image_url
            .iter()
            .map(String::as_str)
            .chain(self.gallery.iter().map(String::as_str))
    }
}

impl Entity for Project {
    type Id = Uuid;

    fn id(&self) -> Self::Id {
        self.id
    }
}

impl TableRecord for Project {
    const TABLE: &'static str = "projects";
    const ORDER_BY: &'static str = "created_at";

    fn validate(&self) -> DomainResult<()> {
        require_non_empty("title", &self.title)?;
        if let Some(cover) = &self.cover_image_url {
            require_url("cover_image_url", cover)?;
        }
        for url in &self.gallery {
            require_url("gallery", url)?;
        }
        if let Some(year) = self.year {
            if !(1900..=2100).contains(&year) {
                return Err(DomainError::InvalidInput(format!("year out of range: {}", year)));
            }
        }
        Ok(())
    }
}
