//! Page Hero Entity
//!
//! Banner image of a marketing page. One row per page, keyed by `page`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entity::{require_url, DomainError, DomainResult, Entity, TableRecord};

/// Marketing pages that carry a hero image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    Home,
    About,
    Projects,
    Gallery,
    Contact,
}

impl Page {
    pub const ALL: [Page; 5] = [Page::Home, Page::About, Page::Projects, Page::Gallery, Page::Contact];

    pub fn as_str(&self) -> &'static str {
        match self {
            Page::Home => "home",
            Page::About => "about",
            Page::Projects => "projects",
            Page::Gallery => "gallery",
            Page::Contact => "contact",
        }
    }
}

impl std::fmt::Display for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Page {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Page::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::InvalidInput(format!("unknown page '{}'", s)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageHero {
    #[serde(default, skip_serializing_if = "Uuid::is_nil")]
    pub id: Uuid,
    pub page: Page,
    pub image_url: String,
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl PageHero {
    pub fn new(page: Page, image_url: impl Into<String>) -> Self {
        Self {
            id: Uuid::nil(),
            page,
            image_url: image_url.into(),
            headline: None,
            updated_at: None,
        }
    }
}

impl Entity for PageHero {
    type Id = Uuid;

    fn id(&self) -> Self::Id {
        self.id
    }
}

impl TableRecord for PageHero {
    const TABLE: &'static str = "page_heroes";
    const ORDER_BY: &'static str = "page";

    fn validate(&self) -> DomainResult<()> {
        require_url("image_url", &self.image_url)
    }
}
