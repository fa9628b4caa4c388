//! Hero Slide Entity
//!
//! One slide of the home page carousel.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entity::{
    require_non_empty, require_position, require_url, DomainResult, Entity, Positioned,
    TableRecord,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeroSlide {
    #[serde(default, skip_serializing_if = "Uuid::is_nil")]
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    pub image_url: String,
    /// Call-to-action button text
    #[serde(default)]
    pub cta_label: Option<String>,
    /// Call-to-action target (site path or URL)
    #[serde(default)]
    pub cta_href: Option<String>,
    #[serde(default)]
    pub position: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl HeroSlide {
    pub fn new(title: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            id: Uuid::nil(),
            title: title.into(),
            subtitle: None,
            image_url: image_url.into(),
            cta_label: None,
            cta_href: None,
            position: 0,
            created_at: None,
        }
    }
}

impl Entity for HeroSlide {
    type Id = Uuid;

    fn id(&self) -> Self::Id {
        self.id
    }
}

impl TableRecord for HeroSlide {
    const TABLE: &'static str = "hero_slides";
    const ORDER_BY: &'static str = "position";

    fn validate(&self) -> DomainResult<()> {
        require_non_empty("title", &self.title)?;
        require_url("image_url", &self.image_url)?;
        // Both or neither
        if self.cta_label.is_some() != self.cta_href.is_some() {
            return Err(super::DomainError::InvalidInput(
                "cta_label and cta_href must be set together".to_string(),
            ));
        }
        require_position(self.position)
    }
}

impl Positioned for HeroSlide {
    fn position(&self) -> i64 {
        self.position
    }

    fn set_position(&mut self, position: i64) {
        self.position = position;
    }
}
