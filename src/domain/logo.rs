//! Client Logo Entity
//!
//! A client's logo on the home page wall. Display order is `position`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entity::{
    require_non_empty, require_position, require_url, DomainResult, Entity, Positioned,
    TableRecord,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientLogo {
    /// Assigned by the store; nil until created
    #[serde(default, skip_serializing_if = "Uuid::is_nil")]
    pub id: Uuid,
    /// Client name (alt text)
    pub name: String,
    /// Public URL of the logo image
    pub image_url: String,
    /// Optional link to the client's site
    #[serde(default)]
    pub link_url: Option<String>,
    /// Rank on the logo wall
    #[serde(default)]
    pub position: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl ClientLogo {
    /// Create an unsaved logo
    pub fn new(name: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            id: Uuid::nil(),
            name: name.into(),
            image_url: image_url.into(),
            link_url: None,
            position: 0,
            created_at: None,
        }
    }

    pub fn with_link(mut self, link_url: impl Into<String>) -> Self {
        self.link_url = Some(link_url.into());
        self
    }
}

impl Entity for ClientLogo {
    type Id = Uuid;

    fn id(&self) -> Self::Id {
        self.id
    }
}

impl TableRecord for ClientLogo {
    const TABLE: &'static str = "client_logos";
    const ORDER_BY: &'static str = "position";

    fn validate(&self) -> DomainResult<()> {
        require_non_empty("name", &self.name)?;
        require_url("image_url", &self.image_url)?;
        if let Some(link) = &self.link_url {
            require_url("link_url", link)?;
        }
        require_position(self.position)
    }
}

impl Positioned for ClientLogo {
    fn position(&self) -> i64 {
        self.position
    }

    fn set_position(&mut self, position: i64) {
        self.position = position;
    }
}
