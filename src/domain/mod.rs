//! Domain Layer
//!
//! Contains all domain entities and core abstractions.
//! Entities are plain serde structs; rows are validated on the way in and out.

mod entity;
mod hero_slide;
mod logo;
mod page_hero;
mod project;

pub use entity::{DomainError, DomainResult, Entity, Positioned, Record, TableRecord};
pub use hero_slide::HeroSlide;
pub use logo::ClientLogo;
pub use page_hero::{Page, PageHero};
pub use project::{Project, ProjectCategory};
