// Skill catalog: canonical skill names shared by CV ingestion and matching.

pub mod catalog;
pub mod handlers;

pub use catalog::{PgSkillSource, SkillCatalog, SkillNameRow, SkillSource};
