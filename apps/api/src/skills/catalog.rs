//! Skill Catalog — lazily loaded snapshot of every canonical skill name known to the system.
//!
//! The snapshot is loaded from a `SkillSource` on first use and published as an
//! immutable `Arc<HashSet<String>>`. Readers clone the `Arc` and never see a partially
//! built set. Two callers racing on an empty cache may both load, but only the first
//! published snapshot is kept and returned to both.
//!
//! `invalidate()` bumps a generation counter. A load that started under an older
//! generation still returns its set to its own caller but never caches it.
//!
//! `AppState` owns one `Arc<SkillCatalog>`; there is no global.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use tracing::{debug, info};

use crate::errors::AppError;

/// One distinct skill name as returned by the backing store.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SkillNameRow {
    pub skill_name: String,
}

/// Backing store for the catalog. Implementations return distinct names; the catalog
/// still normalizes them, so surrounding whitespace and casing are tolerated.
#[async_trait]
pub trait SkillSource: Send + Sync {
    async fn distinct_skill_names(&self) -> Result<Vec<SkillNameRow>, sqlx::Error>;
}

/// Reads skill names from `consultant_skills`.
pub struct PgSkillSource {
    pool: PgPool,
}

impl PgSkillSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SkillSource for PgSkillSource {
    async fn distinct_skill_names(&self) -> Result<Vec<SkillNameRow>, sqlx::Error> {
        sqlx::query_as::<_, SkillNameRow>(
            r#"
            SELECT DISTINCT TRIM(skill_name) AS skill_name
            FROM consultant_skills
            WHERE TRIM(skill_name) <> ''
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }
}

#[derive(Default)]
struct CatalogState {
    generation: u64,
    snapshot: Option<Arc<HashSet<String>>>,
}

pub struct SkillCatalog {
    source: Arc<dyn SkillSource>,
    state: RwLock<CatalogState>,
}

impl SkillCatalog {
    pub fn new(source: Arc<dyn SkillSource>) -> Self {
        Self {
            source,
            state: RwLock::new(CatalogState::default()),
        }
    }

    /// Returns the canonical (trimmed, uppercased) skill set, loading it on first use.
    /// Source errors are returned to the caller and nothing is cached.
    pub async fn all_uppercased(&self) -> Result<Arc<HashSet<String>>, AppError> {
        let generation = match self.cached() {
            Ok(cached) => return Ok(cached),
            Err(generation) => generation,
        };

        let rows = self.source.distinct_skill_names().await?;
        let loaded: HashSet<String> = rows
            .iter()
            .filter_map(|row| normalize_skill(&row.skill_name))
            .collect();
        debug!("Loaded {} canonical skills from source", loaded.len());

        Ok(self.publish(generation, Arc::new(loaded)))
    }

    /// Membership test against the catalog. The name is normalized before lookup.
    pub async fn contains_upper(&self, name: &str) -> Result<bool, AppError> {
        let Some(normalized) = normalize_skill(name) else {
            return Ok(false);
        };
        Ok(self.all_uppercased().await?.contains(&normalized))
    }

    /// Normalizes every candidate and keeps only those present in the catalog.
    /// Duplicates collapse and input order is lost.
    pub async fn normalize_and_filter<I, S>(&self, candidates: I) -> Result<HashSet<String>, AppError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let catalog = self.all_uppercased().await?;
        Ok(candidates
            .into_iter()
            .filter_map(|c| normalize_skill(c.as_ref()))
            .filter(|c| catalog.contains(c))
            .collect())
    }

    /// Drops the snapshot; the next read reloads from the source.
    /// Loads already in flight are not cached when they finish.
    pub fn invalidate(&self) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        state.generation += 1;
        if state.snapshot.take().is_some() {
            info!("Skill catalog invalidated");
        }
    }

    /// The cached snapshot, or the current generation when there is none.
    fn cached(&self) -> Result<Arc<HashSet<String>>, u64> {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        state.snapshot.clone().ok_or(state.generation)
    }

    /// First writer wins: a snapshot published by a concurrent loader is kept.
    /// A set loaded before the last `invalidate()` is handed back uncached.
    fn publish(&self, generation: u64, loaded: Arc<HashSet<String>>) -> Arc<HashSet<String>> {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        if state.generation != generation {
            debug!("Discarding skill set loaded before the catalog was invalidated");
            return loaded;
        }
        match state.snapshot.as_ref() {
            Some(existing) => Arc::clone(existing),
            None => {
                info!("Skill catalog populated with {} skills", loaded.len());
                state.snapshot = Some(Arc::clone(&loaded));
                loaded
            }
        }
    }
}

/// Canonical skill form: trimmed and uppercased. `None` for blank input.
pub fn normalize_skill(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_uppercase())
    }
}
