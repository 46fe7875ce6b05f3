use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use sqlx::PgPool;

use crate::config::Config;
use crate::llm_client::LanguageModel;
use crate::matching::events::MatchEventPublisher;
use crate::search::SearchLexicon;
use crate::skills::SkillCatalog;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub s3: S3Client,
    pub llm: Arc<dyn LanguageModel>,
    pub config: Config,
    /// Lazily loaded canonical skill names. Invalidated after CV uploads.
    pub skills: Arc<SkillCatalog>,
    /// Immutable after startup; no locking needed.
    pub lexicon: Arc<SearchLexicon>,
    /// Fire-and-forget trigger for the background match worker.
    pub match_events: MatchEventPublisher,
}
