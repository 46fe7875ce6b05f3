mod config;
mod consultants;
mod db;
mod documents;
mod errors;
mod llm_client;
mod matching;
mod models;
mod requests;
mod routes;
mod search;
mod skills;
mod state;
mod statistics;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::matching::events::{match_event_channel, spawn_match_worker};
use crate::matching::service::SkillMatchingService;
use crate::routes::build_router;
use crate::search::{LexiconConfig, SearchLexicon};
use crate::skills::{PgSkillSource, SkillCatalog};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Matchmaker API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL (runs migrations)
    let db = create_pool(&config.database_url).await?;

    // Initialize S3 / MinIO
    let s3 = build_s3_client(&config).await;
    info!("S3 client initialized");

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Synonym maps are read once; the lexicon never changes while running
    let lexicon = match &config.search_lexicon_path {
        Some(path) => SearchLexicon::new(LexiconConfig::from_file(path)?),
        None => {
            info!("SEARCH_LEXICON_PATH not set, customer and industry synonyms disabled");
            SearchLexicon::empty()
        }
    };
    let lexicon = Arc::new(lexicon);

    let skills = Arc::new(SkillCatalog::new(Arc::new(PgSkillSource::new(db.clone()))));

    // Background match worker, fed by project request uploads
    let (match_events, match_rx) = match_event_channel();
    let matcher = Arc::new(SkillMatchingService::new(
        db.clone(),
        Arc::clone(&skills),
        Arc::clone(&lexicon),
        config.match_limit,
    ));
    let _worker = spawn_match_worker(match_rx, matcher);

    // Build app state
    let state = AppState {
        db,
        s3,
        llm: Arc::new(llm),
        config: config.clone(),
        skills,
        lexicon,
        match_events,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the frontend host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "matchmaker-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::new(&s3_config)
}
