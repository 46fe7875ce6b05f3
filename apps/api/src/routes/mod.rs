pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::consultants::handlers as consultants;
use crate::matching::handlers as matching;
use crate::requests::handlers as requests;
use crate::search::handlers as search;
use crate::skills::handlers as skills;
use crate::state::AppState;
use crate::statistics;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Consultants
        .route(
            "/api/v1/consultants",
            get(consultants::handle_list_consultants).post(consultants::handle_upload_cv),
        )
        .route(
            "/api/v1/consultants/search",
            get(search::handle_search_consultants),
        )
        .route(
            "/api/v1/consultants/:id",
            get(consultants::handle_get_consultant),
        )
        // Project requests and matching
        .route(
            "/api/v1/project-requests",
            get(requests::handle_list_requests).post(requests::handle_upload_request),
        )
        .route(
            "/api/v1/project-requests/:id",
            get(requests::handle_get_request),
        )
        .route(
            "/api/v1/project-requests/:id/matches",
            get(matching::handle_get_matches),
        )
        .route(
            "/api/v1/project-requests/:id/rematch",
            post(matching::handle_rematch),
        )
        // Skill catalog and lexicon
        .route("/api/v1/skills", get(skills::handle_list_skills))
        .route("/api/v1/skills/refresh", post(skills::handle_refresh_skills))
        .route("/api/v1/industries", get(search::handle_list_industries))
        .route(
            "/api/v1/industries/detect",
            post(search::handle_detect_industries),
        )
        .route("/api/v1/statistics", get(statistics::handle_statistics))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;

    use aws_sdk_s3::config::{BehaviorVersion, Region};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use crate::config::{Config, DEFAULT_MATCH_LIMIT};
    use crate::llm_client::tests::ScriptedModel;
    use crate::matching::events::match_event_channel;
    use crate::search::{LexiconConfig, SearchLexicon};
    use crate::skills::catalog::tests::CountingSource;
    use crate::skills::SkillCatalog;

    fn test_config() -> Config {
        Config {
            database_url: "postgres://localhost/matchmaker_test".to_string(),
            s3_bucket: "test-bucket".to_string(),
            s3_endpoint: "http://localhost:9000".to_string(),
            aws_access_key_id: "test".to_string(),
            aws_secret_access_key: "test".to_string(),
            anthropic_api_key: "test".to_string(),
            port: 0,
            rust_log: "info".to_string(),
            search_lexicon_path: None,
            match_limit: DEFAULT_MATCH_LIMIT,
        }
    }

    /// State whose database pool never connects; only DB-free routes are exercised.
    fn test_state() -> AppState {
        let config = test_config();
        let db = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .unwrap();
        let s3 = aws_sdk_s3::Client::from_conf(
            aws_sdk_s3::Config::builder()
                .behavior_version(BehaviorVersion::latest())
                .region(Region::new("us-east-1"))
                .build(),
        );
        let lexicon = SearchLexicon::new(LexiconConfig {
            customers: HashMap::new(),
            industries: HashMap::from([(
                "finance".to_string(),
                vec!["bank".to_string(), "finans".to_string()],
            )]),
        });
        let (match_events, _rx) = match_event_channel();

        AppState {
            db,
            s3,
            llm: Arc::new(ScriptedModel::replying(vec![])),
            config,
            skills: Arc::new(SkillCatalog::new(Arc::new(CountingSource::new(&[
                "Rust", "kotlin",
            ])))),
            lexicon: Arc::new(lexicon),
            match_events,
        }
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = build_router(test_state())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_detect_industries_endpoint() {
        let request = Request::post("/api/v1/industries/detect")
            .header("content-type", "application/json")
            .body(Body::from(
                r#"{"text": "Prosjekt i bank og finans for Sparebank1"}"#,
            ))
            .unwrap();
        let response = build_router(test_state()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await["industries"],
            serde_json::json!(["finance"])
        );
    }

    #[tokio::test]
    async fn test_list_skills_is_sorted_and_canonical() {
        let response = build_router(test_state())
            .oneshot(Request::get("/api/v1/skills").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, serde_json::json!(["KOTLIN", "RUST"]));
    }

    #[tokio::test]
    async fn test_refresh_skills_returns_no_content() {
        let response = build_router(test_state())
            .oneshot(
                Request::post("/api/v1/skills/refresh")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_search_with_unknown_skill_short_circuits() {
        let response = build_router(test_state())
            .oneshot(
                Request::get("/api/v1/consultants/search?skill=cobol")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, serde_json::json!([]));
    }
}
