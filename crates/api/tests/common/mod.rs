#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use cast_api::app::build_router;
use cast_api::config::ServerConfig;
use cast_api::state::AppState;
use cast_llm::{CompletionRequest, ProviderError, TextGenerator};
use cast_pipeline::{GenerationConfig, ProfileGenerator};
use http_body_util::BodyExt;
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
    }
}

/// Provider that answers every prompt with the same two labelled fields.
pub struct StaticProvider;

#[async_trait]
impl TextGenerator for StaticProvider {
    fn name(&self) -> &str {
        "static"
    }

    async fn complete(&self, _request: &CompletionRequest) -> Result<String, ProviderError> {
        Ok("Motivation: Win back trust.\nVisual signature: Scarred left hand.".to_string())
    }
}

/// Build the full application router around the given generator.
pub fn build_test_app(generator: ProfileGenerator) -> Router {
    let state = AppState {
        config: Arc::new(test_config()),
        generator: Arc::new(generator),
    };
    build_router(state)
}

/// App with the static provider and no registry.
pub fn app_with_provider() -> Router {
    build_test_app(
        ProfileGenerator::new(GenerationConfig::default()).with_provider(Arc::new(StaticProvider)),
    )
}

/// App with every integration disabled.
pub fn app_without_integrations() -> Router {
    build_test_app(ProfileGenerator::new(GenerationConfig::default()))
}

pub const GENERATE_PATH: &str = "/api/v1/tools/generate_character_profiles";

/// POST a raw body and return the status, headers and parsed JSON body.
pub async fn post_raw(
    app: Router,
    body: impl Into<Body>,
) -> (StatusCode, axum::http::HeaderMap, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(GENERATE_PATH)
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap();
    (status, headers, json)
}

pub async fn post_json(
    app: Router,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let (status, _, json) = post_raw(app, body.to_string()).await;
    (status, json)
}

/// The two-scene example with Rhea, Marcus and a background Guard.
pub fn documented_body() -> serde_json::Value {
    serde_json::json!({
        "scene_list": [
            {
                "scene_number": 1,
                "primary_characters": ["Rhea", "Marcus"],
                "secondary_characters": ["Guard"],
                "goal": "Escape from prison"
            },
            {
                "scene_number": 2,
                "primary_characters": ["Rhea"],
                "secondary_characters": [],
                "goal": "Find the hidden treasure"
            }
        ],
        "concept_brief": {
            "genre_tags": ["adventure", "action"],
            "tone_keywords": ["suspenseful"],
            "core_conflict": "Fight against corruption"
        },
        "project_id": "test-project"
    })
}
