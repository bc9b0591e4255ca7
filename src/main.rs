//! Dual AI Phishing Detector API
//!
//! Serves two pre-trained classifiers over HTTP: one for email text,
//! one for URLs.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                   PHISHGUARD API (Axum)                  │
//! ├──────────────────────────────────────────────────────────┤
//! │  handlers ──► Aggregator ──► Inference ──► Classifiers   │
//! │                                 │           (ONNX)       │
//! │                                 ▼                        │
//! │                  URL features / TF-IDF vectorizer        │
//! │                                                          │
//! │  Model Registry (Arc, read-only) ◄── Artifact Store      │
//! └──────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod handlers;
mod logic;
mod models;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use logic::artifacts::ArtifactStore;
use logic::model::ModelRegistry;

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    init_tracing(config.is_production());

    tracing::info!("Dual AI Phishing Detector starting...");
    tracing::info!("Models directory: {}", config.models_dir.display());

    // Fetch missing artifacts, then load whatever is on disk
    let store = ArtifactStore::new(&config.models_dir);
    let fetched = store.fetch_missing(&config.sources, config.download_timeout()).await;
    if fetched > 0 {
        tracing::info!("Fetched {} artifact(s)", fetched);
    }

    let sources = config.sources.clone();
    let registry = tokio::task::spawn_blocking(move || ModelRegistry::load(&store, &sources)).await?;

    let state = AppState {
        registry: Arc::new(registry),
    };

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 API ready, listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(json: bool) {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "phishguard=debug,tower_http=debug".into()))
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(|| tracing_subscriber::fmt::layer()))
        .init();
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ModelRegistry>,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::health::root))
        .route("/healthz", get(handlers::health::check))
        .route("/stats", get(handlers::stats::training))
        // Browser extension
        .route("/predict", post(handlers::predict::extension))
        .route("/predict/url", post(handlers::predict::url))
        .route("/predict/email", post(handlers::predict::email))
        .route("/predict/dual", post(handlers::predict::dual))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::logic::model::classifier::stub::StubClassifier;
    use crate::logic::text::TfidfVectorizer;

    fn vectorizer() -> TfidfVectorizer {
        TfidfVectorizer::from_json(br#"{"vocabulary": {"verify": 0}, "idf": [1.0]}"#).unwrap()
    }

    fn app(registry: ModelRegistry) -> Router {
        create_router(AppState { registry: Arc::new(registry) })
    }

    fn full_registry() -> ModelRegistry {
        ModelRegistry::empty()
            .with_email_model(StubClassifier::new(1, 0.1, 0.9))
            .with_email_vectorizer(vectorizer())
            .with_url_model(StubClassifier::new(0, 0.75, 0.25))
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, String) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let (status, text) = send(app, request).await;
        (status, serde_json::from_str(&text).unwrap())
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let (status, text) = send(app, request).await;
        (status, serde_json::from_str(&text).unwrap())
    }

    #[tokio::test]
    async fn test_root_and_health() {
        let (status, body) = get_json(app(ModelRegistry::empty()), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "Dual AI Phishing Detector API");
        assert_eq!(body["email_model"], false);

        let (status, body) = get_json(app(full_registry()), "/healthz").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["email_model"], true);
        assert_eq!(body["url_model"], true);
    }

    #[tokio::test]
    async fn test_stats() {
        let (status, body) = get_json(app(ModelRegistry::empty()), "/stats").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_datasets"], 9);
        assert_eq!(body["url"]["test_samples"], 46_998);
    }

    #[tokio::test]
    async fn test_predict_url() {
        let request = Request::builder()
            .method("POST")
            .uri("/predict/url")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"url": "http://192.168.1.1/login"}"#))
            .unwrap();
        let (status, text) = send(app(full_registry()), request).await;

        assert_eq!(status, StatusCode::OK);
        assert!(text.contains(r#""probabilities":{"phishing":0.75,"legitimate":0.25}"#));

        let body: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(body["prediction"], "phishing");
        assert_eq!(body["features_used"].as_array().unwrap().len(), 6);
        assert_eq!(body["features_used"][3], "Symbol@");
    }

    #[tokio::test]
    async fn test_predict_url_unavailable() {
        let (status, body) = post_json(
            app(ModelRegistry::empty()),
            "/predict/url",
            serde_json::json!({"url": "https://example.com"}),
        ).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], 503);
    }

    #[tokio::test]
    async fn test_predict_email() {
        let (status, body) = post_json(
            app(full_registry()),
            "/predict/email",
            serde_json::json!({"text": "please verify"}),
        ).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["prediction"], "phishing");

        let (status, body) = post_json(
            app(ModelRegistry::empty()),
            "/predict/email",
            serde_json::json!({"text": "hello"}),
        ).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "Email model not available");
    }

    #[tokio::test]
    async fn test_predict_dual() {
        let (status, body) = post_json(
            app(full_registry()),
            "/predict/dual",
            serde_json::json!({"text": "verify at https://bit.ly/x now"}),
        ).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["overall"], "phishing");
        assert_eq!(body["urls_found"], serde_json::json!(["https://bit.ly/x"]));
        assert_eq!(body["url_analyses"][0]["prediction"], "phishing");
        assert_eq!(body["url_analyses"][0]["features_used"].as_array().unwrap().len(), 6);
        assert_eq!(body["email"]["prediction"], "phishing");
    }

    #[tokio::test]
    async fn test_predict_dual_email_only_registry() {
        let registry = ModelRegistry::empty()
            .with_email_model(StubClassifier::new(0, 0.8, 0.2))
            .with_email_vectorizer(vectorizer());

        let (status, body) = post_json(
            app(registry),
            "/predict/dual",
            serde_json::json!({"text": "lunch at noon"}),
        ).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["overall"], "safe");
        assert_eq!(body["url_analyses"], serde_json::json!([]));

        let registry = ModelRegistry::empty()
            .with_email_model(StubClassifier::new(0, 0.8, 0.2))
            .with_email_vectorizer(vectorizer());
        let (status, _) = post_json(
            app(registry),
            "/predict/dual",
            serde_json::json!({"text": "see https://example.com"}),
        ).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_email_and_dual_agree() {
        let text = serde_json::json!({"text": "verify your account"});
        let (_, email) = post_json(app(full_registry()), "/predict/email", text.clone()).await;
        let (_, dual) = post_json(app(full_registry()), "/predict/dual", text).await;
        assert_eq!(email, dual["email"]);
    }

    #[tokio::test]
    async fn test_predict_extension() {
        let (status, body) = post_json(
            app(ModelRegistry::empty()),
            "/predict",
            serde_json::json!({"text": "   "}),
        ).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "text is required");

        let (status, body) = post_json(
            app(ModelRegistry::empty()),
            "/predict",
            serde_json::json!({"text": "https://evil.example"}),
        ).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({"label": 0, "phishing_probability": 0.0}));
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let request = Request::builder()
            .method("OPTIONS")
            .uri("/predict")
            .header("origin", "chrome-extension://abc")
            .header("access-control-request-method", "POST")
            .body(Body::empty())
            .unwrap();
        let response = app(ModelRegistry::empty()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
    }
}
