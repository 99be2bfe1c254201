use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::normalize_path::NormalizePathLayer;
use tower_http::trace::TraceLayer;

/// Build and configure the application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Admin routes
        .route("/admin/cache/stats", get(handlers::cache_stats))
        .route("/admin/cache/clear", post(handlers::clear_cache))
        .route("/admin/cache/cleanup", post(handlers::clean_expired))
        .route("/admin/cache/entries/{key}", delete(handlers::invalidate_entry))
        // Translation routes
        .route("/translate", post(handlers::translate))
        .route("/menu/translate", post(handlers::translate_menu))
        // Middleware
        .layer(NormalizePathLayer::trim_trailing_slash())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use lingua::i18n::MenuCatalog;
    use lingua::language::{LanguageCapability, StaticLanguageProvider};
    use lingua::{ExpirationPolicy, SystemClock, Translator};
    use serde_json::{Value, json};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use storage_engine::MokaStore;
    use tower::ServiceExt;

    #[derive(Default)]
    struct EchoTranslator {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Translator for EchoTranslator {
        async fn translate(&self, text: &str, target_language: &str) -> shared::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("[{}] {}", target_language, text))
        }
    }

    /// Returns the text unchanged, like a provider handed a proper noun.
    struct VerbatimTranslator;

    #[async_trait]
    impl Translator for VerbatimTranslator {
        async fn translate(&self, text: &str, _target_language: &str) -> shared::Result<String> {
            Ok(text.to_string())
        }
    }

    fn app() -> (Router, Arc<EchoTranslator>) {
        let translator = Arc::new(EchoTranslator::default());
        (app_with(translator.clone()), translator)
    }

    fn app_with(translator: Arc<dyn Translator>) -> Router {
        let clock = Arc::new(SystemClock);
        let store = Arc::new(MokaStore::new(
            "routes-test",
            None,
            ExpirationPolicy::default(),
            clock.clone(),
        ));
        let languages: Vec<String> = ["en", "ru", "th"].iter().map(|s| s.to_string()).collect();
        let provider = StaticLanguageProvider::new("en", &languages).unwrap();
        let menu = MenuCatalog::builder()
            .language_name("ru", "Русский")
            .entry("ru", "Home", "Главная")
            .build();

        let state = AppState::new(store, translator, clock)
            .with_languages(LanguageCapability::probe(Some(Arc::new(provider))))
            .with_menu(menu);
        build_router(state)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = app();
        let (status, body) = send(&app, empty("GET", "/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "OK");
        assert_eq!(body["languages_available"], true);
    }

    #[tokio::test]
    async fn test_translate_is_cached_across_requests() {
        let (app, translator) = app();
        let request = json!({"content": "Hello", "from": "en", "to": "ru"});

        let (status, body) = send(&app, post_json("/translate", request.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["content"], "[ru] Hello");
        assert_eq!(body["translated"], true);

        let (_, body) = send(&app, post_json("/translate", request)).await;
        assert_eq!(body["content"], "[ru] Hello");
        assert_eq!(translator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_translate_negotiates_target_language() {
        let (app, _) = app();
        let request = Request::builder()
            .method("POST")
            .uri("/translate")
            .header("content-type", "application/json")
            .header("accept-language", "ru-RU,ru;q=0.9,en;q=0.8")
            .body(Body::from(json!({"content": "Hello"}).to_string()))
            .unwrap();

        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["language"], "ru");
        assert_eq!(body["content"], "[ru] Hello");
    }

    #[tokio::test]
    async fn test_translate_same_language_passes_through() {
        let (app, translator) = app();
        let (status, body) = send(
            &app,
            post_json("/translate", json!({"content": "Hello", "to": "en"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["content"], "Hello");
        assert_eq!(body["translated"], false);
        assert_eq!(translator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_identical_provider_answer_counts_as_translated() {
        let app = app_with(Arc::new(VerbatimTranslator));
        let request = json!({"content": "Lingua", "from": "en", "to": "ru"});

        let (status, body) = send(&app, post_json("/translate", request.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["content"], "Lingua");
        assert_eq!(body["translated"], true);

        // Served from the cache the second time.
        let (_, body) = send(&app, post_json("/translate", request)).await;
        assert_eq!(body["translated"], true);
    }

    #[tokio::test]
    async fn test_translate_rejects_bad_input() {
        let (app, _) = app();
        let (status, _) = send(
            &app,
            post_json("/translate", json!({"content": "Hello", "to": "  "})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            &app,
            post_json(
                "/translate",
                json!({"content": "Hello", "to": "ru", "content_type": "sidebar"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("sidebar"));
    }

    #[tokio::test]
    async fn test_admin_cache_lifecycle() {
        let (app, _) = app();
        for content in ["One", "Two"] {
            send(
                &app,
                post_json("/translate", json!({"content": content, "to": "th"})),
            )
            .await;
        }

        let (status, stats) = send(&app, empty("GET", "/admin/cache/stats")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stats["total_entries"], 2);
        assert_eq!(stats["expired_count"], 0);
        assert_eq!(stats["backend"], "memory");

        let (_, cleanup) = send(&app, empty("POST", "/admin/cache/cleanup")).await;
        assert_eq!(cleanup["cleaned_count"], 0);

        let (_, cleared) = send(&app, empty("POST", "/admin/cache/clear")).await;
        assert_eq!(cleared["cleared_count"], 2);
    }

    #[tokio::test]
    async fn test_invalidate_entry() {
        let (app, _) = app();
        let (status, _) = send(&app, empty("DELETE", "/admin/cache/entries/not-a-key")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let absent = "0".repeat(64);
        let (status, body) = send(
            &app,
            empty("DELETE", &format!("/admin/cache/entries/{}", absent)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["deleted"], false);
    }

    #[tokio::test]
    async fn test_menu_translation() {
        let (app, _) = app();
        let (status, body) = send(
            &app,
            post_json(
                "/menu/translate",
                json!({"titles": ["Home", "#LANGUAGE#", "Contact"], "language": "ru"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["titles"], json!(["Главная", "Русский", "Contact"]));
    }
}
