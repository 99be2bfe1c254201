use crate::translator::{GoogleTranslator, UnavailableTranslator};
use lingua::i18n::MenuCatalog;
use lingua::language::{LanguageCapability, StaticLanguageProvider};
use lingua::{
    AdminOperations, CacheAdmin, CacheSettings, CacheStore, Clock, SystemClock, TenantScope,
    TranslationService, Translator,
};
use shared::config::Config;
use shared::Result;
use std::sync::Arc;
use std::time::Duration;
use storage_engine::UnifiedStorageFactory;

/// Server state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub translation: TranslationService,
    pub admin: Arc<dyn AdminOperations>,
    pub languages: LanguageCapability,
    pub menu: Arc<MenuCatalog>,
    pub tenant: TenantScope,
    pub translator_available: bool,
}

impl AppState {
    pub fn new(
        store: Arc<dyn CacheStore>,
        translator: Arc<dyn Translator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            translation: TranslationService::new(store.clone(), translator),
            admin: Arc::new(CacheAdmin::new(store, clock)),
            languages: LanguageCapability::Unavailable,
            menu: Arc::new(MenuCatalog::default()),
            tenant: TenantScope::global(),
            translator_available: true,
        }
    }

    pub fn with_languages(mut self, languages: LanguageCapability) -> Self {
        self.languages = languages;
        self
    }

    pub fn with_menu(mut self, menu: MenuCatalog) -> Self {
        self.menu = Arc::new(menu);
        self
    }

    pub fn with_tenant(mut self, tenant: TenantScope) -> Self {
        self.tenant = tenant;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.translation = self.translation.with_timeout(timeout);
        self
    }

    pub fn with_translator_available(mut self, available: bool) -> Self {
        self.translator_available = available;
        self
    }

    /// Wires the configured store, provider, languages and menu catalog.
    pub fn from_config(config: &Config) -> Result<Self> {
        let (translator, available): (Arc<dyn Translator>, bool) = match &config.google_api_key {
            Some(key) => (
                Arc::new(GoogleTranslator::new(
                    &config.google_endpoint,
                    key,
                    config.translate_timeout,
                )?),
                true,
            ),
            None => {
                tracing::warn!(
                    "LINGUA_GOOGLE_API_KEY not set, content will be served untranslated"
                );
                (Arc::new(UnavailableTranslator), false)
            }
        };
        let state = Self::from_config_with_translator(config, translator)?;
        Ok(state.with_translator_available(available))
    }

    /// Wires everything but the provider. An unusable cache location leaves
    /// the server translating without a cache rather than refusing to start.
    pub fn from_config_with_translator(
        config: &Config,
        translator: Arc<dyn Translator>,
    ) -> Result<Self> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let factory = UnifiedStorageFactory::new(clock.clone());
        let store = factory.create_or_passthrough(&CacheSettings::from(config));

        let provider = StaticLanguageProvider::new(&config.default_language, &config.languages)?;
        let languages = LanguageCapability::probe(Some(Arc::new(provider)));

        let menu = match &config.menu_catalog_path {
            Some(path) => {
                let catalog = MenuCatalog::load(path)?;
                tracing::info!("Loaded menu catalog from {}", path.display());
                catalog
            }
            None => MenuCatalog::default(),
        };

        Ok(Self::new(store, translator, clock)
            .with_timeout(config.translate_timeout)
            .with_languages(languages)
            .with_menu(menu)
            .with_tenant(TenantScope::new(
                config.site_id.clone(),
                config.network_id.clone(),
            )))
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("translation", &self.translation)
            .field("languages", &self.languages)
            .field("tenant", &self.tenant)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_router;
    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use serde_json::{Value, json};
    use std::collections::HashMap;
    use std::path::Path;
    use tower::ServiceExt;

    struct EchoTranslator;

    #[async_trait]
    impl Translator for EchoTranslator {
        async fn translate(&self, text: &str, target_language: &str) -> Result<String> {
            Ok(format!("[{}] {}", target_language, text))
        }
    }

    fn config_with_cache_dir(cache_dir: &Path) -> Config {
        let vars = HashMap::from([(
            "LINGUA_CACHE_DIR".to_string(),
            cache_dir.display().to_string(),
        )]);
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    fn blocked_cache_dir(root: &Path) -> std::path::PathBuf {
        let occupied = root.join("occupied");
        std::fs::write(&occupied, "a file, not a directory").unwrap();
        occupied.join("cache")
    }

    #[test]
    fn test_unusable_cache_dir_does_not_block_startup() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = config_with_cache_dir(&blocked_cache_dir(temp_dir.path()));

        let state = AppState::from_config(&config).unwrap();
        assert_eq!(state.translation.store().backend_type(), "passthrough");
        assert!(!state.translator_available);
    }

    #[tokio::test]
    async fn test_translates_without_cache_when_store_is_unusable() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = config_with_cache_dir(&blocked_cache_dir(temp_dir.path()));
        let state =
            AppState::from_config_with_translator(&config, Arc::new(EchoTranslator)).unwrap();
        let app = build_router(state);

        let request = Request::builder()
            .method("POST")
            .uri("/translate")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({"content": "Hello", "from": "en", "to": "ru"}).to_string(),
            ))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["content"], "[ru] Hello");
        assert_eq!(body["translated"], true);

        let request = Request::builder()
            .uri("/admin/cache/stats")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
