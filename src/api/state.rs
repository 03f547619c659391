use axum::extract::FromRef;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::{AuthService, InMemoryUserRepository};
use crate::cache::open_store;
use crate::config::AppConfig;
use crate::error::AppError;
use crate::library::{
    CommunityService, InMemoryCommunityRecipeRepository, InMemorySavedRecipeRepository,
    LibraryService,
};
use crate::locale::Locale;
use crate::recipes::{RecipeGenerator, RecipeService, RecipeSource, SpoonacularClient};
use crate::translation::TranslationChain;
use crate::websocket::{Broadcaster, WsState};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub recipes: Arc<RecipeService>,
    pub generator: Arc<RecipeGenerator>,
    pub translator: Arc<TranslationChain>,
    pub auth: Arc<AuthService>,
    pub library: Arc<LibraryService>,
    pub community: Arc<CommunityService>,
    pub ws: Arc<WsState>,
}

impl AppState {
    /// Wire the production services from configuration
    pub async fn build(config: AppConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .build()?;

        if config.spoonacular_api_key.is_empty() {
            tracing::warn!("SPOONACULAR_API_KEY not set: recipe lookups will fail, generator uses placeholders");
        }

        let translation_store =
            open_store(config.cache_dir.as_deref(), "translation", config.cache_ttl()).await;
        let translator = Arc::new(TranslationChain::from_config(
            &config,
            client.clone(),
            translation_store,
        ));
        let source = Arc::new(SpoonacularClient::new(
            client,
            config.spoonacular_base_url.clone(),
            config.spoonacular_api_key.clone(),
        ));

        Ok(Self::with_services(config, source, translator).await)
    }

    /// Assemble state around a given recipe source and translation chain
    pub async fn with_services(
        config: AppConfig,
        source: Arc<dyn RecipeSource>,
        translator: Arc<TranslationChain>,
    ) -> Self {
        let recipes = Arc::new(
            RecipeService::new(
                source,
                Arc::clone(&translator),
                config.cache_dir.as_deref(),
                config.cache_ttl(),
            )
            .await,
        );
        let generator = Arc::new(RecipeGenerator::new(Arc::clone(&recipes)));

        let broadcaster = Broadcaster::new();
        let auth = Arc::new(AuthService::new(Arc::new(InMemoryUserRepository::new())));
        let library = Arc::new(LibraryService::new(
            Arc::new(InMemorySavedRecipeRepository::new()),
            broadcaster.clone(),
        ));
        let community = Arc::new(CommunityService::new(
            Arc::new(InMemoryCommunityRecipeRepository::new()),
            broadcaster.clone(),
        ));
        let ws = Arc::new(WsState {
            broadcaster,
            auth: Arc::clone(&auth),
            library: Arc::clone(&library),
            community: Arc::clone(&community),
        });

        Self {
            config: Arc::new(config),
            recipes,
            generator,
            translator,
            auth,
            library,
            community,
            ws,
        }
    }

    /// Periodically drop expired entries from every response cache
    pub fn spawn_cache_sweeper(&self, every: Duration) -> tokio::task::JoinHandle<()> {
        let recipes = Arc::clone(&self.recipes);
        let translator = Arc::clone(&self.translator);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + every, every);
            loop {
                interval.tick().await;
                let (recipe_entries, translations) =
                    tokio::join!(recipes.purge_expired(), translator.purge_expired());
                if recipe_entries + translations > 0 {
                    tracing::debug!(
                        "Cache sweep removed {} recipe and {} translation entries",
                        recipe_entries,
                        translations
                    );
                }
            }
        })
    }

    /// Locale from a query parameter, or the configured default
    pub fn locale(&self, raw: Option<&str>) -> Result<Locale, AppError> {
        match raw.map(str::trim).filter(|raw| !raw.is_empty()) {
            Some(raw) => raw
                .parse()
                .map_err(|e: crate::locale::UnknownLocale| AppError::Validation(e.to_string())),
            None => Ok(self.config.default_locale),
        }
    }
}

impl FromRef<AppState> for Arc<AuthService> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.auth)
    }
}

impl FromRef<AppState> for Arc<WsState> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.ws)
    }
}
