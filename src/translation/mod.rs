//! Multi-provider translation with an ordered fallback chain
//!
//! Order: Google (keyless endpoint) → LibreTranslate → LLM chat completion
//! (only with an API key) → MyMemory.

pub mod chain;
pub mod google;
pub mod libre;
pub mod llm;
pub mod mymemory;
pub mod provider;

pub use chain::{TranslationChain, TranslationResult};
pub use google::GoogleTranslate;
pub use libre::LibreTranslate;
pub use llm::LlmTranslator;
pub use mymemory::MyMemory;
pub use provider::{ProviderError, TranslationProvider};

use std::sync::Arc;

use crate::cache::{PersistentStore, RequestCache};
use crate::config::AppConfig;

impl TranslationChain {
    /// Assemble the production chain from configuration
    pub fn from_config(
        config: &AppConfig,
        client: reqwest::Client,
        persistent: Option<Arc<dyn PersistentStore>>,
    ) -> Self {
        let llm = config.llm_enabled().then(|| {
            Arc::new(LlmTranslator::new(
                client.clone(),
                config.llm_base_url.clone(),
                config.llm_api_key.clone(),
                config.llm_model.clone(),
            ))
        });

        let mut providers: Vec<Arc<dyn TranslationProvider>> = vec![
            Arc::new(GoogleTranslate::new(
                client.clone(),
                config.google_translate_url.clone(),
            )),
            Arc::new(LibreTranslate::new(
                client.clone(),
                config.libretranslate_url.clone(),
            )),
        ];
        if let Some(llm) = &llm {
            providers.push(llm.clone());
        }
        providers.push(Arc::new(MyMemory::new(client, config.mymemory_url.clone())));

        let cache = RequestCache::new("translation", persistent, config.cache_ttl());
        let chain = Self::new(providers, llm, cache);
        tracing::info!("Translation chain: {}", chain.provider_names().join(" -> "));
        chain
    }
}
