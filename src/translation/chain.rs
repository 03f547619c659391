use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use super::llm::LlmTranslator;
use super::provider::TranslationProvider;
use crate::cache::{CacheStats, RequestCache};
use crate::locale::Locale;

/// Outcome of a translation attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TranslationResult {
    /// Translated text, or the input when nothing succeeded
    pub text: String,
    /// True when some provider produced a usable translation
    pub ok: bool,
    /// True when the winning provider was not the first in the chain
    pub used_fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

impl TranslationResult {
    pub fn untranslated(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ok: false,
            used_fallback: false,
            provider: None,
        }
    }
}

/// Providers tried in a fixed order; the first non-identity answer wins
///
/// Results are cached per `source:target:text` and concurrent requests for
/// the same key share one walk down the chain. Failed walks are handed to
/// every waiter but never cached.
pub struct TranslationChain {
    providers: Vec<Arc<dyn TranslationProvider>>,
    llm: Option<Arc<LlmTranslator>>,
    cache: RequestCache<TranslationResult, TranslationResult>,
}

impl TranslationChain {
    pub fn new(
        providers: Vec<Arc<dyn TranslationProvider>>,
        llm: Option<Arc<LlmTranslator>>,
        cache: RequestCache<TranslationResult, TranslationResult>,
    ) -> Self {
        Self {
            providers,
            llm,
            cache,
        }
    }

    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub async fn purge_expired(&self) -> usize {
        self.cache.purge_expired().await
    }

    /// Translate `text` into `target`; never fails, falls back to the input
    pub async fn translate(&self, text: &str, target: &str, source: &str) -> TranslationResult {
        if text.trim().is_empty() || source.eq_ignore_ascii_case(target) {
            return TranslationResult::untranslated(text);
        }

        let key = format!("{}:{}:{}", source, target, text);
        let providers = self.providers.clone();
        let (text, source, target) = (text.to_string(), source.to_string(), target.to_string());

        match self
            .cache
            .get_or_fetch(&key, move || walk_chain(providers, text, source, target))
            .await
        {
            Ok(result) | Err(result) => result,
        }
    }

    /// Translate English content for display in `locale`
    pub async fn translate_for_locale(&self, text: &str, locale: Locale) -> String {
        if text.is_empty() || locale.is_english() {
            return text.to_string();
        }
        self.translate(text, locale.code(), "auto").await.text
    }

    /// Translate ingredient lines, preserving order; items that fail stay as
    /// they were
    ///
    /// The LLM batch request is tried first when configured, then each item
    /// goes through the chain concurrently.
    pub async fn translate_batch(&self, items: &[String], locale: Locale) -> Vec<String> {
        if items.is_empty() || locale.is_english() {
            return items.to_vec();
        }

        if let Some(llm) = &self.llm {
            match llm.translate_list(items, locale).await {
                Ok(Some(translated)) => return translated,
                Ok(None) => tracing::debug!("LLM batch translation unusable, translating per item"),
                Err(e) => tracing::debug!("LLM batch translation failed: {}", e),
            }
        }

        self.translate_each(items, locale).await
    }

    /// Translate every item through the chain concurrently, preserving order
    pub async fn translate_each(&self, items: &[String], locale: Locale) -> Vec<String> {
        futures::future::join_all(
            items
                .iter()
                .map(|item| self.translate_for_locale(item, locale)),
        )
        .await
    }
}

async fn walk_chain(
    providers: Vec<Arc<dyn TranslationProvider>>,
    text: String,
    source: String,
    target: String,
) -> Result<TranslationResult, TranslationResult> {
    for (index, provider) in providers.iter().enumerate() {
        match provider.translate(&text, &source, &target).await {
            Ok(Some(translated)) if !translated.trim().is_empty() && translated != text => {
                tracing::debug!("Translated via {} ({} -> {})", provider.name(), source, target);
                return Ok(TranslationResult {
                    text: translated,
                    ok: true,
                    used_fallback: index > 0,
                    provider: Some(provider.name().to_string()),
                });
            }
            Ok(_) => tracing::debug!("{} returned no usable translation", provider.name()),
            Err(e) => tracing::debug!("{} translation attempt failed: {}", provider.name(), e),
        }
    }

    tracing::warn!(
        "All translation providers failed for {} -> {}, keeping original text",
        source,
        target
    );
    Err(TranslationResult::untranslated(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translation::provider::ProviderError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    enum Behaviour {
        Answer(&'static str),
        Tag,
        Echo,
        Nothing,
        Fail,
    }

    struct FakeProvider {
        name: &'static str,
        behaviour: Behaviour,
        calls: AtomicUsize,
    }

    impl FakeProvider {
        fn new(name: &'static str, behaviour: Behaviour) -> Arc<Self> {
            Arc::new(Self {
                name,
                behaviour,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl TranslationProvider for FakeProvider {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn translate(
            &self,
            text: &str,
            _source: &str,
            target: &str,
        ) -> Result<Option<String>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            match self.behaviour {
                Behaviour::Answer(answer) => Ok(Some(answer.to_string())),
                Behaviour::Tag => Ok(Some(format!("[{}] {}", target, text))),
                Behaviour::Echo => Ok(Some(text.to_string())),
                Behaviour::Nothing => Ok(None),
                Behaviour::Fail => Err(ProviderError::Status(500)),
            }
        }
    }

    fn chain(providers: Vec<Arc<FakeProvider>>) -> TranslationChain {
        chain_with_llm(providers, None)
    }

    fn chain_with_llm(
        providers: Vec<Arc<FakeProvider>>,
        llm: Option<Arc<LlmTranslator>>,
    ) -> TranslationChain {
        let providers = providers
            .into_iter()
            .map(|p| p as Arc<dyn TranslationProvider>)
            .collect();
        TranslationChain::new(
            providers,
            llm,
            RequestCache::in_memory("translation", Duration::from_secs(3600)),
        )
    }

    fn llm_for(server: &MockServer) -> Option<Arc<LlmTranslator>> {
        Some(Arc::new(LlmTranslator::new(
            reqwest::Client::new(),
            server.uri(),
            "key",
            "model",
        )))
    }

    fn completion(content: &str) -> serde_json::Value {
        serde_json::json!({"choices": [{"message": {"role": "assistant", "content": content}}]})
    }

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_first_provider_wins() {
        let google = FakeProvider::new("google", Behaviour::Answer("frango"));
        let libre = FakeProvider::new("libre", Behaviour::Answer("galinha"));
        let chain = chain(vec![google.clone(), libre.clone()]);

        let result = chain.translate("chicken", "pt", "auto").await;
        assert_eq!(result.text, "frango");
        assert!(result.ok);
        assert!(!result.used_fallback);
        assert_eq!(result.provider.as_deref(), Some("google"));
        assert_eq!(libre.calls(), 0);
    }

    #[tokio::test]
    async fn test_identity_and_errors_fall_through() {
        let google = FakeProvider::new("google", Behaviour::Echo);
        let libre = FakeProvider::new("libre", Behaviour::Fail);
        let llm = FakeProvider::new("llm", Behaviour::Nothing);
        let mymemory = FakeProvider::new("mymemory", Behaviour::Answer("pollo"));
        let chain = chain(vec![google, libre, llm, mymemory]);

        let result = chain.translate("chicken", "es", "auto").await;
        assert_eq!(result.text, "pollo");
        assert!(result.used_fallback);
        assert_eq!(result.provider.as_deref(), Some("mymemory"));
    }

    #[tokio::test]
    async fn test_all_failing_returns_original_and_is_not_cached() {
        let google = FakeProvider::new("google", Behaviour::Fail);
        let chain = chain(vec![google.clone()]);

        let first = chain.translate("chicken", "pt", "auto").await;
        assert_eq!(first, TranslationResult::untranslated("chicken"));

        chain.translate("chicken", "pt", "auto").await;
        assert_eq!(google.calls(), 2);
    }

    #[tokio::test]
    async fn test_success_is_cached_and_deduplicated() {
        let google = FakeProvider::new("google", Behaviour::Answer("ovo"));
        let chain = chain(vec![google.clone()]);

        let (a, b, c) = tokio::join!(
            chain.translate("egg", "pt", "auto"),
            chain.translate("egg", "pt", "auto"),
            chain.translate("egg", "pt", "auto"),
        );
        assert_eq!(a.text, "ovo");
        assert_eq!(a, b);
        assert_eq!(b, c);

        chain.translate("egg", "pt", "auto").await;
        assert_eq!(google.calls(), 1);
    }

    #[tokio::test]
    async fn test_english_and_empty_skip_providers() {
        let google = FakeProvider::new("google", Behaviour::Answer("x"));
        let chain = chain(vec![google.clone()]);

        assert_eq!(chain.translate_for_locale("Pasta", Locale::En).await, "Pasta");
        assert_eq!(chain.translate_for_locale("", Locale::Pt).await, "");
        assert_eq!(chain.translate("   ", "pt", "auto").await.ok, false);
        assert_eq!(chain.translate("Pasta", "pt", "PT").await.text, "Pasta");
        assert_eq!(google.calls(), 0);
    }

    #[tokio::test]
    async fn test_batch_preserves_order_and_falls_back_per_item() {
        let google = FakeProvider::new("google", Behaviour::Echo);
        let chain = chain(vec![google]);

        let items = vec!["1 egg".to_string(), "salt".to_string()];
        assert_eq!(chain.translate_batch(&items, Locale::Pt).await, items);
        assert_eq!(chain.translate_batch(&items, Locale::En).await, items);
        assert!(chain.translate_batch(&[], Locale::Es).await.is_empty());
    }

    #[tokio::test]
    async fn test_batch_uses_llm_answer_when_lengths_match() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(completion(r#"["2 ovos", "sal a gosto"]"#)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let google = FakeProvider::new("google", Behaviour::Tag);
        let chain = chain_with_llm(vec![google.clone()], llm_for(&server));

        let translated = chain
            .translate_batch(&lines(&["2 eggs", "salt to taste"]), Locale::Pt)
            .await;
        assert_eq!(translated, lines(&["2 ovos", "sal a gosto"]));
        assert_eq!(google.calls(), 0);
    }

    #[tokio::test]
    async fn test_batch_falls_back_per_item_on_wrong_length() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(r#"["2 ovos"]"#)))
            .mount(&server)
            .await;

        let google = FakeProvider::new("google", Behaviour::Tag);
        let chain = chain_with_llm(vec![google.clone()], llm_for(&server));

        let items = lines(&["2 eggs", "salt to taste", "1 onion"]);
        assert_eq!(
            chain.translate_batch(&items, Locale::Es).await,
            lines(&["[es] 2 eggs", "[es] salt to taste", "[es] 1 onion"])
        );
        assert_eq!(google.calls(), 3);
    }

    #[tokio::test]
    async fn test_batch_falls_back_per_item_on_llm_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let google = FakeProvider::new("google", Behaviour::Tag);
        let chain = chain_with_llm(vec![google], llm_for(&server));

        assert_eq!(
            chain.translate_batch(&lines(&["flour", "milk"]), Locale::Pt).await,
            lines(&["[pt] flour", "[pt] milk"])
        );
    }

    #[tokio::test]
    async fn test_each_never_uses_llm_batch() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(r#"["x", "y"]"#)))
            .expect(0)
            .mount(&server)
            .await;

        let google = FakeProvider::new("google", Behaviour::Tag);
        let chain = chain_with_llm(vec![google], llm_for(&server));

        let steps = lines(&["Boil the pasta.", "Serve hot."]);
        assert_eq!(
            chain.translate_each(&steps, Locale::Pt).await,
            lines(&["[pt] Boil the pasta.", "[pt] Serve hot."])
        );
        assert_eq!(chain.translate_each(&steps, Locale::En).await, steps);
    }
}
