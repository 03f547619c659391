use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::locale::Locale;

/// Application configuration, loaded from the environment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Socket address the HTTP server binds to
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Spoonacular API key (empty = recipe lookups fail, generator uses placeholders)
    #[serde(default)]
    pub spoonacular_api_key: String,

    #[serde(default = "default_spoonacular_base_url")]
    pub spoonacular_base_url: String,

    #[serde(default = "default_google_translate_url")]
    pub google_translate_url: String,

    #[serde(default = "default_libretranslate_url")]
    pub libretranslate_url: String,

    /// Chat-completion key; the LLM translator is skipped when empty
    #[serde(default)]
    pub llm_api_key: String,

    #[serde(default = "default_llm_base_url")]
    pub llm_base_url: String,

    #[serde(default = "default_llm_model")]
    pub llm_model: String,

    #[serde(default = "default_mymemory_url")]
    pub mymemory_url: String,

    /// Directory for the persistent cache tier (None = memory only)
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,

    /// Time-to-live for cached upstream responses, in seconds
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Timeout applied to every upstream HTTP request, in seconds
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    #[serde(default)]
    pub default_locale: Locale,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            spoonacular_api_key: String::new(),
            spoonacular_base_url: default_spoonacular_base_url(),
            google_translate_url: default_google_translate_url(),
            libretranslate_url: default_libretranslate_url(),
            llm_api_key: String::new(),
            llm_base_url: default_llm_base_url(),
            llm_model: default_llm_model(),
            mymemory_url: default_mymemory_url(),
            cache_dir: None,
            cache_ttl_secs: default_cache_ttl_secs(),
            http_timeout_secs: default_http_timeout_secs(),
            default_locale: Locale::default(),
        }
    }
}

impl AppConfig {
    /// Build configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let llm_api_key = llm_api_key_from("LLM_API_KEY", "GROQ_API_KEY");

        Self {
            bind_addr: env_or("BIND_ADDR", defaults.bind_addr),
            spoonacular_api_key: env_or("SPOONACULAR_API_KEY", defaults.spoonacular_api_key),
            spoonacular_base_url: env_or("SPOONACULAR_BASE_URL", defaults.spoonacular_base_url),
            google_translate_url: env_or("GOOGLE_TRANSLATE_URL", defaults.google_translate_url),
            libretranslate_url: env_or("LIBRETRANSLATE_URL", defaults.libretranslate_url),
            llm_api_key,
            llm_base_url: env_or("LLM_BASE_URL", defaults.llm_base_url),
            llm_model: env_or("LLM_MODEL", defaults.llm_model),
            mymemory_url: env_or("MYMEMORY_URL", defaults.mymemory_url),
            cache_dir: env_non_blank("CACHE_DIR").map(PathBuf::from),
            cache_ttl_secs: parse_env("CACHE_TTL_SECS", defaults.cache_ttl_secs),
            http_timeout_secs: parse_env("HTTP_TIMEOUT_SECS", defaults.http_timeout_secs),
            default_locale: parse_env("DEFAULT_LOCALE", defaults.default_locale),
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Whether the LLM translator should join the fallback chain
    pub fn llm_enabled(&self) -> bool {
        !self.llm_api_key.trim().is_empty()
    }
}

fn env_or(key: &str, default: String) -> String {
    std::env::var(key).unwrap_or(default)
}

/// Value of `key`, treating an unset or whitespace-only variable as absent
fn env_non_blank(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn llm_api_key_from(primary: &str, fallback: &str) -> String {
    env_non_blank(primary)
        .or_else(|| env_non_blank(fallback))
        .unwrap_or_default()
}

fn parse_env<T>(key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Debug,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid {} value {:?}, using default {:?}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}

// Default value functions for serde
fn default_bind_addr() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_spoonacular_base_url() -> String {
    "https://api.spoonacular.com".to_string()
}

fn default_google_translate_url() -> String {
    "https://translate.googleapis.com/translate_a/single".to_string()
}

fn default_libretranslate_url() -> String {
    "https://libretranslate.de/translate".to_string()
}

fn default_llm_base_url() -> String {
    "https://api.groq.com/openai/v1/chat/completions".to_string()
}

fn default_llm_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}

fn default_mymemory_url() -> String {
    "https://api.mymemory.translated.net/get".to_string()
}

fn default_cache_ttl_secs() -> u64 {
    86_400
}

fn default_http_timeout_secs() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.bind_addr, "127.0.0.1:3000");
        assert_eq!(config.spoonacular_base_url, "https://api.spoonacular.com");
        assert_eq!(config.cache_ttl_secs, 86_400);
        assert_eq!(config.http_timeout(), Duration::from_secs(10));
        assert_eq!(config.default_locale, Locale::Pt);
        assert!(config.cache_dir.is_none());
        assert!(!config.llm_enabled());
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: AppConfig =
            serde_json::from_str(r#"{"llm_api_key":"k","default_locale":"es"}"#).unwrap();
        assert!(config.llm_enabled());
        assert_eq!(config.default_locale, Locale::Es);
        assert_eq!(config.llm_model, "llama-3.3-70b-versatile");
        assert_eq!(config.mymemory_url, "https://api.mymemory.translated.net/get");
    }

    #[test]
    fn test_blank_llm_key_falls_back_to_groq_key() {
        std::env::set_var("PAPO_TEST_LLM_KEY_BLANK", "   ");
        std::env::set_var("PAPO_TEST_GROQ_KEY_SET", "gsk-123");
        assert_eq!(
            llm_api_key_from("PAPO_TEST_LLM_KEY_BLANK", "PAPO_TEST_GROQ_KEY_SET"),
            "gsk-123"
        );

        std::env::set_var("PAPO_TEST_LLM_KEY_SET", "llm-456");
        assert_eq!(
            llm_api_key_from("PAPO_TEST_LLM_KEY_SET", "PAPO_TEST_GROQ_KEY_SET"),
            "llm-456"
        );
        assert_eq!(
            llm_api_key_from("PAPO_TEST_LLM_KEY_UNSET", "PAPO_TEST_GROQ_KEY_UNSET"),
            ""
        );
    }

    #[test]
    fn test_parse_env_keeps_default_on_invalid_value() {
        std::env::set_var("PAPO_TEST_TTL_INVALID", "one day");
        assert_eq!(parse_env("PAPO_TEST_TTL_INVALID", 86_400u64), 86_400);

        std::env::set_var("PAPO_TEST_TTL_PADDED", " 7 ");
        assert_eq!(parse_env("PAPO_TEST_TTL_PADDED", 86_400u64), 7);

        std::env::set_var("PAPO_TEST_LOCALE_INVALID", "fr");
        assert_eq!(parse_env("PAPO_TEST_LOCALE_INVALID", Locale::Pt), Locale::Pt);
        assert_eq!(parse_env("PAPO_TEST_TTL_UNSET", 5u64), 5);
    }

    #[test]
    fn test_blank_env_value_is_absent() {
        std::env::set_var("PAPO_TEST_CACHE_DIR_BLANK", "  ");
        assert!(env_non_blank("PAPO_TEST_CACHE_DIR_BLANK").is_none());
        std::env::set_var("PAPO_TEST_CACHE_DIR_SET", "/tmp/papo");
        assert_eq!(
            env_non_blank("PAPO_TEST_CACHE_DIR_SET").as_deref(),
            Some("/tmp/papo")
        );
    }
}
