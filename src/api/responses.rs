use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::{IntoParams, ToSchema};

use crate::cache::CacheStats;
use crate::locale::Locale;

/// Query parameters for recipe search
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Free text in the caller's language
    #[serde(default)]
    pub query: String,
    #[serde(default = "default_search_number")]
    pub number: u32,
    /// pt, en or es (regional variants accepted); defaults to the server locale
    pub locale: Option<String>,
}

fn default_search_number() -> u32 {
    crate::recipes::DEFAULT_SEARCH_RESULTS
}

/// Query parameters for recipe lists
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    pub number: Option<u32>,
    pub locale: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LocaleQuery {
    pub locale: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub translation_providers: Vec<String>,
    pub recipe_api_configured: bool,
}

/// Request to translate one string
#[derive(Debug, Deserialize, ToSchema)]
pub struct TranslateRequest {
    pub text: String,
    /// Target language code
    pub target: String,
    /// Source language code, `auto` to detect
    #[serde(default = "default_source")]
    pub source: String,
}

fn default_source() -> String {
    "auto".to_string()
}

/// Request to translate English content for a locale
#[derive(Debug, Deserialize, ToSchema)]
pub struct TranslateBatchRequest {
    pub items: Vec<String>,
    pub locale: Locale,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TranslateBatchResponse {
    pub locale: Locale,
    pub items: Vec<String>,
}

/// UI string table
#[derive(Debug, Serialize, ToSchema)]
pub struct I18nResponse {
    pub locale: Locale,
    pub strings: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    /// Blank or missing clears the display name
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Whether a recipe is in the caller's saved list
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SavedStatusResponse {
    pub id: String,
    pub saved: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CacheStatsResponse {
    pub caches: Vec<CacheStats>,
    pub timestamp: DateTime<Utc>,
}

/// Error response
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
