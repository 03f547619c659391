use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::locale::{ui_strings, Locale};
use crate::recipes::{
    GenerateRecipeRequest, GeneratedRecipe, HomeFeed, MealType, RecipeCard, RecipeDetail,
    SearchOutcome,
};
use crate::translation::TranslationResult;

use super::responses::*;
use super::state::AppState;

const DEFAULT_RANDOM: u32 = 6;
const DEFAULT_COLLECTION: u32 = 6;

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
        translation_providers: state
            .translator
            .provider_names()
            .into_iter()
            .map(str::to_string)
            .collect(),
        recipe_api_configured: !state.config.spoonacular_api_key.is_empty(),
    })
}

/// Search recipes by free text
#[utoipa::path(
    get,
    path = "/api/v1/recipes/search",
    tag = "Recipes",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching recipes", body = SearchOutcome),
        (status = 400, description = "Empty query or unknown locale", body = ErrorResponse),
        (status = 502, description = "Recipe API unavailable", body = ErrorResponse)
    )
)]
pub async fn search_recipes(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<SearchOutcome>, AppError> {
    let locale = state.locale(params.locale.as_deref())?;
    let outcome = state
        .recipes
        .search(&params.query, params.number, locale)
        .await?;
    Ok(Json(outcome))
}

/// Random recipes
#[utoipa::path(
    get,
    path = "/api/v1/recipes/random",
    tag = "Recipes",
    params(ListQuery),
    responses(
        (status = 200, description = "Random recipes", body = Vec<RecipeCard>),
        (status = 502, description = "Recipe API unavailable", body = ErrorResponse)
    )
)]
pub async fn random_recipes(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Result<Json<Vec<RecipeCard>>, AppError> {
    let locale = state.locale(params.locale.as_deref())?;
    let number = params.number.unwrap_or(DEFAULT_RANDOM);
    Ok(Json(state.recipes.random(number, locale).await?))
}

/// Home page sections; failing sections come back empty
#[utoipa::path(
    get,
    path = "/api/v1/recipes/home",
    tag = "Recipes",
    params(LocaleQuery),
    responses(
        (status = 200, description = "Home feed", body = HomeFeed)
    )
)]
pub async fn home_feed(
    State(state): State<AppState>,
    Query(params): Query<LocaleQuery>,
) -> Result<Json<HomeFeed>, AppError> {
    let locale = state.locale(params.locale.as_deref())?;
    Ok(Json(state.recipes.home(locale).await))
}

/// Drinks, desserts or main courses
#[utoipa::path(
    get,
    path = "/api/v1/recipes/collections/{kind}",
    tag = "Recipes",
    params(
        ("kind" = String, Path, description = "drinks, desserts or main-courses"),
        ListQuery
    ),
    responses(
        (status = 200, description = "Recipes of the collection", body = Vec<RecipeCard>),
        (status = 404, description = "Unknown collection", body = ErrorResponse)
    )
)]
pub async fn recipe_collection(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(params): Query<ListQuery>,
) -> Result<Json<Vec<RecipeCard>>, AppError> {
    let kind: MealType = kind.parse().map_err(AppError::NotFound)?;
    let locale = state.locale(params.locale.as_deref())?;
    let number = params.number.unwrap_or(DEFAULT_COLLECTION);
    Ok(Json(state.recipes.collection(kind, number, locale).await?))
}

/// Recipe detail with localized ingredients and steps
#[utoipa::path(
    get,
    path = "/api/v1/recipes/{id}",
    tag = "Recipes",
    params(
        ("id" = i64, Path, description = "Spoonacular recipe id"),
        LocaleQuery
    ),
    responses(
        (status = 200, description = "Recipe detail", body = RecipeDetail),
        (status = 400, description = "Invalid id", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    )
)]
pub async fn get_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<LocaleQuery>,
) -> Result<Json<RecipeDetail>, AppError> {
    let id: i64 = id
        .trim()
        .parse()
        .map_err(|_| AppError::InvalidId(format!("Invalid recipe id: {}", id)))?;
    let locale = state.locale(params.locale.as_deref())?;
    Ok(Json(state.recipes.detail(id, locale).await?))
}

/// Suggest a recipe from a list of ingredients
#[utoipa::path(
    post,
    path = "/api/v1/recipes/generate",
    tag = "Recipes",
    request_body = GenerateRecipeRequest,
    responses(
        (status = 200, description = "Suggested recipe", body = GeneratedRecipe),
        (status = 400, description = "No ingredients", body = ErrorResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse)
    )
)]
pub async fn generate_recipe(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<GenerateRecipeRequest>,
) -> Result<Json<GeneratedRecipe>, AppError> {
    tracing::debug!("Generating recipe for {}", user.uid());
    Ok(Json(state.generator.generate(&request).await?))
}

/// Translate a string through the provider chain
#[utoipa::path(
    post,
    path = "/api/v1/translate",
    tag = "Translation",
    request_body = TranslateRequest,
    responses(
        (status = 200, description = "Translation, or the input with ok=false", body = TranslationResult)
    )
)]
pub async fn translate_text(
    State(state): State<AppState>,
    Json(request): Json<TranslateRequest>,
) -> Json<TranslationResult> {
    Json(
        state
            .translator
            .translate(&request.text, request.target.trim(), request.source.trim())
            .await,
    )
}

/// Translate a list of English strings for a locale, preserving order
#[utoipa::path(
    post,
    path = "/api/v1/translate/batch",
    tag = "Translation",
    request_body = TranslateBatchRequest,
    responses(
        (status = 200, description = "Translated items", body = TranslateBatchResponse)
    )
)]
pub async fn translate_batch(
    State(state): State<AppState>,
    Json(request): Json<TranslateBatchRequest>,
) -> Json<TranslateBatchResponse> {
    let items = state
        .translator
        .translate_batch(&request.items, request.locale)
        .await;
    Json(TranslateBatchResponse {
        locale: request.locale,
        items,
    })
}

/// UI strings for a locale
#[utoipa::path(
    get,
    path = "/api/v1/i18n/{locale}",
    tag = "Translation",
    params(("locale" = String, Path, description = "pt, en or es")),
    responses(
        (status = 200, description = "String table", body = I18nResponse),
        (status = 404, description = "Unknown locale", body = ErrorResponse)
    )
)]
pub async fn get_ui_strings(Path(locale): Path<String>) -> Result<Json<I18nResponse>, AppError> {
    let locale: Locale = locale
        .parse()
        .map_err(|e: crate::locale::UnknownLocale| AppError::NotFound(e.to_string()))?;
    let strings = ui_strings(locale)
        .into_iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    Ok(Json(I18nResponse { locale, strings }))
}

/// Hit/miss counters for every cache
#[utoipa::path(
    get,
    path = "/api/v1/cache/stats",
    tag = "Health",
    responses(
        (status = 200, description = "Cache statistics", body = CacheStatsResponse)
    )
)]
pub async fn cache_stats(State(state): State<AppState>) -> Json<CacheStatsResponse> {
    let mut caches = state.recipes.cache_stats();
    caches.push(state.translator.cache_stats());
    Json(CacheStatsResponse {
        caches,
        timestamp: Utc::now(),
    })
}
