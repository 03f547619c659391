use utoipa::OpenApi;

use crate::api::responses::*;
use crate::api::{auth_handlers, handlers, library_handlers};
use crate::auth::{Session, UserProfile};
use crate::cache::{CacheStats, CounterSnapshot};
use crate::library::{CommunityDraft, CommunityRecipe, RecipeRef, RecipeToSave, SavedRecipe};
use crate::locale::Locale;
use crate::recipes::{
    CategorySection, GenerateRecipeRequest, GeneratedFrom, GeneratedRecipe, HomeFeed, MealType,
    RecipeCard, RecipeDetail, SearchOutcome,
};
use crate::translation::TranslationResult;

/// OpenAPI v1 specification
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Papo de Panela API",
        version = "1.0.0",
        description = "Recipe discovery, translation and sharing. Endpoints marked 401 expect `Authorization: Bearer <token>` from signup/login.",
        license(
            name = "MIT"
        )
    ),
    paths(
        handlers::health_check,
        handlers::search_recipes,
        handlers::random_recipes,
        handlers::home_feed,
        handlers::recipe_collection,
        handlers::get_recipe,
        handlers::generate_recipe,
        handlers::translate_text,
        handlers::translate_batch,
        handlers::get_ui_strings,
        handlers::cache_stats,
        auth_handlers::signup,
        auth_handlers::login,
        auth_handlers::logout,
        auth_handlers::me,
        auth_handlers::update_profile,
        library_handlers::list_saved,
        library_handlers::save_recipe,
        library_handlers::remove_saved,
        library_handlers::toggle_saved,
        library_handlers::saved_status,
        library_handlers::list_community,
        library_handlers::create_community_recipe,
        library_handlers::get_community_recipe,
        library_handlers::toggle_like,
    ),
    components(
        schemas(
            Locale,
            RecipeCard,
            SearchOutcome,
            RecipeDetail,
            CategorySection,
            HomeFeed,
            MealType,
            GenerateRecipeRequest,
            GeneratedRecipe,
            GeneratedFrom,
            TranslationResult,
            TranslateRequest,
            TranslateBatchRequest,
            TranslateBatchResponse,
            I18nResponse,
            SignupRequest,
            LoginRequest,
            UpdateProfileRequest,
            Session,
            UserProfile,
            RecipeRef,
            RecipeToSave,
            SavedRecipe,
            SavedStatusResponse,
            CommunityDraft,
            CommunityRecipe,
            CacheStats,
            CounterSnapshot,
            CacheStatsResponse,
            HealthResponse,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check and cache statistics"),
        (name = "Recipes", description = "Recipe search, detail and suggestions"),
        (name = "Translation", description = "Translation chain and UI strings"),
        (name = "Auth", description = "Accounts and sessions"),
        (name = "Saved Recipes", description = "Per-user saved recipes"),
        (name = "Community", description = "User-published recipes"),
    )
)]
pub struct ApiDocV1;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_route_is_documented() {
        let doc = ApiDocV1::openapi();
        for path in [
            "/health",
            "/api/v1/recipes/search",
            "/api/v1/recipes/{id}",
            "/api/v1/recipes/collections/{kind}",
            "/api/v1/translate/batch",
            "/api/v1/auth/signup",
            "/api/v1/saved/{id}/status",
            "/api/v1/community/{id}/like",
            "/api/v1/cache/stats",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{path} missing");
        }
    }
}
