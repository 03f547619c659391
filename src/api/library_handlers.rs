use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::library::{CommunityDraft, CommunityRecipe, RecipeToSave, SavedRecipe};

use super::responses::*;
use super::state::AppState;

/// Saved recipes of the signed-in user, newest first
#[utoipa::path(
    get,
    path = "/api/v1/saved",
    tag = "Saved Recipes",
    responses(
        (status = 200, description = "Saved recipes", body = Vec<SavedRecipe>),
        (status = 401, description = "Not signed in", body = ErrorResponse)
    )
)]
pub async fn list_saved(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<SavedRecipe>>, AppError> {
    Ok(Json(state.library.list(user.uid()).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/saved",
    tag = "Saved Recipes",
    request_body = RecipeToSave,
    responses(
        (status = 201, description = "Recipe saved", body = SavedRecipe),
        (status = 400, description = "Missing id or title", body = ErrorResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse)
    )
)]
pub async fn save_recipe(
    State(state): State<AppState>,
    user: AuthUser,
    Json(recipe): Json<RecipeToSave>,
) -> Result<(StatusCode, Json<SavedRecipe>), AppError> {
    let saved = state.library.save(user.uid(), recipe).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/saved/{id}",
    tag = "Saved Recipes",
    params(("id" = String, Path, description = "Recipe id")),
    responses(
        (status = 204, description = "Recipe removed"),
        (status = 404, description = "Recipe was not saved", body = ErrorResponse)
    )
)]
pub async fn remove_saved(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if state.library.remove(user.uid(), &id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Recipe {} is not saved", id)))
    }
}

/// Save if absent, remove if present
#[utoipa::path(
    post,
    path = "/api/v1/saved/toggle",
    tag = "Saved Recipes",
    request_body = RecipeToSave,
    responses(
        (status = 200, description = "New saved state", body = SavedStatusResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse)
    )
)]
pub async fn toggle_saved(
    State(state): State<AppState>,
    user: AuthUser,
    Json(recipe): Json<RecipeToSave>,
) -> Result<Json<SavedStatusResponse>, AppError> {
    let id = recipe.id.to_string();
    let saved = state.library.toggle(user.uid(), recipe).await?;
    Ok(Json(SavedStatusResponse { id, saved }))
}

#[utoipa::path(
    get,
    path = "/api/v1/saved/{id}/status",
    tag = "Saved Recipes",
    params(("id" = String, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "Saved state", body = SavedStatusResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse)
    )
)]
pub async fn saved_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<SavedStatusResponse>, AppError> {
    let saved = state.library.is_saved(user.uid(), &id).await?;
    Ok(Json(SavedStatusResponse { id, saved }))
}

/// Community recipes, newest first
#[utoipa::path(
    get,
    path = "/api/v1/community",
    tag = "Community",
    responses(
        (status = 200, description = "Community recipes", body = Vec<CommunityRecipe>)
    )
)]
pub async fn list_community(
    State(state): State<AppState>,
) -> Result<Json<Vec<CommunityRecipe>>, AppError> {
    Ok(Json(state.community.list().await?))
}

/// Publish a recipe; ingredients and instructions are one item per line
#[utoipa::path(
    post,
    path = "/api/v1/community",
    tag = "Community",
    request_body = CommunityDraft,
    responses(
        (status = 201, description = "Recipe published", body = CommunityRecipe),
        (status = 400, description = "Invalid draft", body = ErrorResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse)
    )
)]
pub async fn create_community_recipe(
    State(state): State<AppState>,
    user: AuthUser,
    Json(draft): Json<CommunityDraft>,
) -> Result<(StatusCode, Json<CommunityRecipe>), AppError> {
    let recipe = state.community.create(draft, &user.profile).await?;
    Ok((StatusCode::CREATED, Json(recipe)))
}

#[utoipa::path(
    get,
    path = "/api/v1/community/{id}",
    tag = "Community",
    params(("id" = String, Path, description = "Community recipe id")),
    responses(
        (status = 200, description = "Community recipe", body = CommunityRecipe),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    )
)]
pub async fn get_community_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CommunityRecipe>, AppError> {
    Ok(Json(state.community.get(&id).await?))
}

/// Like, or remove an existing like
#[utoipa::path(
    post,
    path = "/api/v1/community/{id}/like",
    tag = "Community",
    params(("id" = String, Path, description = "Community recipe id")),
    responses(
        (status = 200, description = "Updated recipe", body = CommunityRecipe),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    )
)]
pub async fn toggle_like(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<CommunityRecipe>, AppError> {
    Ok(Json(state.community.toggle_like(&id, user.uid()).await?))
}
