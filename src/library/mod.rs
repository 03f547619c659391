//! Saved recipes per user and community-authored recipes
//!
//! Storage sits behind repository traits; the in-memory implementations keep
//! the document layout `users/{uid}/savedRecipes/{id}` and
//! `communityRecipes/{id}`.

pub mod community;
pub mod models;
pub mod saved;

pub use community::{
    CommunityRecipeRepository, CommunityService, InMemoryCommunityRecipeRepository,
    ANONYMOUS_AUTHOR,
};
pub use models::{CommunityDraft, CommunityRecipe, RecipeRef, RecipeToSave, SavedRecipe};
pub use saved::{InMemorySavedRecipeRepository, LibraryService, SavedRecipeRepository};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("{0}")]
    Validation(String),

    #[error("Recipe {0} not found")]
    NotFound(String),
}
