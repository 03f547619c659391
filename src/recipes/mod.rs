//! Recipe browsing, search and ingredient-based suggestions
//!
//! Data comes from Spoonacular through [`RecipeSource`]; [`RecipeService`]
//! caches each kind of request and localizes what it returns.

pub mod client;
pub mod generator;
pub mod models;
pub mod service;
pub mod text;

pub use client::{RecipeError, RecipeSource, SpoonacularClient};
pub use generator::{GenerateRecipeRequest, GeneratedFrom, GeneratedRecipe, RecipeGenerator};
pub use models::{
    CategorySection, HomeFeed, MealType, Recipe, RecipeCard, RecipeDetail, SearchOutcome,
};
pub use service::{RecipeService, DEFAULT_SEARCH_RESULTS, MAX_RESULTS};
