use serde::de::DeserializeOwned;
use thiserror::Error;

use super::models::{ComplexSearchResponse, MealType, RandomRecipesResponse, Recipe};

/// Recipe lookup failures
///
/// `Clone` so one failed upstream call can be handed to every caller that
/// joined the same in-flight request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecipeError {
    #[error("Search query must not be empty")]
    InvalidQuery,

    #[error("Invalid recipe id: {0}")]
    InvalidId(i64),

    #[error("Recipe {0} not found")]
    NotFound(i64),

    #[error("{0}")]
    Validation(String),

    #[error("Recipe API key is not configured")]
    MissingApiKey,

    #[error("Recipe API returned status {0}")]
    Status(u16),

    #[error("Recipe API request failed: {0}")]
    Transport(String),

    #[error("Invalid recipe API response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for RecipeError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            RecipeError::Decode(e.to_string())
        } else {
            RecipeError::Transport(e.to_string())
        }
    }
}

/// Source of recipe data
#[async_trait::async_trait]
pub trait RecipeSource: Send + Sync {
    /// Free-text search (English query)
    async fn search(&self, query: &str, number: u32) -> Result<Vec<Recipe>, RecipeError>;

    /// Full recipe with ingredients and instructions
    async fn information(&self, id: i64) -> Result<Recipe, RecipeError>;

    async fn random(&self, number: u32) -> Result<Vec<Recipe>, RecipeError>;

    async fn by_cuisine(&self, cuisine: &str, number: u32) -> Result<Vec<Recipe>, RecipeError>;

    async fn by_meal_type(
        &self,
        meal_type: MealType,
        number: u32,
    ) -> Result<Vec<Recipe>, RecipeError>;

    /// Recipes using the given ingredients, with full information
    async fn by_ingredients(
        &self,
        ingredients: &[String],
        number: u32,
    ) -> Result<Vec<Recipe>, RecipeError>;
}

/// Spoonacular REST client; every request carries `apiKey`
pub struct SpoonacularClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl SpoonacularClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, RecipeError> {
        if self.api_key.is_empty() {
            return Err(RecipeError::MissingApiKey);
        }

        let url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        let response = self
            .client
            .get(&url)
            .query(&[("apiKey", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Spoonacular {} returned {}", path, status);
            return Err(RecipeError::Status(status.as_u16()));
        }

        Ok(response.json().await?)
    }

    async fn complex_search(&self, params: &[(&str, String)]) -> Result<Vec<Recipe>, RecipeError> {
        let response: ComplexSearchResponse =
            self.get("/recipes/complexSearch", params).await?;
        Ok(response.results)
    }
}

#[async_trait::async_trait]
impl RecipeSource for SpoonacularClient {
    async fn search(&self, query: &str, number: u32) -> Result<Vec<Recipe>, RecipeError> {
        self.complex_search(&[("query", query.to_string()), ("number", number.to_string())])
            .await
    }

    async fn information(&self, id: i64) -> Result<Recipe, RecipeError> {
        match self
            .get(&format!("/recipes/{}/information", id), &[])
            .await
        {
            Err(RecipeError::Status(404)) => Err(RecipeError::NotFound(id)),
            other => other,
        }
    }

    async fn random(&self, number: u32) -> Result<Vec<Recipe>, RecipeError> {
        let response: RandomRecipesResponse = self
            .get("/recipes/random", &[("number", number.to_string())])
            .await?;
        Ok(response.recipes)
    }

    async fn by_cuisine(&self, cuisine: &str, number: u32) -> Result<Vec<Recipe>, RecipeError> {
        self.complex_search(&[
            ("cuisine", cuisine.to_string()),
            ("number", number.to_string()),
            ("addRecipeInformation", "true".to_string()),
        ])
        .await
    }

    async fn by_meal_type(
        &self,
        meal_type: MealType,
        number: u32,
    ) -> Result<Vec<Recipe>, RecipeError> {
        self.complex_search(&[
            ("type", meal_type.as_param().to_string()),
            ("number", number.to_string()),
            ("addRecipeInformation", "true".to_string()),
        ])
        .await
    }

    async fn by_ingredients(
        &self,
        ingredients: &[String],
        number: u32,
    ) -> Result<Vec<Recipe>, RecipeError> {
        self.complex_search(&[
            ("includeIngredients", ingredients.join(",")),
            ("number", number.to_string()),
            ("addRecipeInformation", "true".to_string()),
            ("fillIngredients", "true".to_string()),
        ])
        .await
    }
}
