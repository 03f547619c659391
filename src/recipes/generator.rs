use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use super::client::RecipeError;
use super::models::Recipe;
use super::service::RecipeService;
use super::text::{strip_html, truncate_chars};
use crate::locale::Locale;

const DEFAULT_SERVINGS: u32 = 4;
const DEFAULT_PREP_MINUTES: u32 = 30;
const DESCRIPTION_LEN: usize = 200;

/// Ingredients the user has at hand, plus optional preferences
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct GenerateRecipeRequest {
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub cuisine: Option<String>,
    #[serde(default)]
    pub dietary_restrictions: Option<String>,
    #[serde(default)]
    pub meal_type: Option<String>,
    #[serde(default)]
    pub servings: Option<u32>,
    #[serde(default)]
    pub language: Locale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum GeneratedFrom {
    /// Mapped from the best matching Spoonacular recipe
    Spoonacular,
    /// Built from the ingredient list alone
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeneratedRecipe {
    pub title: String,
    pub description: String,
    pub prep_time: u32,
    pub servings: u32,
    pub cuisine: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub tips: String,
    pub source: GeneratedFrom,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_recipe_id: Option<i64>,
}

/// "What can I cook with this?" recipe suggestions
pub struct RecipeGenerator {
    recipes: Arc<RecipeService>,
}

impl RecipeGenerator {
    pub fn new(recipes: Arc<RecipeService>) -> Self {
        Self { recipes }
    }

    /// Suggest a recipe for the given ingredients
    ///
    /// Falls back to a placeholder recipe when the recipe API is not
    /// configured, fails, or finds nothing; only an empty ingredient list is
    /// an error.
    pub async fn generate(
        &self,
        request: &GenerateRecipeRequest,
    ) -> Result<GeneratedRecipe, RecipeError> {
        let ingredients: Vec<String> = request
            .ingredients
            .iter()
            .map(|i| i.trim().to_string())
            .filter(|i| !i.is_empty())
            .collect();
        if ingredients.is_empty() {
            return Err(RecipeError::Validation(
                "At least one ingredient is required".to_string(),
            ));
        }

        let servings = request
            .servings
            .filter(|s| *s > 0)
            .unwrap_or(DEFAULT_SERVINGS);

        let found = match self.recipes.by_ingredients(&ingredients, 1).await {
            Ok(recipes) => recipes.into_iter().next(),
            Err(RecipeError::MissingApiKey) => None,
            Err(e) => {
                tracing::warn!("Recipe lookup by ingredients failed: {}", e);
                None
            }
        };

        match found {
            Some(recipe) => Ok(self.localize(from_recipe(recipe, servings), request.language).await),
            None => {
                tracing::debug!("No matching recipe, building placeholder");
                Ok(placeholder(&ingredients, request.cuisine.as_deref(), servings))
            }
        }
    }

    async fn localize(&self, mut recipe: GeneratedRecipe, locale: Locale) -> GeneratedRecipe {
        let translator = self.recipes.translator();
        let (title, description, ingredients, instructions) = tokio::join!(
            translator.translate_for_locale(&recipe.title, locale),
            translator.translate_for_locale(&recipe.description, locale),
            translator.translate_batch(&recipe.ingredients, locale),
            translator.translate_each(&recipe.instructions, locale),
        );
        recipe.title = title;
        recipe.description = description;
        recipe.ingredients = ingredients;
        recipe.instructions = instructions;
        recipe
    }
}

fn from_recipe(recipe: Recipe, requested_servings: u32) -> GeneratedRecipe {
    let description = truncate_chars(
        &strip_html(recipe.summary.as_deref().unwrap_or_default()),
        DESCRIPTION_LEN,
    );
    let mut instructions = recipe.steps();
    if instructions.is_empty() {
        instructions = vec![
            "Prepare os ingredientes".to_string(),
            "Siga o modo de preparo".to_string(),
            "Sirva quente".to_string(),
        ];
    }

    GeneratedRecipe {
        description: if description.is_empty() {
            "Receita deliciosa".to_string()
        } else {
            description
        },
        prep_time: recipe.ready_in_minutes.unwrap_or(DEFAULT_PREP_MINUTES),
        servings: recipe.servings.unwrap_or(requested_servings),
        cuisine: recipe
            .cuisines
            .first()
            .cloned()
            .unwrap_or_else(|| "Internacional".to_string()),
        ingredients: recipe.ingredient_lines(),
        instructions,
        tips: "Ajuste os temperos ao seu gosto!".to_string(),
        source: GeneratedFrom::Spoonacular,
        source_recipe_id: Some(recipe.id),
        title: recipe.title,
    }
}

fn placeholder(ingredients: &[String], cuisine: Option<&str>, servings: u32) -> GeneratedRecipe {
    GeneratedRecipe {
        title: format!("Receita com {}", ingredients[0]),
        description: format!("Deliciosa receita usando {}", ingredients.join(", ")),
        prep_time: DEFAULT_PREP_MINUTES,
        servings,
        cuisine: cuisine
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or("Caseira")
            .to_string(),
        ingredients: ingredients
            .iter()
            .map(|i| format!("{} (a gosto)", i))
            .collect(),
        instructions: [
            "Prepare todos os ingredientes",
            "Refogue em azeite",
            "Tempere a gosto",
            "Cozinhe até ficar pronto",
            "Sirva quente",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect(),
        tips: "Ajuste conforme sua preferência!".to_string(),
        source: GeneratedFrom::Placeholder,
        source_recipe_id: None,
    }
}
