use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::locale::Locale;

/// Recipe record as returned by Spoonacular
///
/// One shape covers `complexSearch` hits, `random` results and the
/// `information` endpoint; fields missing from the lighter responses default.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub image_type: Option<String>,
    #[serde(default)]
    pub ready_in_minutes: Option<u32>,
    #[serde(default)]
    pub servings: Option<u32>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub cuisines: Vec<String>,
    #[serde(default)]
    pub diets: Vec<String>,
    #[serde(default)]
    pub dish_types: Vec<String>,
    #[serde(default)]
    pub extended_ingredients: Vec<ExtendedIngredient>,
    #[serde(default)]
    pub analyzed_instructions: Vec<AnalyzedInstruction>,
}

impl Recipe {
    /// Ingredient lines as written in the source recipe
    pub fn ingredient_lines(&self) -> Vec<String> {
        self.extended_ingredients
            .iter()
            .map(|ingredient| ingredient.original.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect()
    }

    /// Steps of every analyzed instruction block, in order
    pub fn steps(&self) -> Vec<String> {
        self.analyzed_instructions
            .iter()
            .flat_map(|block| block.steps.iter())
            .map(|step| step.step.trim().to_string())
            .filter(|step| !step.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedIngredient {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub original: String,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalyzedInstruction {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub steps: Vec<InstructionStep>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InstructionStep {
    pub number: u32,
    pub step: String,
}

/// `GET /recipes/complexSearch`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplexSearchResponse {
    #[serde(default)]
    pub results: Vec<Recipe>,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub number: u32,
    #[serde(default)]
    pub total_results: u32,
}

/// `GET /recipes/random`
#[derive(Debug, Clone, Deserialize)]
pub struct RandomRecipesResponse {
    #[serde(default)]
    pub recipes: Vec<Recipe>,
}

/// Spoonacular `type` filter used for the home-page collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum MealType {
    Drink,
    Dessert,
    MainCourse,
}

impl MealType {
    /// Value of the `type` query parameter
    pub fn as_param(&self) -> &'static str {
        match self {
            MealType::Drink => "drink",
            MealType::Dessert => "dessert",
            MealType::MainCourse => "main course",
        }
    }

    /// Number of recipes shown for the collection on the home feed
    pub fn home_count(&self) -> u32 {
        match self {
            MealType::Drink | MealType::Dessert => 6,
            MealType::MainCourse => 9,
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_param())
    }
}

impl FromStr for MealType {
    type Err = String;

    /// Accepts singular/plural path segments (`drinks`, `main-course`, ...)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['_', ' '], "-").as_str() {
            "drink" | "drinks" => Ok(MealType::Drink),
            "dessert" | "desserts" => Ok(MealType::Dessert),
            "main-course" | "main-courses" => Ok(MealType::MainCourse),
            other => Err(format!("Unknown collection: {}", other)),
        }
    }
}

/// Recipe summary prepared for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RecipeCard {
    pub id: i64,
    pub title: String,
    /// Plain-text summary excerpt (at most 120 characters)
    pub description: String,
    pub image: String,
}

/// Search results plus what was actually sent upstream
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SearchOutcome {
    pub query: String,
    /// Query sent to the recipe API (English when translation succeeded)
    pub query_used: String,
    /// True when a non-English query could not be translated
    pub translation_failed: bool,
    pub results: Vec<RecipeCard>,
}

/// Recipe detail page content, localized
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeDetail {
    pub id: i64,
    pub locale: Locale,
    pub title: String,
    pub summary: String,
    pub image: Option<String>,
    pub ready_in_minutes: Option<u32>,
    pub servings: Option<u32>,
    pub cuisines: Vec<String>,
    pub diets: Vec<String>,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub source_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CategorySection {
    pub key: String,
    pub label: String,
    pub items: Vec<RecipeCard>,
}

/// Everything the home page shows
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HomeFeed {
    pub locale: Locale,
    /// First five random recipes, for the slider
    pub featured: Vec<RecipeCard>,
    pub random: Vec<RecipeCard>,
    pub categories: Vec<CategorySection>,
    pub drinks: Vec<RecipeCard>,
    pub desserts: Vec<RecipeCard>,
    pub main_courses: Vec<RecipeCard>,
}
