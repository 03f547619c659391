use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Recipe identifier as sent by clients: Spoonacular ids are numbers,
/// stored ids are strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum RecipeRef {
    Number(i64),
    Text(String),
}

impl fmt::Display for RecipeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecipeRef::Number(id) => write!(f, "{}", id),
            RecipeRef::Text(id) => f.write_str(id.trim()),
        }
    }
}

/// A recipe bookmarked by a user (`users/{uid}/savedRecipes/{id}`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SavedRecipe {
    pub id: String,
    pub title: String,
    pub image: Option<String>,
    pub image_type: Option<String>,
    pub ready_in_minutes: Option<u32>,
    pub servings: Option<u32>,
    pub summary: Option<String>,
    #[serde(default)]
    pub cuisines: Vec<String>,
    #[serde(default)]
    pub diets: Vec<String>,
    pub saved_at: DateTime<Utc>,
}

/// Recipe fields the client sends when saving
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RecipeToSave {
    pub id: RecipeRef,
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
    pub cuisines: Vec<String>,
    #[serde(default)]
    pub diets: Vec<String>,
}

impl RecipeToSave {
    pub fn into_saved(self, saved_at: DateTime<Utc>) -> SavedRecipe {
        SavedRecipe {
            id: self.id.to_string(),
            title: self.title,
            image: self.image,
            image_type: self.image_type,
            ready_in_minutes: self.ready_in_minutes,
            servings: self.servings,
            summary: self.summary,
            cuisines: self.cuisines,
            diets: self.diets,
            saved_at,
        }
    }
}

/// User-authored recipe (`communityRecipes/{id}`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CommunityRecipe {
    pub id: String,
    pub title: String,
    pub description: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub prep_time: u32,
    pub servings: u32,
    pub author_id: String,
    pub author_name: String,
    pub image: Option<String>,
    pub category: Option<String>,
    pub cuisine: Option<String>,
    pub likes: u32,
    pub liked_by: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Submission form for a community recipe
///
/// `ingredients` and `instructions` are free text, one item per line.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CommunityDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub ingredients: String,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub prep_time: i64,
    #[serde(default)]
    pub servings: i64,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub cuisine: Option<String>,
}
