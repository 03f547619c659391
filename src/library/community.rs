use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

use super::models::{CommunityDraft, CommunityRecipe};
use super::LibraryError;
use crate::auth::UserProfile;
use crate::websocket::broadcaster::topics;
use crate::websocket::{Broadcaster, WsMessage};

pub const ANONYMOUS_AUTHOR: &str = "Anônimo";

/// Community recipe storage
#[async_trait::async_trait]
pub trait CommunityRecipeRepository: Send + Sync {
    async fn insert(&self, recipe: CommunityRecipe) -> Result<(), LibraryError>;

    async fn get(&self, id: &str) -> Result<Option<CommunityRecipe>, LibraryError>;

    /// All recipes, in no particular order
    async fn list(&self) -> Result<Vec<CommunityRecipe>, LibraryError>;

    /// Add or remove `uid` from `liked_by` in one step; `None` if the recipe
    /// does not exist
    async fn toggle_like(
        &self,
        id: &str,
        uid: &str,
    ) -> Result<Option<CommunityRecipe>, LibraryError>;
}

#[derive(Default)]
pub struct InMemoryCommunityRecipeRepository {
    recipes: DashMap<String, CommunityRecipe>,
}

impl InMemoryCommunityRecipeRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl CommunityRecipeRepository for InMemoryCommunityRecipeRepository {
    async fn insert(&self, recipe: CommunityRecipe) -> Result<(), LibraryError> {
        self.recipes.insert(recipe.id.clone(), recipe);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<CommunityRecipe>, LibraryError> {
        Ok(self.recipes.get(id).map(|recipe| recipe.clone()))
    }

    async fn list(&self) -> Result<Vec<CommunityRecipe>, LibraryError> {
        Ok(self.recipes.iter().map(|entry| entry.value().clone()).collect())
    }

    async fn toggle_like(
        &self,
        id: &str,
        uid: &str,
    ) -> Result<Option<CommunityRecipe>, LibraryError> {
        let Some(mut recipe) = self.recipes.get_mut(id) else {
            return Ok(None);
        };

        if let Some(pos) = recipe.liked_by.iter().position(|liker| liker == uid) {
            recipe.liked_by.remove(pos);
        } else {
            recipe.liked_by.push(uid.to_string());
        }
        recipe.likes = recipe.liked_by.len() as u32;
        Ok(Some(recipe.clone()))
    }
}

/// Recipes published by users, shared with everyone on `community`
pub struct CommunityService {
    repo: Arc<dyn CommunityRecipeRepository>,
    broadcaster: Broadcaster,
}

impl CommunityService {
    pub fn new(repo: Arc<dyn CommunityRecipeRepository>, broadcaster: Broadcaster) -> Self {
        Self { repo, broadcaster }
    }

    /// Validate and publish a draft
    pub async fn create(
        &self,
        draft: CommunityDraft,
        author: &UserProfile,
    ) -> Result<CommunityRecipe, LibraryError> {
        let title = required(&draft.title, "title")?;
        let description = required(&draft.description, "description")?;
        let ingredients = lines(&draft.ingredients, "ingredients")?;
        let instructions = lines(&draft.instructions, "instructions")?;
        let prep_time = positive(draft.prep_time, "prep_time")?;
        let servings = positive(draft.servings, "servings")?;

        let recipe = CommunityRecipe {
            id: Uuid::new_v4().to_string(),
            title,
            description,
            ingredients,
            instructions,
            prep_time,
            servings,
            author_id: author.uid.clone(),
            author_name: author
                .author_name()
                .unwrap_or(ANONYMOUS_AUTHOR)
                .to_string(),
            image: optional(draft.image),
            category: optional(draft.category),
            cuisine: optional(draft.cuisine),
            likes: 0,
            liked_by: Vec::new(),
            created_at: Utc::now(),
        };

        self.repo.insert(recipe.clone()).await?;
        tracing::info!("Community recipe {} published by {}", recipe.id, recipe.author_id);
        self.publish().await;
        Ok(recipe)
    }

    /// Newest first
    pub async fn list(&self) -> Result<Vec<CommunityRecipe>, LibraryError> {
        let mut recipes = self.repo.list().await?;
        recipes.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(recipes)
    }

    pub async fn get(&self, id: &str) -> Result<CommunityRecipe, LibraryError> {
        self.repo
            .get(id)
            .await?
            .ok_or_else(|| LibraryError::NotFound(id.to_string()))
    }

    pub async fn toggle_like(&self, id: &str, uid: &str) -> Result<CommunityRecipe, LibraryError> {
        let recipe = self
            .repo
            .toggle_like(id, uid)
            .await?
            .ok_or_else(|| LibraryError::NotFound(id.to_string()))?;
        self.publish().await;
        Ok(recipe)
    }

    pub async fn snapshot(&self) -> Result<WsMessage, LibraryError> {
        Ok(WsMessage::community(self.list().await?))
    }

    async fn publish(&self) {
        if !self.broadcaster.has_subscribers(topics::COMMUNITY) {
            return;
        }
        match self.snapshot().await {
            Ok(message) => self.broadcaster.broadcast(topics::COMMUNITY, message),
            Err(e) => tracing::warn!("Failed to publish community recipes: {}", e),
        }
    }
}

fn required(value: &str, field: &str) -> Result<String, LibraryError> {
    let value = value.trim();
    if value.is_empty() {
        Err(LibraryError::Validation(format!("{} is required", field)))
    } else {
        Ok(value.to_string())
    }
}

fn lines(text: &str, field: &str) -> Result<Vec<String>, LibraryError> {
    let items: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();
    if items.is_empty() {
        Err(LibraryError::Validation(format!("{} must have at least one line", field)))
    } else {
        Ok(items)
    }
}

fn positive(value: i64, field: &str) -> Result<u32, LibraryError> {
    u32::try_from(value)
        .ok()
        .filter(|v| *v >= 1)
        .ok_or_else(|| LibraryError::Validation(format!("{} must be at least 1", field)))
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
