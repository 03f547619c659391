use chrono::Utc;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;

use super::models::{RecipeToSave, SavedRecipe};
use super::LibraryError;
use crate::websocket::broadcaster::topics;
use crate::websocket::{Broadcaster, WsMessage};

/// Per-user saved recipe storage
#[async_trait::async_trait]
pub trait SavedRecipeRepository: Send + Sync {
    /// Insert or replace by recipe id
    async fn upsert(&self, uid: &str, recipe: SavedRecipe) -> Result<(), LibraryError>;

    /// Returns whether something was removed
    async fn remove(&self, uid: &str, id: &str) -> Result<bool, LibraryError>;

    async fn get(&self, uid: &str, id: &str) -> Result<Option<SavedRecipe>, LibraryError>;

    /// All saved recipes of a user, in no particular order
    async fn list(&self, uid: &str) -> Result<Vec<SavedRecipe>, LibraryError>;
}

#[derive(Default)]
pub struct InMemorySavedRecipeRepository {
    users: DashMap<String, HashMap<String, SavedRecipe>>,
}

impl InMemorySavedRecipeRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl SavedRecipeRepository for InMemorySavedRecipeRepository {
    async fn upsert(&self, uid: &str, recipe: SavedRecipe) -> Result<(), LibraryError> {
        self.users
            .entry(uid.to_string())
            .or_default()
            .insert(recipe.id.clone(), recipe);
        Ok(())
    }

    async fn remove(&self, uid: &str, id: &str) -> Result<bool, LibraryError> {
        Ok(self
            .users
            .get_mut(uid)
            .map(|mut recipes| recipes.remove(id).is_some())
            .unwrap_or(false))
    }

    async fn get(&self, uid: &str, id: &str) -> Result<Option<SavedRecipe>, LibraryError> {
        Ok(self
            .users
            .get(uid)
            .and_then(|recipes| recipes.get(id).cloned()))
    }

    async fn list(&self, uid: &str) -> Result<Vec<SavedRecipe>, LibraryError> {
        Ok(self
            .users
            .get(uid)
            .map(|recipes| recipes.values().cloned().collect())
            .unwrap_or_default())
    }
}

/// A user's saved recipes; every change is pushed to `saved:<uid>`
pub struct LibraryService {
    repo: Arc<dyn SavedRecipeRepository>,
    broadcaster: Broadcaster,
}

impl LibraryService {
    pub fn new(repo: Arc<dyn SavedRecipeRepository>, broadcaster: Broadcaster) -> Self {
        Self { repo, broadcaster }
    }

    pub async fn save(&self, uid: &str, recipe: RecipeToSave) -> Result<SavedRecipe, LibraryError> {
        let saved = validate(recipe)?.into_saved(Utc::now());
        self.repo.upsert(uid, saved.clone()).await?;
        tracing::debug!("User {} saved recipe {}", uid, saved.id);
        self.publish(uid).await;
        Ok(saved)
    }

    pub async fn remove(&self, uid: &str, id: &str) -> Result<bool, LibraryError> {
        let removed = self.repo.remove(uid, id.trim()).await?;
        if removed {
            tracing::debug!("User {} removed recipe {}", uid, id);
            self.publish(uid).await;
        }
        Ok(removed)
    }

    /// Newest first
    pub async fn list(&self, uid: &str) -> Result<Vec<SavedRecipe>, LibraryError> {
        let mut recipes = self.repo.list(uid).await?;
        recipes.sort_by(|a, b| b.saved_at.cmp(&a.saved_at).then_with(|| a.id.cmp(&b.id)));
        Ok(recipes)
    }

    pub async fn is_saved(&self, uid: &str, id: &str) -> Result<bool, LibraryError> {
        Ok(self.repo.get(uid, id.trim()).await?.is_some())
    }

    /// Save if absent, remove if present; returns the new state
    pub async fn toggle(&self, uid: &str, recipe: RecipeToSave) -> Result<bool, LibraryError> {
        let id = recipe.id.to_string();
        if self.is_saved(uid, &id).await? {
            self.remove(uid, &id).await?;
            Ok(false)
        } else {
            self.save(uid, recipe).await?;
            Ok(true)
        }
    }

    /// Current list as a WebSocket message
    pub async fn snapshot(&self, uid: &str) -> Result<WsMessage, LibraryError> {
        Ok(WsMessage::saved(uid, self.list(uid).await?))
    }

    async fn publish(&self, uid: &str) {
        let topic = topics::saved(uid);
        if !self.broadcaster.has_subscribers(&topic) {
            return;
        }
        match self.snapshot(uid).await {
            Ok(message) => self.broadcaster.broadcast(&topic, message),
            Err(e) => tracing::warn!("Failed to publish saved recipes for {}: {}", uid, e),
        }
    }
}

fn validate(recipe: RecipeToSave) -> Result<RecipeToSave, LibraryError> {
    if recipe.id.to_string().is_empty() {
        return Err(LibraryError::Validation("Recipe id is required".to_string()));
    }
    if recipe.title.trim().is_empty() {
        return Err(LibraryError::Validation("Recipe title is required".to_string()));
    }
    Ok(recipe)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::models::RecipeRef;
    use std::time::Duration;

    fn recipe(id: i64, title: &str) -> RecipeToSave {
        RecipeToSave {
            id: RecipeRef::Number(id),
            title: title.to_string(),
            image: None,
            image_type: None,
            ready_in_minutes: Some(30),
            servings: Some(2),
            summary: None,
            cuisines: vec![],
            diets: vec![],
        }
    }

    fn service() -> (LibraryService, Broadcaster) {
        let broadcaster = Broadcaster::new();
        let service = LibraryService::new(
            Arc::new(InMemorySavedRecipeRepository::new()),
            broadcaster.clone(),
        );
        (service, broadcaster)
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let (library, _) = service();
        library.save("u1", recipe(1, "Bolo")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        library.save("u1", recipe(2, "Pão")).await.unwrap();

        let ids: Vec<String> = library.list("u1").await.unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["2", "1"]);
        assert!(library.list("u2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_is_an_upsert() {
        let (library, _) = service();
        library.save("u1", recipe(1, "Bolo")).await.unwrap();
        library.save("u1", recipe(1, "Bolo de cenoura")).await.unwrap();

        let recipes = library.list("u1").await.unwrap();
        assert_eq!(recipes.len(), 1);
        assert_eq!(recipes[0].title, "Bolo de cenoura");
    }

    #[tokio::test]
    async fn test_toggle_flips_state() {
        let (library, _) = service();
        assert!(library.toggle("u1", recipe(7, "Sopa")).await.unwrap());
        assert!(library.is_saved("u1", "7").await.unwrap());

        assert!(!library.toggle("u1", recipe(7, "Sopa")).await.unwrap());
        assert!(!library.is_saved("u1", "7").await.unwrap());
        assert!(!library.remove("u1", "7").await.unwrap());
    }

    #[tokio::test]
    async fn test_blank_title_is_rejected() {
        let (library, _) = service();
        assert!(matches!(
            library.save("u1", recipe(1, "  ")).await,
            Err(LibraryError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_mutations_publish_snapshots() {
        let (library, broadcaster) = service();
        let mut rx = broadcaster.subscribe(&topics::saved("u1"));

        library.save("u1", recipe(1, "Bolo")).await.unwrap();
        match rx.recv().await.unwrap() {
            WsMessage::SavedRecipes { uid, recipes, .. } => {
                assert_eq!(uid, "u1");
                assert_eq!(recipes.len(), 1);
            }
            other => panic!("unexpected message: {:?}", other),
        }

        library.remove("u1", "1").await.unwrap();
        match rx.recv().await.unwrap() {
            WsMessage::SavedRecipes { recipes, .. } => assert!(recipes.is_empty()),
            other => panic!("unexpected message: {:?}", other),
        }
    }
}
