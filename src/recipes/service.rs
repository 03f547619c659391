use futures::future::join_all;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use super::client::{RecipeError, RecipeSource};
use super::models::{
    CategorySection, HomeFeed, MealType, Recipe, RecipeCard, RecipeDetail, SearchOutcome,
};
use super::text::{card_description, high_quality_image, instruction_lines, strip_html};
use crate::cache::{open_store, CacheStats, RequestCache};
use crate::locale::{cuisine_label, Locale, HOME_CUISINES};
use crate::translation::TranslationChain;

pub const DEFAULT_SEARCH_RESULTS: u32 = 12;
pub const MAX_RESULTS: u32 = 100;
const HOME_RANDOM: u32 = 6;
const HOME_FEATURED: usize = 5;
const HOME_CATEGORY_ITEMS: u32 = 4;

type RecipeList = RequestCache<Vec<Recipe>, RecipeError>;

/// Recipe browsing backed by a [`RecipeSource`], cached per request kind and
/// localized through the translation chain
pub struct RecipeService {
    source: Arc<dyn RecipeSource>,
    translator: Arc<TranslationChain>,
    search: RecipeList,
    information: RequestCache<Recipe, RecipeError>,
    random: RecipeList,
    cuisine: RecipeList,
    meal_type: RecipeList,
    ingredients: RecipeList,
}

impl RecipeService {
    /// Caches live in memory, plus `<cache_dir>/<namespace>.json` when a
    /// directory is given
    pub async fn new(
        source: Arc<dyn RecipeSource>,
        translator: Arc<TranslationChain>,
        cache_dir: Option<&Path>,
        ttl: Duration,
    ) -> Self {
        Self {
            source,
            translator,
            search: RequestCache::new("search", open_store(cache_dir, "search", ttl).await, ttl),
            information: RequestCache::new(
                "information",
                open_store(cache_dir, "information", ttl).await,
                ttl,
            ),
            random: RequestCache::new("random", open_store(cache_dir, "random", ttl).await, ttl),
            cuisine: RequestCache::new("cuisine", open_store(cache_dir, "cuisine", ttl).await, ttl),
            meal_type: RequestCache::new(
                "meal_type",
                open_store(cache_dir, "meal_type", ttl).await,
                ttl,
            ),
            ingredients: RequestCache::new(
                "ingredients",
                open_store(cache_dir, "ingredients", ttl).await,
                ttl,
            ),
        }
    }

    pub fn translator(&self) -> &Arc<TranslationChain> {
        &self.translator
    }

    /// Drop expired entries from every cache; returns how many were removed
    pub async fn purge_expired(&self) -> usize {
        let (search, information, random, cuisine, meal_type, ingredients) = tokio::join!(
            self.search.purge_expired(),
            self.information.purge_expired(),
            self.random.purge_expired(),
            self.cuisine.purge_expired(),
            self.meal_type.purge_expired(),
            self.ingredients.purge_expired(),
        );
        search + information + random + cuisine + meal_type + ingredients
    }

    pub fn cache_stats(&self) -> Vec<CacheStats> {
        vec![
            self.search.stats(),
            self.information.stats(),
            self.random.stats(),
            self.cuisine.stats(),
            self.meal_type.stats(),
            self.ingredients.stats(),
        ]
    }

    /// Search by free text, translating non-English queries to English first
    pub async fn search(
        &self,
        query: &str,
        number: u32,
        locale: Locale,
    ) -> Result<SearchOutcome, RecipeError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(RecipeError::InvalidQuery);
        }
        let number = number.clamp(1, MAX_RESULTS);

        let (query_used, translation_failed) = if locale.is_english() {
            (query.to_string(), false)
        } else {
            let result = self.translator.translate(query, "en", locale.code()).await;
            if result.ok {
                tracing::debug!("Search query '{}' translated to '{}'", query, result.text);
            }
            (result.text, !result.ok)
        };

        let source = Arc::clone(&self.source);
        let upstream_query = query_used.clone();
        let key = format!("{}:{}", query_used.to_lowercase(), number);
        let recipes = self
            .search
            .get_or_fetch(&key, move || async move {
                source.search(&upstream_query, number).await
            })
            .await?;

        Ok(SearchOutcome {
            query: query.to_string(),
            query_used,
            translation_failed,
            results: self.to_cards(recipes, locale, false).await,
        })
    }

    /// Full recipe, with title, summary, ingredients and steps localized
    pub async fn detail(&self, id: i64, locale: Locale) -> Result<RecipeDetail, RecipeError> {
        if id <= 0 {
            return Err(RecipeError::InvalidId(id));
        }

        let source = Arc::clone(&self.source);
        let recipe = self
            .information
            .get_or_fetch(&id.to_string(), move || async move {
                source.information(id).await
            })
            .await?;

        let summary = strip_html(recipe.summary.as_deref().unwrap_or_default());
        let ingredients = recipe.ingredient_lines();
        let mut instructions = recipe.steps();
        if instructions.is_empty() {
            instructions = instruction_lines(recipe.instructions.as_deref().unwrap_or_default());
        }

        let (title, summary, ingredients, instructions) = tokio::join!(
            self.translator.translate_for_locale(&recipe.title, locale),
            self.translator.translate_for_locale(&summary, locale),
            self.translator.translate_batch(&ingredients, locale),
            self.translator.translate_each(&instructions, locale),
        );

        Ok(RecipeDetail {
            id: recipe.id,
            locale,
            title,
            summary,
            image: recipe.image.as_deref().map(high_quality_image),
            ready_in_minutes: recipe.ready_in_minutes,
            servings: recipe.servings,
            cuisines: recipe.cuisines,
            diets: recipe.diets,
            ingredients,
            instructions,
            source_url: recipe.source_url,
        })
    }

    pub async fn random(&self, number: u32, locale: Locale) -> Result<Vec<RecipeCard>, RecipeError> {
        let number = number.clamp(1, MAX_RESULTS);
        let source = Arc::clone(&self.source);
        let recipes = self
            .random
            .get_or_fetch(&number.to_string(), move || async move {
                source.random(number).await
            })
            .await?;
        Ok(self.to_cards(recipes, locale, true).await)
    }

    pub async fn by_cuisine(
        &self,
        cuisine: &str,
        number: u32,
        locale: Locale,
    ) -> Result<Vec<RecipeCard>, RecipeError> {
        let number = number.clamp(1, MAX_RESULTS);
        let source = Arc::clone(&self.source);
        let upstream_cuisine = cuisine.to_string();
        let recipes = self
            .cuisine
            .get_or_fetch(&format!("{}:{}", cuisine, number), move || async move {
                source.by_cuisine(&upstream_cuisine, number).await
            })
            .await?;
        Ok(self.to_cards(recipes, locale, false).await)
    }

    /// Drinks, desserts or main courses
    pub async fn collection(
        &self,
        kind: MealType,
        number: u32,
        locale: Locale,
    ) -> Result<Vec<RecipeCard>, RecipeError> {
        let number = number.clamp(1, MAX_RESULTS);
        let source = Arc::clone(&self.source);
        let recipes = self
            .meal_type
            .get_or_fetch(&format!("{}:{}", kind.as_param(), number), move || async move {
                source.by_meal_type(kind, number).await
            })
            .await?;
        Ok(self.to_cards(recipes, locale, false).await)
    }

    /// Untranslated recipes containing `ingredients`, used by the generator
    pub async fn by_ingredients(
        &self,
        ingredients: &[String],
        number: u32,
    ) -> Result<Vec<Recipe>, RecipeError> {
        let number = number.clamp(1, MAX_RESULTS);
        let source = Arc::clone(&self.source);
        let upstream = ingredients.to_vec();
        let key = format!("{}:{}", ingredients.join(",").to_lowercase(), number);
        self.ingredients
            .get_or_fetch(&key, move || async move {
                source.by_ingredients(&upstream, number).await
            })
            .await
    }

    /// Home page sections, fetched concurrently; a failing section is empty
    pub async fn home(&self, locale: Locale) -> HomeFeed {
        let (random, categories, drinks, desserts, main_courses) = tokio::join!(
            self.random(HOME_RANDOM, locale),
            self.categories(locale),
            self.collection(MealType::Drink, MealType::Drink.home_count(), locale),
            self.collection(MealType::Dessert, MealType::Dessert.home_count(), locale),
            self.collection(MealType::MainCourse, MealType::MainCourse.home_count(), locale),
        );

        let random = or_empty("random", random);
        HomeFeed {
            locale,
            featured: random.iter().take(HOME_FEATURED).cloned().collect(),
            random,
            categories,
            drinks: or_empty("drinks", drinks),
            desserts: or_empty("desserts", desserts),
            main_courses: or_empty("main courses", main_courses),
        }
    }

    async fn categories(&self, locale: Locale) -> Vec<CategorySection> {
        join_all(HOME_CUISINES.iter().map(|cuisine| async move {
            let items = self.by_cuisine(cuisine, HOME_CATEGORY_ITEMS, locale).await;
            CategorySection {
                key: cuisine.to_string(),
                label: cuisine_label(cuisine, locale).to_string(),
                items: or_empty(cuisine, items),
            }
        }))
        .await
    }

    async fn to_cards(&self, recipes: Vec<Recipe>, locale: Locale, hq: bool) -> Vec<RecipeCard> {
        join_all(recipes.into_iter().map(|recipe| self.to_card(recipe, locale, hq))).await
    }

    async fn to_card(&self, recipe: Recipe, locale: Locale, hq: bool) -> RecipeCard {
        let description = card_description(recipe.summary.as_deref().unwrap_or_default());
        let (title, description) = tokio::join!(
            self.translator.translate_for_locale(&recipe.title, locale),
            self.translator.translate_for_locale(&description, locale),
        );

        let image = recipe.image.unwrap_or_default();
        RecipeCard {
            id: recipe.id,
            title,
            description,
            image: if hq { high_quality_image(&image) } else { image },
        }
    }
}

fn or_empty(section: &str, result: Result<Vec<RecipeCard>, RecipeError>) -> Vec<RecipeCard> {
    result.unwrap_or_else(|e| {
        tracing::warn!("Home section {} unavailable: {}", section, e);
        Vec::new()
    })
}
