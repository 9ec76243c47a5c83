use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::models::{Ingredient, MealPlan, NewRecipe, Recipe, User, validate_email};
use crate::shopping::Strategy;
use crate::store::{MemoryStore, RecipeLookup};

/// Facade over the store that checks users exist and that meal plans are only
/// touched by their owner.
///
/// There is no session: the acting user id is passed to every call that needs
/// one.
pub struct MealPrepService {
    store: MemoryStore,
}

impl Default for MealPrepService {
    fn default() -> Self {
        Self::new()
    }
}

impl MealPrepService {
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: MemoryStore::new(),
        }
    }

    #[must_use]
    pub fn from_store(store: MemoryStore) -> Self {
        Self { store }
    }

    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::from_store(MemoryStore::open(path)?))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.store.save(path)
    }

    #[must_use]
    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    #[must_use]
    pub fn into_store(self) -> MemoryStore {
        self.store
    }

    // --- Users ---

    pub fn register_user(&mut self, name: &str, email: &str) -> Result<User> {
        if name.trim().is_empty() {
            bail!("User name must not be empty");
        }
        validate_email(email)?;
        let user = self.store.insert_user(name, email)?;
        tracing::info!(user_id = %user.id, "registered user");
        Ok(user)
    }

    pub fn get_user(&self, user_id: &str) -> Result<User> {
        self.store
            .get_user(user_id)
            .cloned()
            .with_context(|| format!("User {user_id} not found"))
    }

    #[must_use]
    pub fn list_users(&self) -> Vec<User> {
        self.store.list_users().into_iter().cloned().collect()
    }

    // --- Recipes ---

    pub fn create_recipe(&mut self, recipe: NewRecipe) -> Result<Recipe> {
        let recipe = self.store.insert_recipe(recipe)?;
        tracing::info!(recipe_id = %recipe.id, title = %recipe.title, "created recipe");
        Ok(recipe)
    }

    pub fn get_recipe(&self, recipe_id: &str) -> Result<Recipe> {
        self.store
            .get_recipe(recipe_id)
            .cloned()
            .with_context(|| format!("Recipe {recipe_id} not found"))
    }

    /// All recipes in creation order, optionally narrowed to one tag.
    #[must_use]
    pub fn list_recipes(&self, tag: Option<&str>) -> Vec<Recipe> {
        self.store
            .list_recipes()
            .into_iter()
            .filter(|r| tag.is_none_or(|t| r.has_tag(t)))
            .cloned()
            .collect()
    }

    /// `Ok(false)` means the value was outside 1-5 and nothing changed.
    pub fn rate_recipe(&mut self, recipe_id: &str, value: i64) -> Result<bool> {
        let recipe = self
            .store
            .get_recipe_mut(recipe_id)
            .with_context(|| format!("Recipe {recipe_id} not found"))?;
        let accepted = recipe.rate(value);
        if accepted {
            tracing::info!(recipe_id, value, rating = recipe.rating, "rated recipe");
        } else {
            tracing::debug!(recipe_id, value, "rating rejected");
        }
        Ok(accepted)
    }

    pub fn delete_recipe(&mut self, recipe_id: &str) -> Result<bool> {
        let deleted = self.store.delete_recipe(recipe_id);
        if deleted {
            tracing::info!(recipe_id, "deleted recipe");
        }
        Ok(deleted)
    }

    // --- Meal plans ---

    pub fn create_meal_plan(&mut self, user_id: &str, name: &str) -> Result<MealPlan> {
        self.get_user(user_id)?;
        if name.trim().is_empty() {
            bail!("Meal plan name must not be empty");
        }
        let plan = self.store.insert_meal_plan(user_id, name);
        tracing::info!(plan_id = %plan.id, user_id, "created meal plan");
        Ok(plan)
    }

    pub fn get_meal_plan(&self, user_id: &str, plan_id: &str) -> Result<MealPlan> {
        self.owned_plan(user_id, plan_id).cloned()
    }

    pub fn list_meal_plans(&self, user_id: &str) -> Result<Vec<MealPlan>> {
        self.get_user(user_id)?;
        Ok(self
            .store
            .list_meal_plans_for_user(user_id)
            .into_iter()
            .cloned()
            .collect())
    }

    pub fn add_plan_entry(
        &mut self,
        user_id: &str,
        plan_id: &str,
        day: &str,
        recipe_id: &str,
    ) -> Result<MealPlan> {
        self.owned_plan(user_id, plan_id)?;
        if self.store.get_recipe(recipe_id).is_none() {
            bail!("Recipe {recipe_id} not found");
        }
        let plan = self
            .store
            .get_meal_plan_mut(plan_id)
            .with_context(|| format!("Meal plan {plan_id} not found"))?;
        plan.add_entry(day.trim(), recipe_id);
        tracing::info!(plan_id, recipe_id, day, "added plan entry");
        Ok(plan.clone())
    }

    /// Record that `with_user_id` can see the plan. Informational only: it
    /// grants no access through this service.
    pub fn share_meal_plan(
        &mut self,
        owner_id: &str,
        plan_id: &str,
        with_user_id: &str,
    ) -> Result<MealPlan> {
        self.owned_plan(owner_id, plan_id)?;
        self.get_user(with_user_id)?;
        if owner_id == with_user_id {
            bail!("Cannot share a meal plan with its owner");
        }
        let plan = self
            .store
            .get_meal_plan_mut(plan_id)
            .with_context(|| format!("Meal plan {plan_id} not found"))?;
        if plan.share_with(with_user_id) {
            tracing::info!(plan_id, with_user_id, "shared meal plan");
        }
        Ok(plan.clone())
    }

    pub fn delete_meal_plan(&mut self, user_id: &str, plan_id: &str) -> Result<bool> {
        self.owned_plan(user_id, plan_id)?;
        Ok(self.store.delete_meal_plan(plan_id))
    }

    // --- Shopping ---

    /// Generate the shopping list for a plan the user owns. `mode` is a
    /// strategy token; unknown tokens produce the basic list.
    pub fn shopping_list(&self, user_id: &str, plan_id: &str, mode: &str) -> Result<Vec<Ingredient>> {
        let plan = self.owned_plan(user_id, plan_id)?;
        let strategy = Strategy::from_token(mode);
        let list = strategy.generate(plan, &self.store);
        tracing::debug!(plan_id, %strategy, items = list.len(), "generated shopping list");
        Ok(list)
    }

    fn owned_plan(&self, user_id: &str, plan_id: &str) -> Result<&MealPlan> {
        let plan = self
            .store
            .get_meal_plan(plan_id)
            .with_context(|| format!("Meal plan {plan_id} not found"))?;
        if plan.user_id != user_id {
            bail!("Meal plan {plan_id} does not belong to user {user_id}");
        }
        Ok(plan)
    }
}
