use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::Local;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    MealPlan, NewRecipe, Recipe, User, normalize_email, validate_email, validate_ingredients,
    validate_new_recipe,
};

/// Snapshot format version written by [`MemoryStore::save`].
pub const SNAPSHOT_VERSION: i64 = 1;

/// Read access to recipes by identifier.
///
/// Unknown identifiers resolve to `None`; callers decide whether that matters.
pub trait RecipeLookup {
    fn get_recipe(&self, id: &str) -> Option<&Recipe>;
}

impl RecipeLookup for HashMap<String, Recipe> {
    fn get_recipe(&self, id: &str) -> Option<&Recipe> {
        self.get(id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub version: i64,
    pub exported_at: String,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub recipes: Vec<Recipe>,
    #[serde(default)]
    pub meal_plans: Vec<MealPlan>,
}

/// In-memory repository for users, recipes and meal plans.
///
/// Each entity kind keeps an id list next to its map so listings come back in
/// insertion order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: HashMap<String, User>,
    user_order: Vec<String>,
    recipes: HashMap<String, Recipe>,
    recipe_order: Vec<String>,
    meal_plans: HashMap<String, MealPlan>,
    plan_order: Vec<String>,
}

impl RecipeLookup for MemoryStore {
    fn get_recipe(&self, id: &str) -> Option<&Recipe> {
        self.recipes.get(id)
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn now() -> String {
    Local::now().to_rfc3339()
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a JSON snapshot. A missing file yields an empty store.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no snapshot file, starting empty");
            return Ok(Self::new());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read data file: {}", path.display()))?;
        let snapshot: StoreSnapshot = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse data file: {}", path.display()))?;
        Self::from_snapshot(snapshot)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(&self.to_snapshot())?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write data file: {}", path.display()))?;
        tracing::debug!(path = %path.display(), "snapshot saved");
        Ok(())
    }

    pub fn from_snapshot(snapshot: StoreSnapshot) -> Result<Self> {
        if snapshot.version > SNAPSHOT_VERSION {
            bail!(
                "Unsupported snapshot version {} (newest supported: {SNAPSHOT_VERSION})",
                snapshot.version
            );
        }

        let mut store = Self::new();
        let mut emails: HashSet<String> = HashSet::new();
        for user in snapshot.users {
            if !emails.insert(normalize_email(&user.email)) {
                bail!("Duplicate user email '{}' in snapshot", user.email);
            }
            if store.users.contains_key(&user.id) {
                bail!("Duplicate user id '{}' in snapshot", user.id);
            }
            store.user_order.push(user.id.clone());
            store.users.insert(user.id.clone(), user);
        }
        for mut recipe in snapshot.recipes {
            if store.recipes.contains_key(&recipe.id) {
                bail!("Duplicate recipe id '{}' in snapshot", recipe.id);
            }
            validate_ingredients(&recipe.ingredients)
                .with_context(|| format!("Invalid recipe '{}' in snapshot", recipe.id))?;
            recipe.refresh_rating();
            store.recipe_order.push(recipe.id.clone());
            store.recipes.insert(recipe.id.clone(), recipe);
        }
        for plan in snapshot.meal_plans {
            if store.meal_plans.contains_key(&plan.id) {
                bail!("Duplicate meal plan id '{}' in snapshot", plan.id);
            }
            store.plan_order.push(plan.id.clone());
            store.meal_plans.insert(plan.id.clone(), plan);
        }
        Ok(store)
    }

    #[must_use]
    pub fn to_snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            version: SNAPSHOT_VERSION,
            exported_at: now(),
            users: self.list_users().into_iter().cloned().collect(),
            recipes: self.list_recipes().into_iter().cloned().collect(),
            meal_plans: self
                .plan_order
                .iter()
                .filter_map(|id| self.meal_plans.get(id))
                .cloned()
                .collect(),
        }
    }

    // --- Users ---

    pub fn insert_user(&mut self, name: &str, email: &str) -> Result<User> {
        validate_email(email)?;
        if self.find_user_by_email(email).is_some() {
            bail!("A user with email '{}' already exists", email.trim());
        }
        let user = User {
            id: new_id(),
            name: name.trim().to_string(),
            email: email.trim().to_string(),
        };
        self.user_order.push(user.id.clone());
        self.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    #[must_use]
    pub fn get_user(&self, id: &str) -> Option<&User> {
        self.users.get(id)
    }

    #[must_use]
    pub fn find_user_by_email(&self, email: &str) -> Option<&User> {
        let wanted = normalize_email(email);
        self.list_users()
            .into_iter()
            .find(|u| normalize_email(&u.email) == wanted)
    }

    #[must_use]
    pub fn list_users(&self) -> Vec<&User> {
        self.user_order
            .iter()
            .filter_map(|id| self.users.get(id))
            .collect()
    }

    // --- Recipes ---

    pub fn insert_recipe(&mut self, new: NewRecipe) -> Result<Recipe> {
        validate_new_recipe(&new)?;
        let recipe = Recipe::from_new(new_id(), new, now());
        self.recipe_order.push(recipe.id.clone());
        self.recipes.insert(recipe.id.clone(), recipe.clone());
        Ok(recipe)
    }

    #[must_use]
    pub fn get_recipe_mut(&mut self, id: &str) -> Option<&mut Recipe> {
        self.recipes.get_mut(id)
    }

    #[must_use]
    pub fn list_recipes(&self) -> Vec<&Recipe> {
        self.recipe_order
            .iter()
            .filter_map(|id| self.recipes.get(id))
            .collect()
    }

    /// Plan entries pointing at the recipe are left in place.
    pub fn delete_recipe(&mut self, id: &str) -> bool {
        if self.recipes.remove(id).is_none() {
            return false;
        }
        self.recipe_order.retain(|r| r != id);
        true
    }

    // --- Meal plans ---

    pub fn insert_meal_plan(&mut self, user_id: &str, name: &str) -> MealPlan {
        let plan = MealPlan {
            id: new_id(),
            user_id: user_id.to_string(),
            name: name.trim().to_string(),
            entries: Vec::new(),
            shared_with: Vec::new(),
            created_at: now(),
        };
        self.plan_order.push(plan.id.clone());
        self.meal_plans.insert(plan.id.clone(), plan.clone());
        plan
    }

    #[must_use]
    pub fn get_meal_plan(&self, id: &str) -> Option<&MealPlan> {
        self.meal_plans.get(id)
    }

    #[must_use]
    pub fn get_meal_plan_mut(&mut self, id: &str) -> Option<&mut MealPlan> {
        self.meal_plans.get_mut(id)
    }

    #[must_use]
    pub fn list_meal_plans_for_user(&self, user_id: &str) -> Vec<&MealPlan> {
        self.plan_order
            .iter()
            .filter_map(|id| self.meal_plans.get(id))
            .filter(|p| p.user_id == user_id)
            .collect()
    }

    pub fn delete_meal_plan(&mut self, id: &str) -> bool {
        if self.meal_plans.remove(id).is_none() {
            return false;
        }
        self.plan_order.retain(|p| p != id);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Ingredient;

    fn sample_recipe(title: &str) -> NewRecipe {
        NewRecipe {
            title: title.to_string(),
            ingredients: vec![Ingredient::new("Rice", 100.0, "g")],
            ..NewRecipe::default()
        }
    }

    #[test]
    fn test_insert_and_get_recipe() {
        let mut store = MemoryStore::new();
        let recipe = store.insert_recipe(sample_recipe("Fried Rice")).unwrap();

        assert!(!recipe.id.is_empty());
        assert!(!recipe.created_at.is_empty());
        let fetched = store.get_recipe(&recipe.id).unwrap();
        assert_eq!(fetched.title, "Fried Rice");
        assert_eq!(fetched.ingredients.len(), 1);
    }

    #[test]
    fn test_get_unknown_recipe_is_none() {
        let store = MemoryStore::new();
        assert!(store.get_recipe("missing").is_none());
    }

    #[test]
    fn test_insert_recipe_validates() {
        let mut store = MemoryStore::new();
        assert!(store.insert_recipe(sample_recipe("")).is_err());
        assert!(store.list_recipes().is_empty());
    }

    #[test]
    fn test_recipe_ids_are_unique() {
        let mut store = MemoryStore::new();
        let a = store.insert_recipe(sample_recipe("A")).unwrap();
        let b = store.insert_recipe(sample_recipe("A")).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_list_recipes_in_insertion_order() {
        let mut store = MemoryStore::new();
        for title in ["Zucchini Bake", "Apple Pie", "Miso Soup"] {
            store.insert_recipe(sample_recipe(title)).unwrap();
        }
        let titles: Vec<&str> = store
            .list_recipes()
            .iter()
            .map(|r| r.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Zucchini Bake", "Apple Pie", "Miso Soup"]);
    }

    #[test]
    fn test_delete_recipe_keeps_plan_entries() {
        let mut store = MemoryStore::new();
        let recipe = store.insert_recipe(sample_recipe("Soup")).unwrap();
        let plan = store.insert_meal_plan("u1", "Week");
        store
            .get_meal_plan_mut(&plan.id)
            .unwrap()
            .add_entry("Monday", recipe.id.clone());

        assert!(store.delete_recipe(&recipe.id));
        assert!(!store.delete_recipe(&recipe.id));
        assert!(store.get_recipe(&recipe.id).is_none());
        assert!(store.list_recipes().is_empty());
        assert_eq!(store.get_meal_plan(&plan.id).unwrap().entries.len(), 1);
    }

    #[test]
    fn test_insert_user_rejects_duplicate_email() {
        let mut store = MemoryStore::new();
        store.insert_user("Alice", "alice@example.com").unwrap();
        assert!(store.insert_user("Other Alice", "alice@example.com").is_err());
        assert!(store.insert_user("Shouty", " ALICE@example.com").is_err());
        assert_eq!(store.list_users().len(), 1);
    }

    #[test]
    fn test_insert_user_rejects_invalid_email() {
        let mut store = MemoryStore::new();
        assert!(store.insert_user("Bob", "bob").is_err());
    }

    #[test]
    fn test_find_user_by_email() {
        let mut store = MemoryStore::new();
        let user = store.insert_user("Alice", "alice@example.com").unwrap();
        assert_eq!(
            store.find_user_by_email("Alice@Example.com").unwrap().id,
            user.id
        );
        assert!(store.find_user_by_email("bob@example.com").is_none());
    }

    #[test]
    fn test_meal_plans_listed_per_user() {
        let mut store = MemoryStore::new();
        store.insert_meal_plan("u1", "Week 1");
        store.insert_meal_plan("u2", "Other");
        store.insert_meal_plan("u1", "Week 2");

        let names: Vec<&str> = store
            .list_meal_plans_for_user("u1")
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["Week 1", "Week 2"]);
    }

    #[test]
    fn test_delete_meal_plan() {
        let mut store = MemoryStore::new();
        let plan = store.insert_meal_plan("u1", "Week");
        assert!(store.delete_meal_plan(&plan.id));
        assert!(!store.delete_meal_plan(&plan.id));
        assert!(store.list_meal_plans_for_user("u1").is_empty());
    }

    #[test]
    fn test_hashmap_lookup() {
        let mut map = HashMap::new();
        let recipe = Recipe::from_new("r1".to_string(), sample_recipe("Rice"), String::new());
        map.insert(recipe.id.clone(), recipe);
        assert!(map.get_recipe("r1").is_some());
        assert!(map.get_recipe("r2").is_none());
    }

    #[test]
    fn test_snapshot_round_trip_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("data.json");

        let mut store = MemoryStore::new();
        let user = store.insert_user("Alice", "alice@example.com").unwrap();
        let b = store.insert_recipe(sample_recipe("B")).unwrap();
        let a = store.insert_recipe(sample_recipe("A")).unwrap();
        store.get_recipe_mut(&a.id).unwrap().rate(4);
        let plan = store.insert_meal_plan(&user.id, "Week");
        store
            .get_meal_plan_mut(&plan.id)
            .unwrap()
            .add_entry("Monday", b.id.clone());
        store.save(&path).unwrap();

        let loaded = MemoryStore::open(&path).unwrap();
        let titles: Vec<&str> = loaded
            .list_recipes()
            .iter()
            .map(|r| r.title.as_str())
            .collect();
        assert_eq!(titles, vec!["B", "A"]);
        assert!((loaded.get_recipe(&a.id).unwrap().rating - 4.0).abs() < f64::EPSILON);
        assert_eq!(loaded.list_users().len(), 1);
        let plans = loaded.list_meal_plans_for_user(&user.id);
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].entries[0].recipe_id, b.id);
    }

    #[test]
    fn test_open_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::open(&dir.path().join("absent.json")).unwrap();
        assert!(store.list_recipes().is_empty());
        assert!(store.list_users().is_empty());
    }

    #[test]
    fn test_from_snapshot_rejects_duplicate_email() {
        let snapshot = StoreSnapshot {
            version: SNAPSHOT_VERSION,
            exported_at: String::new(),
            users: vec![
                User {
                    id: "u1".to_string(),
                    name: "A".to_string(),
                    email: "a@example.com".to_string(),
                },
                User {
                    id: "u2".to_string(),
                    name: "B".to_string(),
                    email: "A@example.com".to_string(),
                },
            ],
            recipes: Vec::new(),
            meal_plans: Vec::new(),
        };
        assert!(MemoryStore::from_snapshot(snapshot).is_err());
    }

    #[test]
    fn test_from_snapshot_rejects_newer_version() {
        let snapshot = StoreSnapshot {
            version: SNAPSHOT_VERSION + 1,
            exported_at: String::new(),
            users: Vec::new(),
            recipes: Vec::new(),
            meal_plans: Vec::new(),
        };
        assert!(MemoryStore::from_snapshot(snapshot).is_err());
    }

    #[test]
    fn test_from_snapshot_recomputes_rating() {
        let snapshot: StoreSnapshot = serde_json::from_str(
            r#"{"version":1,"exported_at":"","recipes":[
                {"id":"r1","title":"Toast","ratings":[2,4],"rating":0}
            ]}"#,
        )
        .unwrap();
        let store = MemoryStore::from_snapshot(snapshot).unwrap();
        assert!((store.get_recipe("r1").unwrap().rating - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_from_snapshot_rejects_negative_amount() {
        let snapshot: StoreSnapshot = serde_json::from_str(
            r#"{"version":1,"exported_at":"","recipes":[
                {"id":"r1","title":"Soup","ingredients":[{"name":"Salt","amount":5,"unit":"g"}]},
                {"id":"r2","title":"Stew","ingredients":[{"name":"Salt","amount":-9,"unit":"g"}]}
            ]}"#,
        )
        .unwrap();
        let err = MemoryStore::from_snapshot(snapshot).unwrap_err();
        assert!(format!("{err:#}").contains("Invalid recipe 'r2'"));
    }

    #[test]
    fn test_from_snapshot_rejects_nameless_ingredient() {
        let snapshot: StoreSnapshot = serde_json::from_str(
            r#"{"version":1,"exported_at":"","recipes":[
                {"id":"r1","title":"Soup","ingredients":[{"name":"","amount":1}]}
            ]}"#,
        )
        .unwrap();
        assert!(MemoryStore::from_snapshot(snapshot).is_err());
    }

    #[test]
    fn test_open_rejects_invalid_snapshot_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mealprep.json");
        std::fs::write(
            &path,
            r#"{"version":1,"exported_at":"","recipes":[
                {"id":"r1","title":"Stew","ingredients":[{"name":"Salt","amount":-1,"unit":"g"}]}
            ]}"#,
        )
        .unwrap();
        assert!(MemoryStore::open(&path).is_err());
    }
}
