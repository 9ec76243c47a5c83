use std::fmt;

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub amount: f64,
    #[serde(default)]
    pub unit: String,
}

impl Ingredient {
    pub fn new(name: impl Into<String>, amount: f64, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            amount,
            unit: unit.into(),
        }
    }

    /// The `(name, unit)` pair two occurrences must share to be summed.
    #[must_use]
    pub fn merge_key(&self) -> (String, String) {
        (self.name.clone(), self.unit.clone())
    }
}

impl fmt::Display for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let amount = self.amount;
        let name = self.name.trim();
        let unit = self.unit.trim();
        if unit.is_empty() {
            write!(f, "{amount} {name}")
        } else {
            write!(f, "{amount} {unit} {name}")
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub dietary_flags: Vec<String>,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub ratings: Vec<u8>,
    #[serde(default)]
    pub created_at: String,
}

impl Recipe {
    #[must_use]
    pub fn from_new(id: String, new: NewRecipe, created_at: String) -> Self {
        Self {
            id,
            title: new.title,
            ingredients: new.ingredients,
            steps: new.steps,
            tags: new.tags,
            dietary_flags: new.dietary_flags,
            rating: 0.0,
            ratings: Vec::new(),
            created_at,
        }
    }

    /// Record a 1-5 rating and recompute the average.
    ///
    /// Out-of-range values leave the recipe untouched and return `false`.
    pub fn rate(&mut self, value: i64) -> bool {
        let Ok(value) = u8::try_from(value) else {
            return false;
        };
        if !(1..=5).contains(&value) {
            return false;
        }
        self.ratings.push(value);
        self.refresh_rating();
        true
    }

    /// Recompute `rating` from `ratings`, dropping any stored value outside 1-5.
    pub fn refresh_rating(&mut self) {
        self.ratings.retain(|r| (1..=5).contains(r));
        self.rating = average(&self.ratings);
    }

    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

#[allow(clippy::cast_precision_loss)]
fn average(ratings: &[u8]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    let sum: u64 = ratings.iter().map(|&r| u64::from(r)).sum();
    sum as f64 / ratings.len() as f64
}

#[derive(Debug, Clone, Default)]
pub struct NewRecipe {
    pub title: String,
    pub ingredients: Vec<Ingredient>,
    pub steps: Vec<String>,
    pub tags: Vec<String>,
    pub dietary_flags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanEntry {
    pub day: String,
    pub recipe_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealPlan {
    pub id: String,
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub entries: Vec<PlanEntry>,
    #[serde(default)]
    pub shared_with: Vec<String>,
    #[serde(default)]
    pub created_at: String,
}

impl MealPlan {
    pub fn add_entry(&mut self, day: impl Into<String>, recipe_id: impl Into<String>) {
        self.entries.push(PlanEntry {
            day: day.into(),
            recipe_id: recipe_id.into(),
        });
    }

    /// Recipe ids in entry order, duplicates kept, empty references dropped.
    pub fn recipe_ids(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .map(|e| e.recipe_id.as_str())
            .filter(|id| !id.is_empty())
    }

    /// Returns `false` when the user was already listed.
    pub fn share_with(&mut self, user_id: &str) -> bool {
        if self.shared_with.iter().any(|u| u == user_id) {
            return false;
        }
        self.shared_with.push(user_id.to_string());
        true
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Emails are compared trimmed and lower-cased.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_email(email: &str) -> Result<()> {
    let email = email.trim();
    let Some((local, domain)) = email.split_once('@') else {
        bail!("Invalid email '{email}': missing '@'");
    };
    if local.is_empty() || domain.is_empty() {
        bail!("Invalid email '{email}'");
    }
    Ok(())
}

/// Validate recipe input: title must not be empty, ingredient names must not be
/// empty, amounts must be finite and non-negative.
pub fn validate_new_recipe(recipe: &NewRecipe) -> Result<()> {
    if recipe.title.trim().is_empty() {
        bail!("Recipe title must not be empty");
    }
    validate_ingredients(&recipe.ingredients)
}

/// Every ingredient needs a name and a finite, non-negative amount.
pub fn validate_ingredients(ingredients: &[Ingredient]) -> Result<()> {
    for ing in ingredients {
        if ing.name.trim().is_empty() {
            bail!("Ingredient name must not be empty");
        }
        if !ing.amount.is_finite() || ing.amount < 0.0 {
            let name = &ing.name;
            bail!("Ingredient '{name}' must have a non-negative amount");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_recipe() -> Recipe {
        Recipe::from_new(
            "r1".to_string(),
            NewRecipe {
                title: "Stir Fry".to_string(),
                ingredients: vec![Ingredient::new("Broccoli", 200.0, "g")],
                tags: vec!["Dinner".to_string()],
                ..NewRecipe::default()
            },
            String::new(),
        )
    }

    #[test]
    fn test_ingredient_display_with_unit() {
        let ing = Ingredient::new("Soy Sauce", 3.0, "tbsp");
        assert_eq!(ing.to_string(), "3 tbsp Soy Sauce");
    }

    #[test]
    fn test_ingredient_display_without_unit() {
        let ing = Ingredient::new("Eggs", 2.0, "");
        assert_eq!(ing.to_string(), "2 Eggs");
        let ing = Ingredient::new("Lemon", 0.5, "  ");
        assert_eq!(ing.to_string(), "0.5 Lemon");
    }

    #[test]
    fn test_merge_key_is_case_sensitive() {
        let a = Ingredient::new("Garlic", 1.0, "cloves");
        let b = Ingredient::new("garlic", 1.0, "cloves");
        assert_ne!(a.merge_key(), b.merge_key());
    }

    #[test]
    fn test_new_recipe_has_no_rating() {
        let recipe = sample_recipe();
        assert!(recipe.ratings.is_empty());
        assert!(recipe.rating.abs() < f64::EPSILON);
    }

    #[test]
    fn test_rate_rejects_out_of_range() {
        let mut recipe = sample_recipe();
        assert!(!recipe.rate(0));
        assert!(!recipe.rate(6));
        assert!(!recipe.rate(-1));
        assert!(!recipe.rate(300));
        assert!(recipe.ratings.is_empty());
        assert!(recipe.rating.abs() < f64::EPSILON);
    }

    #[test]
    fn test_rate_recomputes_mean() {
        let mut recipe = sample_recipe();
        assert!(recipe.rate(3));
        assert!(recipe.rate(5));
        assert_eq!(recipe.ratings.len(), 2);
        assert!((recipe.rating - 4.0).abs() < f64::EPSILON);

        // Rejected value after valid ones changes nothing
        assert!(!recipe.rate(9));
        assert_eq!(recipe.ratings, vec![3, 5]);
        assert!((recipe.rating - 4.0).abs() < f64::EPSILON);

        assert!(recipe.rate(1));
        assert!((recipe.rating - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_refresh_rating_drops_invalid_stored_values() {
        let mut recipe = sample_recipe();
        recipe.ratings = vec![2, 0, 4, 7];
        recipe.rating = 99.0;
        recipe.refresh_rating();
        assert_eq!(recipe.ratings, vec![2, 4]);
        assert!((recipe.rating - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_has_tag_case_insensitive() {
        let recipe = sample_recipe();
        assert!(recipe.has_tag("dinner"));
        assert!(recipe.has_tag("DINNER"));
        assert!(!recipe.has_tag("lunch"));
    }

    #[test]
    fn test_recipe_ids_keep_duplicates_and_drop_empty() {
        let mut plan = MealPlan {
            id: "p1".to_string(),
            user_id: "u1".to_string(),
            name: "Week".to_string(),
            entries: Vec::new(),
            shared_with: Vec::new(),
            created_at: String::new(),
        };
        plan.add_entry("Monday", "a");
        plan.add_entry("Tuesday", "");
        plan.add_entry("Wednesday", "b");
        plan.add_entry("Friday", "a");
        plan.add_entry("Sunday", " ");

        let ids: Vec<&str> = plan.recipe_ids().collect();
        assert_eq!(ids, vec!["a", "b", "a", " "]);
        assert_eq!(plan.entries.len(), 5);
        assert_eq!(plan.entries[1].day, "Tuesday");
    }

    #[test]
    fn test_share_with_is_idempotent() {
        let mut plan = MealPlan {
            id: "p1".to_string(),
            user_id: "u1".to_string(),
            name: "Week".to_string(),
            entries: Vec::new(),
            shared_with: Vec::new(),
            created_at: String::new(),
        };
        assert!(plan.share_with("u2"));
        assert!(!plan.share_with("u2"));
        assert_eq!(plan.shared_with, vec!["u2".to_string()]);
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("alice@example.com").is_ok());
        assert!(validate_email(" bob@example.org ").is_ok());
        assert!(validate_email("nope").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("alice@").is_err());
        assert!(validate_email("").is_err());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
    }

    #[test]
    fn test_validate_new_recipe() {
        let ok = NewRecipe {
            title: "Salad".to_string(),
            ingredients: vec![Ingredient::new("Lettuce", 1.0, "head")],
            ..NewRecipe::default()
        };
        assert!(validate_new_recipe(&ok).is_ok());

        let untitled = NewRecipe {
            title: "  ".to_string(),
            ..NewRecipe::default()
        };
        assert!(validate_new_recipe(&untitled).is_err());

        let negative = NewRecipe {
            title: "Salad".to_string(),
            ingredients: vec![Ingredient::new("Lettuce", -1.0, "")],
            ..NewRecipe::default()
        };
        assert!(validate_new_recipe(&negative).is_err());

        let nameless = NewRecipe {
            title: "Salad".to_string(),
            ingredients: vec![Ingredient::new("", 1.0, "")],
            ..NewRecipe::default()
        };
        assert!(validate_new_recipe(&nameless).is_err());

        let nan = NewRecipe {
            title: "Salad".to_string(),
            ingredients: vec![Ingredient::new("Lettuce", f64::NAN, "")],
            ..NewRecipe::default()
        };
        assert!(validate_new_recipe(&nan).is_err());
    }

    #[test]
    fn test_validate_ingredients() {
        assert!(validate_ingredients(&[]).is_ok());
        assert!(validate_ingredients(&[Ingredient::new("Salt", 0.0, "g")]).is_ok());

        let err = validate_ingredients(&[
            Ingredient::new("Salt", 5.0, "g"),
            Ingredient::new("Pepper", -9.0, "g"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("Pepper"));

        assert!(validate_ingredients(&[Ingredient::new(" ", 1.0, "")]).is_err());
        assert!(validate_ingredients(&[Ingredient::new("Salt", f64::INFINITY, "g")]).is_err());
    }

    #[test]
    fn test_recipe_deserializes_with_defaults() {
        let recipe: Recipe =
            serde_json::from_str(r#"{"id":"r9","title":"Toast"}"#).unwrap();
        assert!(recipe.ingredients.is_empty());
        assert!(recipe.ratings.is_empty());
        assert!(recipe.rating.abs() < f64::EPSILON);
    }
}
