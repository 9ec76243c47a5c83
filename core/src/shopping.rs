use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::{Ingredient, MealPlan};
use crate::store::RecipeLookup;

pub const VEGAN_DENYLIST: &[&str] = &[
    "meat", "chicken", "beef", "pork", "fish", "egg", "milk", "cheese", "butter", "honey",
];

pub const GLUTEN_FREE_DENYLIST: &[&str] = &["wheat", "flour", "bread", "pasta", "barley", "rye"];

/// How a shopping list is derived from a meal plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Strategy {
    #[default]
    #[serde(rename = "basic")]
    Basic,
    #[serde(rename = "vegan")]
    Vegan,
    #[serde(rename = "glutenFree")]
    GlutenFree,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Basic, Strategy::Vegan, Strategy::GlutenFree];

    /// Map a mode token to a strategy. Only the exact tokens `basic`, `vegan`
    /// and `glutenFree` are recognized; anything else falls back to `Basic`.
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        match token {
            "basic" => Strategy::Basic,
            "vegan" => Strategy::Vegan,
            "glutenFree" => Strategy::GlutenFree,
            _ => {
                tracing::debug!(token, "unrecognized strategy, using basic");
                Strategy::Basic
            }
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Basic => "basic",
            Strategy::Vegan => "vegan",
            Strategy::GlutenFree => "glutenFree",
        }
    }

    #[must_use]
    pub fn denylist(self) -> &'static [&'static str] {
        match self {
            Strategy::Basic => &[],
            Strategy::Vegan => VEGAN_DENYLIST,
            Strategy::GlutenFree => GLUTEN_FREE_DENYLIST,
        }
    }

    /// Build the shopping list for `plan`. Filtering variants run the basic
    /// aggregation first and then drop denylisted ingredient names.
    pub fn generate<L: RecipeLookup + ?Sized>(self, plan: &MealPlan, lookup: &L) -> Vec<Ingredient> {
        let merged = aggregate(plan, lookup);
        match self {
            Strategy::Basic => merged,
            Strategy::Vegan | Strategy::GlutenFree => exclude(merged, self.denylist()),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Merge the ingredients of every recipe the plan references.
///
/// Ingredients are keyed by `(name, unit)` exactly as written. A recipe listed
/// twice contributes twice. Unknown recipe ids are skipped. Output keeps the
/// order in which each key was first seen.
pub fn aggregate<L: RecipeLookup + ?Sized>(plan: &MealPlan, lookup: &L) -> Vec<Ingredient> {
    let mut merged: Vec<Ingredient> = Vec::new();
    let mut index: HashMap<(String, String), usize> = HashMap::new();

    for recipe_id in plan.recipe_ids() {
        let Some(recipe) = lookup.get_recipe(recipe_id) else {
            tracing::debug!(plan_id = %plan.id, recipe_id, "recipe not found, skipping");
            continue;
        };
        for ing in &recipe.ingredients {
            match index.entry(ing.merge_key()) {
                Entry::Occupied(slot) => merged[*slot.get()].amount += ing.amount,
                Entry::Vacant(slot) => {
                    slot.insert(merged.len());
                    merged.push(ing.clone());
                }
            }
        }
    }

    merged
}

/// First denylist term found in `name`, compared lower-cased.
#[must_use]
pub fn excluded_term(name: &str, denylist: &[&'static str]) -> Option<&'static str> {
    let lower = name.to_lowercase();
    denylist.iter().copied().find(|term| lower.contains(term))
}

/// Drop every ingredient whose name contains a denylist term.
#[must_use]
pub fn exclude(ingredients: Vec<Ingredient>, denylist: &[&'static str]) -> Vec<Ingredient> {
    ingredients
        .into_iter()
        .filter(|ing| match excluded_term(&ing.name, denylist) {
            Some(term) => {
                tracing::debug!(ingredient = %ing.name, term, "excluded by dietary filter");
                false
            }
            None => true,
        })
        .collect()
}
