use anyhow::{Context, Result, bail};
use std::path::Path;
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use mealprep_core::models::{Ingredient, NewRecipe};
use mealprep_core::service::MealPrepService;

use super::helpers::{
    json_error, parse_ingredients, print_ingredient_table, print_json, truncate,
};

#[allow(clippy::too_many_arguments)]
pub(crate) fn cmd_recipe_add(
    svc: &mut MealPrepService,
    path: &Path,
    title: &str,
    ingredients: &[String],
    steps: Vec<String>,
    tags: Vec<String>,
    dietary_flags: Vec<String>,
    json: bool,
) -> Result<()> {
    let recipe = svc.create_recipe(NewRecipe {
        title: title.to_string(),
        ingredients: parse_ingredients(ingredients)?,
        steps,
        tags,
        dietary_flags,
    })?;
    svc.save(path)?;

    if json {
        print_json(&recipe)?;
    } else {
        let id = &recipe.id;
        let count = recipe.ingredients.len();
        println!("Created recipe: {title} (id: {id}, {count} ingredients)");
    }
    Ok(())
}

pub(crate) fn cmd_recipe_list(svc: &MealPrepService, tag: Option<&str>, json: bool) -> Result<()> {
    #[derive(Tabled)]
    struct RecipeRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Title")]
        title: String,
        #[tabled(rename = "Ingredients")]
        ingredients: usize,
        #[tabled(rename = "Rating")]
        rating: String,
        #[tabled(rename = "Tags")]
        tags: String,
    }

    let recipes = svc.list_recipes(tag);
    if recipes.is_empty() {
        if json {
            println!("[]");
        } else {
            eprintln!("No recipes found");
        }
        process::exit(2);
    }

    if json {
        return print_json(&recipes);
    }

    let rows: Vec<RecipeRow> = recipes
        .iter()
        .map(|r| RecipeRow {
            id: r.id.clone(),
            title: truncate(&r.title, 30),
            ingredients: r.ingredients.len(),
            rating: if r.ratings.is_empty() {
                "-".to_string()
            } else {
                format!("{:.1} ({})", r.rating, r.ratings.len())
            },
            tags: truncate(&r.tags.join(", "), 30),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..4)).with(Alignment::right()))
        .to_string();
    println!("{table}");

    Ok(())
}

pub(crate) fn cmd_recipe_show(svc: &MealPrepService, recipe_id: &str, json: bool) -> Result<()> {
    let recipe = svc.get_recipe(recipe_id)?;

    if json {
        return print_json(&recipe);
    }

    let title = &recipe.title;
    println!("=== {title} ===");
    if recipe.ratings.is_empty() {
        println!("  Rating: not rated yet");
    } else {
        let rating = recipe.rating;
        let count = recipe.ratings.len();
        println!("  Rating: {rating:.1} from {count} rating(s)");
    }
    if !recipe.tags.is_empty() {
        println!("  Tags: {}", recipe.tags.join(", "));
    }
    if !recipe.dietary_flags.is_empty() {
        println!("  Dietary: {}", recipe.dietary_flags.join(", "));
    }

    println!("\n  INGREDIENTS:");
    for ing in &recipe.ingredients {
        println!("    {ing}");
    }

    if !recipe.steps.is_empty() {
        println!("\n  STEPS:");
        for (i, step) in recipe.steps.iter().enumerate() {
            println!("    {}. {step}", i + 1);
        }
    }

    Ok(())
}

pub(crate) fn cmd_recipe_rate(
    svc: &mut MealPrepService,
    path: &Path,
    recipe_id: &str,
    value: i64,
    json: bool,
) -> Result<()> {
    if !svc.rate_recipe(recipe_id, value)? {
        if json {
            println!("{}", json_error("Rating must be between 1 and 5"));
        } else {
            eprintln!("Rating must be between 1 and 5 (got {value})");
        }
        process::exit(2);
    }
    svc.save(path)?;

    let recipe = svc.get_recipe(recipe_id)?;
    if json {
        print_json(&recipe)?;
    } else {
        let title = &recipe.title;
        let rating = recipe.rating;
        let count = recipe.ratings.len();
        println!("Rated {title}: now {rating:.1} from {count} rating(s)");
    }
    Ok(())
}

pub(crate) fn cmd_recipe_delete(
    svc: &mut MealPrepService,
    path: &Path,
    recipe_id: &str,
    json: bool,
) -> Result<()> {
    if svc.delete_recipe(recipe_id)? {
        svc.save(path)?;
        if json {
            println!("{}", serde_json::json!({ "deleted": recipe_id }));
        } else {
            println!("Deleted recipe {recipe_id}");
        }
        Ok(())
    } else {
        if json {
            println!("{}", json_error(&format!("Recipe {recipe_id} not found")));
        } else {
            eprintln!("Recipe {recipe_id} not found");
        }
        process::exit(2);
    }
}

pub(crate) fn cmd_recipe_import(
    svc: &mut MealPrepService,
    path: &Path,
    file: &Path,
    title_override: Option<String>,
    tags: Vec<String>,
    json: bool,
) -> Result<()> {
    let input = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read file: {}", file.display()))?;

    let (recipe_data, _report) = cooklang::parse(&input)
        .into_result()
        .map_err(|e| anyhow::anyhow!("Failed to parse Cooklang file: {e}"))?;

    let title = title_override
        .or_else(|| recipe_data.metadata.title().map(String::from))
        .or_else(|| file.file_stem().and_then(|s| s.to_str()).map(String::from))
        .context("Could not determine recipe title. Use --title to specify one")?;

    let converter = cooklang::Converter::default();
    let grouped = recipe_data.group_ingredients(&converter);

    let ingredients: Vec<Ingredient> = grouped
        .iter()
        .flat_map(|gi| cooklang_ingredients(gi))
        .collect();

    if ingredients.is_empty() {
        bail!("No ingredients found in recipe");
    }

    let recipe = svc.create_recipe(NewRecipe {
        title,
        ingredients,
        steps: Vec::new(),
        tags,
        dietary_flags: Vec::new(),
    })?;
    svc.save(path)?;

    if json {
        print_json(&recipe)?;
    } else {
        let rtitle = &recipe.title;
        let id = &recipe.id;
        println!("Imported recipe: {rtitle} (id: {id})");
        print_ingredient_table(&recipe.ingredients);
    }

    Ok(())
}

/// One ingredient per grouped quantity, so differing units stay separate.
/// Units are copied verbatim; a missing or non-numeric quantity counts as 1.
fn cooklang_ingredients(gi: &cooklang::ingredient_list::GroupedIngredient<'_>) -> Vec<Ingredient> {
    let name = gi.ingredient.display_name().to_string();

    let mut out: Vec<Ingredient> = gi
        .quantity
        .iter()
        .map(|qty: &cooklang::Quantity| {
            let amount = match qty.value() {
                cooklang::Value::Number(n) => n.value(),
                cooklang::Value::Range { start, .. } => start.value(),
                cooklang::Value::Text(t) => t.trim().parse::<f64>().unwrap_or(1.0),
            };
            let unit = qty.unit().unwrap_or_default();
            Ingredient::new(name.clone(), amount, unit)
        })
        .collect();

    if out.is_empty() {
        tracing::debug!(ingredient = %name, "no quantity in recipe, assuming 1");
        out.push(Ingredient::new(name, 1.0, ""));
    }
    out
}
