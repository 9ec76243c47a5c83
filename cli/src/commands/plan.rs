use anyhow::Result;
use std::path::Path;
use std::process;
use tabled::{Table, Tabled, settings::Style};

use mealprep_core::models::MealPlan;
use mealprep_core::service::MealPrepService;

use super::helpers::{print_json, truncate};

pub(crate) fn cmd_plan_create(
    svc: &mut MealPrepService,
    path: &Path,
    user_id: &str,
    name: &str,
    json: bool,
) -> Result<()> {
    let plan = svc.create_meal_plan(user_id, name)?;
    svc.save(path)?;
    if json {
        print_json(&plan)?;
    } else {
        let id = &plan.id;
        println!("Created meal plan: {name} (id: {id})");
        println!("Schedule recipes with: mealprep plan add {user_id} {id} <day> <recipe-id>");
    }
    Ok(())
}

pub(crate) fn cmd_plan_list(svc: &MealPrepService, user_id: &str, json: bool) -> Result<()> {
    #[derive(Tabled)]
    struct PlanRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Entries")]
        entries: usize,
        #[tabled(rename = "Shared with")]
        shared: usize,
    }

    let plans = svc.list_meal_plans(user_id)?;
    if plans.is_empty() {
        if json {
            println!("[]");
        } else {
            eprintln!("No meal plans found");
        }
        process::exit(2);
    }

    if json {
        return print_json(&plans);
    }

    let rows: Vec<PlanRow> = plans
        .iter()
        .map(|p| PlanRow {
            id: p.id.clone(),
            name: truncate(&p.name, 30),
            entries: p.entries.len(),
            shared: p.shared_with.len(),
        })
        .collect();
    let table = Table::new(&rows).with(Style::rounded()).to_string();
    println!("{table}");
    Ok(())
}

pub(crate) fn cmd_plan_show(
    svc: &MealPrepService,
    user_id: &str,
    plan_id: &str,
    json: bool,
) -> Result<()> {
    let plan = svc.get_meal_plan(user_id, plan_id)?;
    if json {
        return print_json(&plan);
    }
    print_plan(svc, &plan);
    Ok(())
}

fn print_plan(svc: &MealPrepService, plan: &MealPlan) {
    let name = &plan.name;
    println!("=== {name} ===");
    if plan.entries.is_empty() {
        println!("  (no entries)");
    }
    for entry in &plan.entries {
        let day = &entry.day;
        // Recipes may have been deleted since they were scheduled
        let title = svc
            .get_recipe(&entry.recipe_id)
            .map_or_else(|_| format!("{} (missing)", entry.recipe_id), |r| r.title);
        println!("  {day}: {title}");
    }
}

pub(crate) fn cmd_plan_add(
    svc: &mut MealPrepService,
    path: &Path,
    user_id: &str,
    plan_id: &str,
    day: &str,
    recipe_id: &str,
    json: bool,
) -> Result<()> {
    let plan = svc.add_plan_entry(user_id, plan_id, day, recipe_id)?;
    svc.save(path)?;
    if json {
        print_json(&plan)?;
    } else {
        print_plan(svc, &plan);
    }
    Ok(())
}

pub(crate) fn cmd_plan_share(
    svc: &mut MealPrepService,
    path: &Path,
    user_id: &str,
    plan_id: &str,
    with_user_id: &str,
    json: bool,
) -> Result<()> {
    let plan = svc.share_meal_plan(user_id, plan_id, with_user_id)?;
    svc.save(path)?;
    if json {
        print_json(&plan)?;
    } else {
        let name = &plan.name;
        println!("Shared {name} with {with_user_id}");
    }
    Ok(())
}

pub(crate) fn cmd_plan_delete(
    svc: &mut MealPrepService,
    path: &Path,
    user_id: &str,
    plan_id: &str,
    json: bool,
) -> Result<()> {
    svc.delete_meal_plan(user_id, plan_id)?;
    svc.save(path)?;
    if json {
        println!("{}", serde_json::json!({ "deleted": plan_id }));
    } else {
        println!("Deleted meal plan {plan_id}");
    }
    Ok(())
}
