use anyhow::Result;
use std::process;

use mealprep_core::service::MealPrepService;
use mealprep_core::shopping::Strategy;

use super::helpers::{print_ingredient_table, print_json};

pub(crate) fn cmd_shop(
    svc: &MealPrepService,
    user_id: &str,
    plan_id: &str,
    mode: &str,
    json: bool,
) -> Result<()> {
    let list = svc.shopping_list(user_id, plan_id, mode)?;

    if json {
        return print_json(&list);
    }

    let strategy = Strategy::from_token(mode);
    if list.is_empty() {
        eprintln!("Nothing to buy ({strategy})");
        process::exit(2);
    }

    let plan = svc.get_meal_plan(user_id, plan_id)?;
    let name = &plan.name;
    let count = list.len();
    println!("Shopping list for {name} ({strategy}, {count} items)");
    print_ingredient_table(&list);
    Ok(())
}
