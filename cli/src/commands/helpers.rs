use anyhow::{Context, Result, bail};
use serde::Serialize;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use mealprep_core::models::Ingredient;

/// Parse an ingredient argument.
///
/// Accepts "<amount> <unit> <name...>", "<amount> <name>" (no unit) and
/// "<amount><unit> <name...>" such as "200g Broccoli".
pub(crate) fn parse_ingredient(s: &str) -> Result<Ingredient> {
    let tokens: Vec<&str> = s.split_whitespace().collect();
    let Some((first, rest)) = tokens.split_first() else {
        bail!("Empty ingredient. Use '<amount> [unit] <name>', e.g. '200 g Broccoli'");
    };
    if rest.is_empty() {
        bail!("Invalid ingredient '{s}'. Use '<amount> [unit] <name>', e.g. '200 g Broccoli'");
    }

    let (amount, unit, name_tokens) = if let Ok(amount) = first.parse::<f64>() {
        if rest.len() >= 2 {
            (amount, rest[0], &rest[1..])
        } else {
            (amount, "", rest)
        }
    } else if let Some((amount, unit)) = split_number_unit(first) {
        (amount, unit, rest)
    } else {
        bail!("Invalid amount '{first}' in ingredient '{s}'");
    };

    if !amount.is_finite() || amount < 0.0 {
        bail!("Ingredient amount must be a non-negative number (got '{first}')");
    }

    Ok(Ingredient::new(name_tokens.join(" "), amount, unit))
}

/// Split "200g" or "2.5tbsp" into (200.0, "g") or (2.5, "tbsp").
fn split_number_unit(s: &str) -> Option<(f64, &str)> {
    let idx = s.find(|c: char| c.is_alphabetic())?;
    if idx == 0 {
        return None;
    }
    let (num_part, unit_part) = s.split_at(idx);
    let qty: f64 = num_part.parse().ok()?;
    Some((qty, unit_part))
}

pub(crate) fn parse_ingredients(args: &[String]) -> Result<Vec<Ingredient>> {
    args.iter()
        .map(|a| parse_ingredient(a).with_context(|| format!("Bad --ingredient '{a}'")))
        .collect()
}

/// Round for display and drop the fractional part when it is zero.
pub(crate) fn format_amount(v: f64) -> String {
    let rounded = (v * 100.0).round() / 100.0;
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{rounded}")
}

pub(crate) fn print_ingredient_table(ingredients: &[Ingredient]) {
    #[derive(Tabled)]
    struct IngredientRow {
        #[tabled(rename = "Amount")]
        amount: String,
        #[tabled(rename = "Unit")]
        unit: String,
        #[tabled(rename = "Ingredient")]
        name: String,
    }

    let rows: Vec<IngredientRow> = ingredients
        .iter()
        .map(|i| IngredientRow {
            amount: format_amount(i.amount),
            unit: i.unit.clone(),
            name: truncate(&i.name, 40),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(0..1)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) fn json_error(message: &str) -> String {
    #[derive(Serialize)]
    struct CliError<'a> {
        error: &'a str,
    }
    serde_json::to_string(&CliError { error: message })
        .unwrap_or_else(|_| format!("{{\"error\":\"{message}\"}}"))
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}
