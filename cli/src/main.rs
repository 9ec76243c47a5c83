mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use crate::commands::{
    cmd_plan_add, cmd_plan_create, cmd_plan_delete, cmd_plan_list, cmd_plan_share,
    cmd_plan_show, cmd_recipe_add, cmd_recipe_delete, cmd_recipe_import, cmd_recipe_list,
    cmd_recipe_rate, cmd_recipe_show, cmd_shop, cmd_user_add, cmd_user_list,
};
use crate::config::Config;
use mealprep_core::service::MealPrepService;

#[derive(Parser)]
#[command(
    name = "mealprep",
    version,
    about = "Plan meals and build shopping lists"
)]
struct Cli {
    /// Path to the data file (default: platform data directory)
    #[arg(long, global = true, value_name = "PATH")]
    data: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage users
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
    /// Manage recipes
    Recipe {
        #[command(subcommand)]
        command: RecipeCommands,
    },
    /// Manage meal plans
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },
    /// Build the shopping list for a meal plan
    Shop {
        /// Owner of the meal plan
        user_id: String,
        /// Meal plan ID
        plan_id: String,
        /// basic, vegan or glutenFree (unknown values fall back to basic)
        #[arg(short, long, default_value = "basic")]
        strategy: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// Register a user
    Add {
        /// Display name
        name: String,
        /// Email address (must be unique)
        email: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List users
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum RecipeCommands {
    /// Create a recipe
    Add {
        /// Recipe title
        title: String,
        /// Ingredient as "<amount> [unit] <name>" (e.g. "200 g Broccoli", "2 Eggs"); repeatable
        #[arg(short, long = "ingredient")]
        ingredients: Vec<String>,
        /// Preparation step; repeatable, kept in order
        #[arg(long = "step")]
        steps: Vec<String>,
        /// Tag; repeatable
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Dietary flag (informational); repeatable
        #[arg(long = "flag")]
        flags: Vec<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List recipes
    List {
        /// Only show recipes with this tag
        #[arg(short, long)]
        tag: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a recipe with its ingredients and steps
    Show {
        /// Recipe ID
        recipe_id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Rate a recipe from 1 to 5
    Rate {
        /// Recipe ID
        recipe_id: String,
        /// Rating, 1-5
        #[arg(allow_negative_numbers = true)]
        value: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a recipe (plans that use it keep their entries)
    Delete {
        /// Recipe ID
        recipe_id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Import a recipe from a Cooklang (.cook) file
    Import {
        /// Path to the .cook file
        file: PathBuf,
        /// Title override (defaults to metadata title or filename)
        #[arg(long)]
        title: Option<String>,
        /// Tag; repeatable
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum PlanCommands {
    /// Create a meal plan owned by a user
    Create {
        /// Owner user ID
        user_id: String,
        /// Plan name
        name: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List a user's meal plans
    List {
        /// Owner user ID
        user_id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a meal plan's entries
    Show {
        /// Owner user ID
        user_id: String,
        /// Meal plan ID
        plan_id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Schedule a recipe on a day
    Add {
        /// Owner user ID
        user_id: String,
        /// Meal plan ID
        plan_id: String,
        /// Day label (e.g. Monday)
        day: String,
        /// Recipe ID
        recipe_id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Record that another user can see a plan
    Share {
        /// Owner user ID
        user_id: String,
        /// Meal plan ID
        plan_id: String,
        /// User to share with
        with_user_id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a meal plan
    Delete {
        /// Owner user ID
        user_id: String,
        /// Meal plan ID
        plan_id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.data)?;
    let path = config.data_path.as_path();
    let mut svc = MealPrepService::open(path)?;

    match cli.command {
        Commands::Shop {
            user_id,
            plan_id,
            strategy,
            json,
        } => cmd_shop(&svc, &user_id, &plan_id, &strategy, json),
        Commands::User { command } => match command {
            UserCommands::Add { name, email, json } => {
                cmd_user_add(&mut svc, path, &name, &email, json)
            }
            UserCommands::List { json } => cmd_user_list(&svc, json),
        },
        Commands::Recipe { command } => match command {
            RecipeCommands::Add {
                title,
                ingredients,
                steps,
                tags,
                flags,
                json,
            } => cmd_recipe_add(
                &mut svc,
                path,
                &title,
                &ingredients,
                steps,
                tags,
                flags,
                json,
            ),
            RecipeCommands::List { tag, json } => cmd_recipe_list(&svc, tag.as_deref(), json),
            RecipeCommands::Show { recipe_id, json } => cmd_recipe_show(&svc, &recipe_id, json),
            RecipeCommands::Rate {
                recipe_id,
                value,
                json,
            } => cmd_recipe_rate(&mut svc, path, &recipe_id, value, json),
            RecipeCommands::Delete { recipe_id, json } => {
                cmd_recipe_delete(&mut svc, path, &recipe_id, json)
            }
            RecipeCommands::Import {
                file,
                title,
                tags,
                json,
            } => cmd_recipe_import(&mut svc, path, &file, title, tags, json),
        },
        Commands::Plan { command } => match command {
            PlanCommands::Create {
                user_id,
                name,
                json,
            } => cmd_plan_create(&mut svc, path, &user_id, &name, json),
            PlanCommands::List { user_id, json } => cmd_plan_list(&svc, &user_id, json),
            PlanCommands::Show {
                user_id,
                plan_id,
                json,
            } => cmd_plan_show(&svc, &user_id, &plan_id, json),
            PlanCommands::Add {
                user_id,
                plan_id,
                day,
                recipe_id,
                json,
            } => cmd_plan_add(&mut svc, path, &user_id, &plan_id, &day, &recipe_id, json),
            PlanCommands::Share {
                user_id,
                plan_id,
                with_user_id,
                json,
            } => cmd_plan_share(&mut svc, path, &user_id, &plan_id, &with_user_id, json),
            PlanCommands::Delete {
                user_id,
                plan_id,
                json,
            } => cmd_plan_delete(&mut svc, path, &user_id, &plan_id, json),
        },
    }
}
