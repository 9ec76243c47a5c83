use anyhow::Result;
use std::path::Path;
use std::process;
use tabled::{Table, Tabled, settings::Style};

use mealprep_core::service::MealPrepService;

use super::helpers::{print_json, truncate};

pub(crate) fn cmd_user_add(
    svc: &mut MealPrepService,
    path: &Path,
    name: &str,
    email: &str,
    json: bool,
) -> Result<()> {
    let user = svc.register_user(name, email)?;
    svc.save(path)?;
    if json {
        print_json(&user)?;
    } else {
        let id = &user.id;
        println!("Registered {name} <{}> (id: {id})", user.email);
    }
    Ok(())
}

pub(crate) fn cmd_user_list(svc: &MealPrepService, json: bool) -> Result<()> {
    #[derive(Tabled)]
    struct UserRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Email")]
        email: String,
    }

    let users = svc.list_users();
    if users.is_empty() {
        if json {
            println!("[]");
        } else {
            eprintln!("No users found");
        }
        process::exit(2);
    }

    if json {
        return print_json(&users);
    }

    let rows: Vec<UserRow> = users
        .iter()
        .map(|u| UserRow {
            id: u.id.clone(),
            name: truncate(&u.name, 30),
            email: u.email.clone(),
        })
        .collect();
    let table = Table::new(&rows).with(Style::rounded()).to_string();
    println!("{table}");
    Ok(())
}
