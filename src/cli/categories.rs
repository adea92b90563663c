use colored::Colorize;
use comfy_table::Table;

use crate::cli::{build_client, open_store};
use crate::error::Result;
use crate::remote::BooksClient;
use crate::settings::Settings;
use crate::sync::sync_categories;

pub fn list(settings: &Settings, all: bool) -> Result<()> {
    let store = open_store(settings)?;
    let categories = if all {
        store.all_categories()?
    } else {
        store.visible_categories()?
    };
    if categories.is_empty() {
        println!("No categories cached yet. Run `tally sync` first.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Type", "Visible"]);
    for cat in &categories {
        table.add_row(vec![
            cat.id.map(|id| id.to_string()).unwrap_or_default(),
            cat.full_name.clone(),
            cat.account_type.clone(),
            if cat.is_visible { "yes" } else { "no" }.to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn set_visibility(settings: &Settings, id: i64, visible: bool) -> Result<()> {
    let store = open_store(settings)?;
    match store.category_by_id(id)? {
        Some(cat) => {
            store.set_category_visibility(id, visible)?;
            let verb = if visible { "visible" } else { "hidden" };
            println!("{}", format!("{} is now {verb}.", cat.full_name).green());
        }
        None => println!("{}", format!("No category with id {id}.").yellow()),
    }
    Ok(())
}

/// Create the category remotely, then refresh the local cache so the new
/// category (and its assigned remote id) is immediately usable.
pub fn create(
    settings: &Settings,
    name: &str,
    account_type: &str,
    parent: Option<&str>,
) -> Result<()> {
    let store = open_store(settings)?;
    let client = build_client(settings, &store)?;

    let created = client.create_category(name, account_type, parent)?;
    sync_categories(&client, &store)?;
    println!(
        "{}",
        format!("Created {} (remote id {}).", created.full_name, created.id).green()
    );
    Ok(())
}
