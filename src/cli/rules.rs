use colored::Colorize;
use comfy_table::Table;

use crate::cli::open_store;
use crate::error::{Result, TallyError};
use crate::models::{PatternKind, Rule};
use crate::settings::Settings;
use crate::store::Store;

fn resolve_category(store: &Store, name: &str) -> Result<i64> {
    let categories = store.all_categories()?;
    categories
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(name) || c.full_name.eq_ignore_ascii_case(name))
        .and_then(|c| c.id)
        .ok_or_else(|| TallyError::UnknownCategory(name.to_string()))
}

#[allow(clippy::too_many_arguments)]
pub fn add(
    settings: &Settings,
    pattern: &str,
    category: &str,
    name: Option<&str>,
    kind: &str,
    priority: i64,
    min: Option<&str>,
    max: Option<&str>,
) -> Result<()> {
    let kind = PatternKind::parse(kind)
        .ok_or_else(|| TallyError::Other(format!("unknown pattern kind: {kind}")))?;
    let parse_amount = |raw: &str| {
        raw.parse()
            .map_err(|_| TallyError::Other(format!("invalid amount: {raw}")))
    };

    let store = open_store(settings)?;
    let category_id = resolve_category(&store, category)?;

    let mut rule = Rule::for_category(
        name.unwrap_or(pattern),
        pattern,
        kind,
        category_id,
        priority,
    );
    rule.min_amount = min.map(parse_amount).transpose()?;
    rule.max_amount = max.map(parse_amount).transpose()?;
    let saved = store.save_rule(&rule)?;
    println!(
        "{}",
        format!("Added rule #{} \u{2192} {category}.", saved.id.unwrap_or_default()).green()
    );
    Ok(())
}

pub fn list(settings: &Settings) -> Result<()> {
    let store = open_store(settings)?;
    let rules = store.all_rules()?;
    if rules.is_empty() {
        println!("No rules defined.");
        return Ok(());
    }

    let category_name = |id: i64| -> Result<String> {
        Ok(store
            .category_by_id(id)?
            .map(|c| c.name)
            .unwrap_or_else(|| format!("#{id}")))
    };

    let mut table = Table::new();
    table.set_header(vec![
        "ID", "Name", "Pattern", "Kind", "Category", "Bounds", "Priority", "Active",
    ]);
    for rule in &rules {
        let bounds = match (rule.min_amount, rule.max_amount) {
            (None, None) => String::new(),
            (min, max) => format!(
                "{}..{}",
                min.map(|d| d.to_string()).unwrap_or_default(),
                max.map(|d| d.to_string()).unwrap_or_default()
            ),
        };
        table.add_row(vec![
            rule.id.map(|id| id.to_string()).unwrap_or_default(),
            rule.name.clone(),
            rule.pattern.clone(),
            rule.kind.as_str().to_string(),
            category_name(rule.category_id)?,
            bounds,
            rule.priority.to_string(),
            if rule.is_active { "yes" } else { "no" }.to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn delete(settings: &Settings, id: i64) -> Result<()> {
    let store = open_store(settings)?;
    match store.rule_by_id(id)? {
        Some(rule) => {
            store.delete_rule(id)?;
            println!("{}", format!("Deleted rule {} ({}).", id, rule.name).green());
        }
        None => println!("{}", format!("No rule with id {id}.").yellow()),
    }
    Ok(())
}
