use chrono::Utc;
use colored::Colorize;
use comfy_table::{Cell, Table};
use dialoguer::{Confirm, Input};

use crate::cli::open_store;
use crate::error::Result;
use crate::fmt::money;
use crate::models::{PatternKind, Rule, TransactionStatus, VendorMapping};
use crate::rules::RulesEngine;
use crate::settings::Settings;

pub fn run(settings: &Settings) -> Result<()> {
    let store = open_store(settings)?;
    let pending = store.pending_transactions()?;

    if pending.is_empty() {
        println!("{}", "No pending transactions to review.".green());
        return Ok(());
    }

    let categories = store.visible_categories()?;
    if categories.is_empty() {
        println!("{}", "No categories cached yet. Run `tally sync` first.".yellow());
        return Ok(());
    }
    let engine = RulesEngine::new(store.active_rules()?);

    println!("\n{} transactions to review\n", pending.len());
    let mut cat_table = Table::new();
    cat_table.set_header(vec!["#", "Name", "Type"]);
    for (i, cat) in categories.iter().enumerate() {
        cat_table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&cat.full_name),
            Cell::new(&cat.account_type),
        ]);
    }
    println!("Categories\n{cat_table}\n");

    for txn in &pending {
        let Some(txn_id) = txn.id else { continue };
        println!("{}", "\u{2500}".repeat(60));
        println!("  Date:        {}", txn.date.format("%Y-%m-%d"));
        println!("  Description: {}", txn.description);
        let amt_str = if txn.amount.is_sign_negative() {
            money(txn.amount).red().to_string()
        } else {
            money(txn.amount).green().to_string()
        };
        println!("  Amount:      {amt_str}");
        println!("  Account:     {}", txn.account_name);
        if let Some(vendor) = &txn.vendor_name {
            println!("  Vendor:      {vendor}");
        }

        // Rule suggestions, strongest first.
        let suggestions = engine.find_all_matches(
            &txn.description,
            txn.vendor_name.as_deref(),
            txn.amount,
        );
        if !suggestions.is_empty() {
            println!("  Suggestions:");
            for m in suggestions.iter().take(3) {
                let number = categories
                    .iter()
                    .position(|c| c.id == Some(m.category_id))
                    .map(|i| format!("#{}", i + 1))
                    .unwrap_or_default();
                let name = store
                    .category_by_id(m.category_id)?
                    .map(|c| c.full_name)
                    .unwrap_or_else(|| format!("category {}", m.category_id));
                println!("    {number} {name} (rule: {})", m.rule.name);
            }
        }
        let vendor_default = match &txn.vendor_name {
            Some(vendor) => store.vendor_mapping_by_name(vendor)?,
            None => None,
        };
        if let Some(mapping) = &vendor_default {
            if let Some(cat) = store.category_by_id(mapping.default_category_id)? {
                let number = categories
                    .iter()
                    .position(|c| c.id == cat.id)
                    .map(|i| format!("#{}", i + 1))
                    .unwrap_or_default();
                println!("  Vendor default: {number} {}", cat.full_name);
            }
        }
        println!();

        let choice: String = Input::new()
            .with_prompt("Category # (or s=skip, q=quit)")
            .interact_text()
            .unwrap_or_else(|_| "q".to_string());

        if choice.eq_ignore_ascii_case("q") {
            println!("{}", "Review paused.".yellow());
            return Ok(());
        }
        if choice.eq_ignore_ascii_case("s") {
            continue;
        }

        let idx = match choice.parse::<usize>() {
            Ok(n) if n >= 1 && n <= categories.len() => n - 1,
            _ => {
                println!("{}", "Invalid choice, skipping.".red());
                continue;
            }
        };
        let cat = &categories[idx];
        let Some(cat_id) = cat.id else { continue };

        store.update_status(txn_id, TransactionStatus::Categorized, Some(cat_id))?;
        println!("{}", format!("\u{2192} Categorized as {}", cat.full_name).green());

        if let Some(vendor) = &txn.vendor_name {
            let already_default =
                vendor_default.as_ref().map(|m| m.default_category_id) == Some(cat_id);
            if !already_default {
                let remember = Confirm::new()
                    .with_prompt(format!("Remember {} as the default for {vendor}?", cat.name))
                    .default(false)
                    .interact()
                    .unwrap_or(false);
                if remember {
                    store.save_vendor_mapping(&VendorMapping {
                        id: None,
                        vendor_name: vendor.clone(),
                        vendor_remote_id: vendor_default
                            .as_ref()
                            .and_then(|m| m.vendor_remote_id.clone()),
                        default_category_id: cat_id,
                        created_at: Utc::now(),
                        updated_at: Utc::now(),
                    })?;
                }
            }
        }

        let create_rule = Confirm::new()
            .with_prompt("Create rule for future matches?")
            .default(false)
            .interact()
            .unwrap_or(false);
        if create_rule {
            let words: Vec<&str> = txn.description.split_whitespace().collect();
            let suggested = if words.len() >= 2 {
                format!("{} {}", words[0], words[1])
            } else {
                words.first().unwrap_or(&"").to_string()
            };
            let pattern: String = Input::new()
                .with_prompt("Rule pattern")
                .default(suggested)
                .interact_text()
                .unwrap_or_default();
            if !pattern.is_empty() {
                store.save_rule(&Rule::for_category(
                    &pattern,
                    &pattern,
                    PatternKind::Contains,
                    cat_id,
                    0,
                ))?;
                println!("{}", "Rule saved.".green());
            }
        }
        println!();
    }

    println!("{}", "Review complete. Run `tally post` to push changes.".green());
    Ok(())
}
