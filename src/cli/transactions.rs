use std::collections::HashMap;

use comfy_table::Table;

use crate::cli::{open_store, parse_cli_date};
use crate::error::{Result, TallyError};
use crate::fmt::money;
use crate::models::TransactionStatus;
use crate::settings::Settings;
use crate::store::TransactionFilter;

#[allow(clippy::too_many_arguments)]
pub fn list(
    settings: &Settings,
    status: Option<&str>,
    text: Option<&str>,
    min: Option<&str>,
    max: Option<&str>,
    from_date: Option<&str>,
    to_date: Option<&str>,
) -> Result<()> {
    let status = status
        .map(|s| {
            TransactionStatus::parse(s)
                .ok_or_else(|| TallyError::Other(format!("unknown status: {s}")))
        })
        .transpose()?;
    let parse_amount = |raw: &str| {
        raw.parse()
            .map_err(|_| TallyError::Other(format!("invalid amount: {raw}")))
    };
    let filter = TransactionFilter {
        status,
        text: text.map(|s| s.to_string()),
        min_amount: min.map(parse_amount).transpose()?,
        max_amount: max.map(parse_amount).transpose()?,
        start_date: from_date.map(parse_cli_date).transpose()?,
        end_date: to_date.map(parse_cli_date).transpose()?,
    };

    let store = open_store(settings)?;
    let transactions = store.search(&filter)?;
    if transactions.is_empty() {
        println!("No matching transactions.");
        return Ok(());
    }

    let category_names: HashMap<i64, String> = store
        .all_categories()?
        .into_iter()
        .filter_map(|c| c.id.map(|id| (id, c.name)))
        .collect();

    let mut table = Table::new();
    table.set_header(vec![
        "Date",
        "Description",
        "Vendor",
        "Amount",
        "Status",
        "Category",
    ]);
    for txn in &transactions {
        let category = txn
            .assigned_category_id
            .and_then(|id| category_names.get(&id).cloned())
            .unwrap_or_default();
        table.add_row(vec![
            txn.date.format("%Y-%m-%d").to_string(),
            txn.description.clone(),
            txn.vendor_name.clone().unwrap_or_default(),
            money(txn.amount),
            txn.status.as_str().to_string(),
            category,
        ]);
    }
    println!("{table}");
    println!("{} transactions", transactions.len());
    Ok(())
}
