use colored::Colorize;

use crate::cli::{build_client, open_store, parse_cli_date};
use crate::error::Result;
use crate::remote::DateRange;
use crate::settings::Settings;
use crate::sync::{sync_categories, sync_transactions};

pub fn run(settings: &Settings, from_date: Option<&str>, to_date: Option<&str>) -> Result<()> {
    let range = DateRange {
        start: from_date.map(parse_cli_date).transpose()?,
        end: to_date.map(parse_cli_date).transpose()?,
    };

    let store = open_store(settings)?;
    let client = build_client(settings, &store)?;

    let categories = sync_categories(&client, &store)?;
    let transactions = sync_transactions(&client, &store, &range)?;

    println!(
        "{}",
        format!(
            "Synced {} categories and {} transactions.",
            categories.len(),
            transactions.len()
        )
        .green()
    );
    let pending = store.pending_transactions()?.len();
    if pending > 0 {
        println!("{pending} pending transactions to review.");
    }
    Ok(())
}
