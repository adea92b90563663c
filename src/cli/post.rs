use colored::Colorize;

use crate::cli::{build_client, open_store};
use crate::error::Result;
use crate::settings::Settings;
use crate::sync::post_categorized;

pub fn run(settings: &Settings) -> Result<()> {
    let store = open_store(settings)?;
    let client = build_client(settings, &store)?;

    let summary = post_categorized(&client, &store)?;
    println!(
        "{} posted, {} skipped, {} failed",
        summary.posted.len().to_string().green(),
        summary.skipped.len(),
        summary.failed.len()
    );
    for (txn, reason) in &summary.skipped {
        println!("  {} {}: {reason}", "skipped".yellow(), txn.description);
    }
    for (txn, err) in &summary.failed {
        println!("  {} {}: {err}", "failed".red(), txn.description);
    }
    Ok(())
}
