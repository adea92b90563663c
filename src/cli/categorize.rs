use colored::Colorize;

use crate::cli::open_store;
use crate::error::Result;
use crate::settings::Settings;
use crate::sync::apply_rules;

pub fn run(settings: &Settings) -> Result<()> {
    let store = open_store(settings)?;
    let summary = apply_rules(&store)?;
    println!(
        "{} categorized, {} left pending",
        summary.categorized.to_string().green(),
        summary.unmatched
    );
    Ok(())
}
