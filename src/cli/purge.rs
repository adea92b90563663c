use colored::Colorize;
use dialoguer::Confirm;

use crate::cli::open_store;
use crate::error::Result;
use crate::models::TransactionStatus;
use crate::settings::Settings;

pub fn run(settings: &Settings, yes: bool) -> Result<()> {
    let store = open_store(settings)?;
    let posted = store.transactions_by_status(TransactionStatus::Posted)?;
    if posted.is_empty() {
        println!("Nothing to purge.");
        return Ok(());
    }

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete {} posted transactions from the local cache?",
                posted.len()
            ))
            .default(false)
            .interact()
            .unwrap_or(false);
        if !confirmed {
            println!("{}", "Aborted.".yellow());
            return Ok(());
        }
    }

    let purged = store.purge_posted()?;
    println!("{}", format!("Purged {purged} posted transactions.").green());
    Ok(())
}
