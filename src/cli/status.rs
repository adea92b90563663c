use comfy_table::Table;

use crate::cli::open_store;
use crate::error::Result;
use crate::models::TransactionStatus;
use crate::settings::Settings;

pub fn run(settings: &Settings) -> Result<()> {
    let store = open_store(settings)?;

    let mut table = Table::new();
    table.set_header(vec!["Status", "Count"]);
    for status in [
        TransactionStatus::Pending,
        TransactionStatus::Categorized,
        TransactionStatus::Posted,
    ] {
        let count = store.transactions_by_status(status)?.len();
        table.add_row(vec![status.as_str().to_string(), count.to_string()]);
    }
    println!("{table}");
    println!("Database: {}", settings.database.path);
    Ok(())
}
