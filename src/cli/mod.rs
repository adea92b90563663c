pub mod auth;
pub mod categories;
pub mod categorize;
pub mod post;
pub mod purge;
pub mod review;
pub mod rules;
pub mod status;
pub mod sync;
pub mod transactions;

use std::path::Path;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::auth::{StoredTokens, TokenSource};
use crate::error::{Result, TallyError};
use crate::remote::QboHttpClient;
use crate::settings::Settings;
use crate::store::Store;

#[derive(Parser)]
#[command(name = "tally", about = "Review and categorize bookkeeping-service transactions.")]
pub struct Cli {
    /// Config file (default: ./tally.toml, then ~/.config/tally/config.toml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Pull categories and transactions from the remote service.
    Sync {
        /// Start date: YYYY-MM-DD
        #[arg(long = "from")]
        from_date: Option<String>,
        /// End date: YYYY-MM-DD
        #[arg(long = "to")]
        to_date: Option<String>,
    },
    /// Run categorization rules over pending transactions.
    Categorize,
    /// Interactively review pending transactions.
    Review,
    /// Post categorized transactions back to the remote service.
    Post,
    /// List cached transactions.
    Transactions {
        /// Filter by status: pending, categorized, posted
        #[arg(long)]
        status: Option<String>,
        /// Free-text filter over description and vendor
        #[arg(long)]
        text: Option<String>,
        /// Minimum signed amount
        #[arg(long)]
        min: Option<String>,
        /// Maximum signed amount
        #[arg(long)]
        max: Option<String>,
        /// Start date: YYYY-MM-DD
        #[arg(long = "from")]
        from_date: Option<String>,
        /// End date: YYYY-MM-DD
        #[arg(long = "to")]
        to_date: Option<String>,
    },
    /// Manage categories.
    Categories {
        #[command(subcommand)]
        command: CategoriesCommands,
    },
    /// Manage categorization rules.
    Rules {
        #[command(subcommand)]
        command: RulesCommands,
    },
    /// Manage stored API tokens.
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
    /// Delete already-posted transactions from the local cache.
    PurgePosted {
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
    /// Show transaction counts by review status.
    Status,
}

#[derive(Subcommand)]
pub enum CategoriesCommands {
    /// List categories.
    List {
        /// Include hidden categories.
        #[arg(long)]
        all: bool,
    },
    /// Hide a category from pickers.
    Hide { id: i64 },
    /// Make a hidden category visible again.
    Show { id: i64 },
    /// Create a new category on the remote service and cache it locally.
    Create {
        /// Category name
        name: String,
        /// Remote account type
        #[arg(long = "type", default_value = "Expense")]
        account_type: String,
        /// Parent category's remote id (makes this a subcategory)
        #[arg(long)]
        parent: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum RulesCommands {
    /// Add a categorization rule.
    Add {
        /// Pattern to match against description and vendor
        pattern: String,
        /// Category name to assign
        #[arg(long)]
        category: String,
        /// Rule label (defaults to the pattern)
        #[arg(long)]
        name: Option<String>,
        /// Pattern kind: contains, exact, regex
        #[arg(long, default_value = "contains")]
        kind: String,
        /// Rule priority (higher wins)
        #[arg(long, default_value = "0")]
        priority: i64,
        /// Inclusive minimum |amount|
        #[arg(long)]
        min: Option<String>,
        /// Inclusive maximum |amount|
        #[arg(long)]
        max: Option<String>,
    },
    /// List all categorization rules.
    List,
    /// Delete a rule.
    Delete { id: i64 },
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Store an access token obtained from the remote service.
    SetToken {
        /// Company/realm identifier
        #[arg(long)]
        realm: String,
        /// Bearer access token
        #[arg(long = "access-token")]
        access_token: String,
        /// Refresh token
        #[arg(long = "refresh-token")]
        refresh_token: String,
        /// Seconds until the access token expires
        #[arg(long = "expires-in", default_value = "3600")]
        expires_in: i64,
    },
    /// Show the stored token and its expiry.
    Status,
}

pub(crate) fn open_store(settings: &Settings) -> Result<Store> {
    Store::open(Path::new(&settings.database.path))
}

pub(crate) fn build_client(settings: &Settings, store: &Store) -> Result<QboHttpClient> {
    let creds = StoredTokens::new(store).credentials()?;
    QboHttpClient::new(
        &settings.remote.environment,
        creds.realm_id,
        creds.access_token,
    )
}

pub(crate) fn parse_cli_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| TallyError::Other(format!("invalid date (expected YYYY-MM-DD): {raw}")))
}
