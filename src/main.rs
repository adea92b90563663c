use std::path::Path;

use clap::Parser;

use tally::cli::{self, AuthCommands, CategoriesCommands, Cli, Commands, RulesCommands};
use tally::{error, settings};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> error::Result<()> {
    let settings = settings::load_settings(cli.config.as_deref().map(Path::new))?;

    match cli.command {
        Commands::Sync { from_date, to_date } => {
            cli::sync::run(&settings, from_date.as_deref(), to_date.as_deref())
        }
        Commands::Categorize => cli::categorize::run(&settings),
        Commands::Review => cli::review::run(&settings),
        Commands::Post => cli::post::run(&settings),
        Commands::Transactions {
            status,
            text,
            min,
            max,
            from_date,
            to_date,
        } => cli::transactions::list(
            &settings,
            status.as_deref(),
            text.as_deref(),
            min.as_deref(),
            max.as_deref(),
            from_date.as_deref(),
            to_date.as_deref(),
        ),
        Commands::Categories { command } => match command {
            CategoriesCommands::List { all } => cli::categories::list(&settings, all),
            CategoriesCommands::Hide { id } => cli::categories::set_visibility(&settings, id, false),
            CategoriesCommands::Show { id } => cli::categories::set_visibility(&settings, id, true),
            CategoriesCommands::Create {
                name,
                account_type,
                parent,
            } => cli::categories::create(&settings, &name, &account_type, parent.as_deref()),
        },
        Commands::Rules { command } => match command {
            RulesCommands::Add {
                pattern,
                category,
                name,
                kind,
                priority,
                min,
                max,
            } => cli::rules::add(
                &settings,
                &pattern,
                &category,
                name.as_deref(),
                &kind,
                priority,
                min.as_deref(),
                max.as_deref(),
            ),
            RulesCommands::List => cli::rules::list(&settings),
            RulesCommands::Delete { id } => cli::rules::delete(&settings, id),
        },
        Commands::Auth { command } => match command {
            AuthCommands::SetToken {
                realm,
                access_token,
                refresh_token,
                expires_in,
            } => cli::auth::set_token(&settings, &realm, &access_token, &refresh_token, expires_in),
            AuthCommands::Status => cli::auth::status(&settings),
        },
        Commands::PurgePosted { yes } => cli::purge::run(&settings, yes),
        Commands::Status => cli::status::run(&settings),
    }
}
