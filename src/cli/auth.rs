use chrono::Utc;
use colored::Colorize;

use crate::cli::open_store;
use crate::error::Result;
use crate::models::Token;
use crate::settings::Settings;

pub fn set_token(
    settings: &Settings,
    realm: &str,
    access_token: &str,
    refresh_token: &str,
    expires_in: i64,
) -> Result<()> {
    let store = open_store(settings)?;
    let now = Utc::now();
    let token = Token {
        id: None,
        realm_id: realm.to_string(),
        access_token: access_token.to_string(),
        refresh_token: refresh_token.to_string(),
        expires_at: now + chrono::Duration::seconds(expires_in),
        created_at: now,
        updated_at: now,
    };
    let saved = store.save_token(&token)?;
    println!(
        "{}",
        format!(
            "Stored token for realm {} (expires {}).",
            saved.realm_id,
            saved.expires_at.format("%Y-%m-%d %H:%M UTC")
        )
        .green()
    );
    Ok(())
}

pub fn status(settings: &Settings) -> Result<()> {
    println!("Environment: {}", settings.remote.environment);
    println!(
        "Client credentials: {}",
        if settings.remote.client_id.is_empty() {
            "not configured".to_string()
        } else {
            "configured".to_string()
        }
    );

    let store = open_store(settings)?;
    match store.latest_token()? {
        Some(token) => {
            let state = if token.is_expired(Utc::now()) {
                "expired".red().to_string()
            } else {
                "valid".green().to_string()
            };
            println!(
                "Token: realm {}, expires {} ({state})",
                token.realm_id,
                token.expires_at.format("%Y-%m-%d %H:%M UTC")
            );
        }
        None => println!("Token: {}", "none stored".yellow()),
    }
    Ok(())
}
