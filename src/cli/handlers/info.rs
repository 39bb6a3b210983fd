//! Session and configuration display handlers

use crate::cli::output::*;
use crate::session::FileKeyValueStore;
use crate::session::SessionIdentity;
use crate::AppConfig;
use crate::Result;

/// Print the persisted session identifier, creating it on first use
pub fn handle_session_command(config: &AppConfig) -> Result<()> {
    let store = FileKeyValueStore::new(config.session_store_path());
    let location = store.path().display().to_string();
    let identity = SessionIdentity::new(store, config.storage_key());
    let user_id = identity.user_id()?;

    println!("🪪 Session:");
    println!("  ID: {user_id}");
    println!("  Stored in: {location} (key: {})", config.storage_key());
    Ok(())
}

pub fn handle_config_command(config: &AppConfig) -> Result<()> {
    println!("📋 foliochat Configuration:");
    println!();

    println!("🤖 Agent:");
    println!("  Endpoint: {}", config.agent_endpoint());
    println!("  Bot ID: {}", config.bot_id());
    println!(
        "  API token: {}",
        config.api_token().map_or_else(|| "(not set)".to_string(), mask_secret)
    );
    match config.request_timeout() {
        Some(timeout) => println!("  Request timeout: {}s", timeout.as_secs()),
        None => println!("  Request timeout: none"),
    }
    println!();

    println!("🪪 Session:");
    println!("  Store: {}", config.session_store_path().display());
    println!("  Key: {}", config.storage_key());
    println!();

    println!("📝 Logging:");
    println!("  Level: {}", config.logging.level);
    println!(
        "  File dir: {}",
        config.logging.file_dir.as_deref().unwrap_or("(console only)")
    );
    println!();

    println!("💬 Assistant:");
    println!(
        "  Suggested questions: {}",
        config.assistant.suggested_questions.len()
    );
    println!("  Fact sheet entries: {}", config.assistant.fact_sheet.len());

    Ok(())
}
