use clap::Parser;
use foliochat::cli::{
    handle_ask_command, handle_chat_command, handle_config_command, handle_session_command, Cli,
    Commands,
};
use foliochat::config::AppConfig;
use foliochat::Result;
use tracing::debug;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::load()?,
    };

    // Initialize logging
    if cli.verbose {
        foliochat::logging::init_logging_with_level("debug", config.logging.file_dir.as_deref())?;
    } else {
        foliochat::logging::init_logging_with_config(Some(&config.logging))?;
    }
    debug!("Configuration loaded successfully");

    // Execute the requested command
    match cli.command {
        Commands::Ask { question } => {
            handle_ask_command(&config, &question.join(" ")).await?;
        }
        Commands::Chat => {
            handle_chat_command(&config).await?;
        }
        Commands::Session => {
            handle_session_command(&config)?;
        }
        Commands::Config => {
            handle_config_command(&config)?;
        }
    }

    Ok(())
}
