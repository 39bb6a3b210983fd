//! CLI command definitions and argument parsing

use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

#[derive(Parser)]
#[command(name = "foliochat")]
#[command(about = "Chat with the portfolio assistant from the terminal")]
#[command(version)]
pub struct Cli {
    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (defaults to config.toml, then config.example.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ask a single question and stream the answer
    Ask {
        /// The question to ask
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
    /// Start an interactive chat session
    Chat,
    /// Show the persisted session identifier, creating it if needed
    Session,
    /// Show current configuration
    Config,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ask_joins_words() {
        let cli = Cli::parse_from(["foliochat", "ask", "who", "are", "you"]);
        match cli.command {
            Commands::Ask { question } => assert_eq!(question.join(" "), "who are you"),
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["foliochat", "-v", "chat", "--config", "custom.toml"]);
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        assert!(matches!(cli.command, Commands::Chat));
    }

    #[test]
    fn test_verbose_after_subcommand() {
        let cli = Cli::parse_from(["foliochat", "chat", "-v"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Chat));
    }

    #[test]
    fn test_ask_requires_question() {
        assert!(Cli::try_parse_from(["foliochat", "ask"]).is_err());
    }
}
