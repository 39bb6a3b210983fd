//! Ask and chat command handlers

use std::io;

use crate::agent::ExchangeOutcome;
use crate::agent::RejectReason;
use crate::agent::StreamingClient;
use crate::cli::output::*;
use crate::AppConfig;
use crate::Result;

/// Ask a single question and stream the answer to stdout
pub async fn handle_ask_command(config: &AppConfig, question: &str) -> Result<()> {
    let client = StreamingClient::from_config(config)?;
    let mut printer = AnswerPrinter::new();

    let outcome = client
        .submit_with(question, |event| printer.handle(event))
        .await;
    printer.finish();

    if outcome == ExchangeOutcome::Rejected(RejectReason::EmptyInput) {
        print_warning("Nothing to ask: the question is empty");
    }
    Ok(())
}

/// Interactive chat loop
pub async fn handle_chat_command(config: &AppConfig) -> Result<()> {
    let client = StreamingClient::from_config(config)?;

    println!("╔════════════════════════════════════════════════════════════════╗");
    println!("║  💬 Interactive Chat Mode                                      ║");
    println!("║  Commands: /1../N pick a suggestion, /quit or Ctrl+D to leave  ║");
    println!("╚════════════════════════════════════════════════════════════════╝");
    println!();

    if let Some(greeting) = client.store().last() {
        println!("🤖 {}", greeting.content);
        println!();
    }

    loop {
        let suggestions = &client.texts().suggested_questions;
        if client.store().only_greeting() && !suggestions.is_empty() {
            print_info("💡 Try one of these:");
            for (idx, question) in suggestions.iter().enumerate() {
                println!("  /{}  {}", idx + 1, question);
            }
            println!();
        }

        print_prompt("You: ");
        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            println!();
            break;
        }

        let question = match resolve_input(input.trim(), suggestions) {
            ChatInput::Quit => break,
            ChatInput::Unknown(command) => {
                print_warning(&format!("Unknown command: {command}"));
                continue;
            }
            ChatInput::Question(question) => question,
        };
        if question.is_empty() {
            continue;
        }

        let mut printer = AnswerPrinter::new();
        client
            .submit_with(&question, |event| printer.handle(event))
            .await;
        printer.finish();
        println!();
    }

    print_success("👋 Conversation ended. Goodbye!");
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum ChatInput {
    Question(String),
    Quit,
    Unknown(String),
}

fn resolve_input(input: &str, suggestions: &[String]) -> ChatInput {
    if input.eq_ignore_ascii_case("/quit") || input.eq_ignore_ascii_case("/exit") {
        return ChatInput::Quit;
    }
    let Some(command) = input.strip_prefix('/') else {
        return ChatInput::Question(input.to_string());
    };

    command
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|idx| suggestions.get(idx))
        .map_or_else(
            || ChatInput::Unknown(input.to_string()),
            |question| ChatInput::Question(question.clone()),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suggestions() -> Vec<String> {
        vec!["first?".to_string(), "second?".to_string()]
    }

    #[test]
    fn test_plain_text_is_a_question() {
        assert_eq!(
            resolve_input("hello", &suggestions()),
            ChatInput::Question("hello".to_string())
        );
    }

    #[test]
    fn test_suggestion_shortcut() {
        assert_eq!(
            resolve_input("/2", &suggestions()),
            ChatInput::Question("second?".to_string())
        );
        assert_eq!(
            resolve_input("/3", &suggestions()),
            ChatInput::Unknown("/3".to_string())
        );
        assert_eq!(
            resolve_input("/0", &suggestions()),
            ChatInput::Unknown("/0".to_string())
        );
    }

    #[test]
    fn test_quit_commands() {
        assert_eq!(resolve_input("/quit", &[]), ChatInput::Quit);
        assert_eq!(resolve_input("/EXIT", &[]), ChatInput::Quit);
    }
}
