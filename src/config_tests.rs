//! Unit tests for configuration module
//!
//! These tests validate configuration parsing, defaults, and validation.

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::time::Duration;

    use crate::config::*;
    use crate::FolioChatError;

    const MINIMAL: &str = r#"
[agent]
bot_id = "7578106254300921875"
"#;

    // ====== Default Value Tests ======

    #[test]
    fn test_default_agent_endpoint() {
        let config = AppConfig::default();
        assert_eq!(
            config.agent_endpoint(),
            "https://api.coze.cn/open_api/v2/chat"
        );
        assert!(config.request_timeout().is_none());
    }

    #[test]
    fn test_default_storage_key() {
        assert_eq!(default_storage_key(), "agent_user_id");
        assert_eq!(AppConfig::default().storage_key(), "agent_user_id");
    }

    #[test]
    fn test_default_assistant_texts() {
        let assistant = AssistantConfig::default();
        assert!(!assistant.greeting.is_empty());
        assert_eq!(assistant.suggested_questions.len(), 4);
        assert_eq!(assistant.fact_sheet.len(), 4);
        assert!(assistant.error_intro.contains("{error}"));
    }

    // ====== Parsing Tests ======

    #[test]
    fn test_minimal_config_fills_defaults() {
        let config = AppConfig::from_toml_str(MINIMAL).unwrap();
        assert_eq!(config.bot_id(), "7578106254300921875");
        assert_eq!(config.logging.level, "warn");
        assert!(config.logging.file_dir.is_none());
        assert_eq!(config.assistant.apology, default_apology());
    }

    #[test]
    fn test_full_config() {
        let toml = r#"
[agent]
endpoint = "http://localhost:8080/chat"
bot_id = "bot-1"
api_token = "pat_test"
request_timeout_secs = 30

[session]
store_path = "/tmp/foliochat-state.json"
storage_key = "uid"

[logging]
level = "debug"
file_dir = "logs"

[assistant]
greeting = "hello"
suggested_questions = ["a?", "b?"]
apology = "nope"
error_intro = "broken: {error}"
fact_sheet = ["one"]
error_outro = "bye"
"#;
        let config = AppConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.agent_endpoint(), "http://localhost:8080/chat");
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.storage_key(), "uid");
        assert_eq!(
            config.session_store_path(),
            std::path::PathBuf::from("/tmp/foliochat-state.json")
        );
        assert_eq!(config.logging.file_dir.as_deref(), Some("logs"));
        assert_eq!(config.assistant.suggested_questions, vec!["a?", "b?"]);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MINIMAL.as_bytes()).unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.bot_id(), "7578106254300921875");
    }

    #[test]
    fn test_from_missing_file() {
        let result = AppConfig::from_file("/definitely/not/here/config.toml");
        assert!(matches!(result, Err(FolioChatError::Io(_))));
    }

    // ====== Validation Tests ======

    #[test]
    fn test_missing_bot_id_rejected() {
        let result = AppConfig::from_toml_str("[agent]\n");
        assert!(matches!(result, Err(FolioChatError::ConfigError(_))));
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        let toml = r#"
[agent]
endpoint = "not a url"
bot_id = "bot"
"#;
        let err = AppConfig::from_toml_str(toml).unwrap_err();
        assert!(err.to_string().contains("agent.endpoint"));
    }

    #[test]
    fn test_malformed_toml() {
        let result = AppConfig::from_toml_str("[agent");
        assert!(matches!(result, Err(FolioChatError::TomlParsing(_))));
    }

    // ====== Token Override Tests ======

    #[test]
    fn test_token_override_replaces_configured_token() {
        let mut config = AppConfig::default();
        config.agent.api_token = Some("from-file".to_string());

        config.override_api_token(Some("  from-env ".to_string()));
        assert_eq!(config.api_token(), Some("from-env"));
    }

    #[test]
    fn test_blank_token_override_is_ignored() {
        let mut config = AppConfig::default();
        config.agent.api_token = Some("from-file".to_string());

        config.override_api_token(Some("   ".to_string()));
        config.override_api_token(None);
        assert_eq!(config.api_token(), Some("from-file"));
    }

    // ====== Fallback Text Tests ======

    #[test]
    fn test_failure_message_layout() {
        let assistant = AssistantConfig {
            error_intro: "Oops: {error}.".to_string(),
            fact_sheet: vec!["first".to_string(), "second".to_string()],
            error_outro: "More below.".to_string(),
            ..AssistantConfig::default()
        };

        assert_eq!(
            assistant.failure_message("API request failed: 500"),
            "Oops: API request failed: 500.\n\n• first\n• second\n\nMore below."
        );
    }
}
