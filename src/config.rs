use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

/// Environment variable that supplies the agent API bearer token
pub const API_TOKEN_ENV: &str = "FOLIOCHAT_API_TOKEN";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "default_agent_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub bot_id: String,
    /// Bearer token; prefer `FOLIOCHAT_API_TOKEN` over writing it to disk
    #[serde(default)]
    pub api_token: Option<String>,
    /// Whole-request timeout. Unset means the stream may stay open indefinitely.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

pub(crate) fn default_agent_endpoint() -> String {
    "https://api.coze.cn/open_api/v2/chat".to_string()
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            endpoint: default_agent_endpoint(),
            bot_id: String::new(),
            api_token: None,
            request_timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Key-value file holding the session identifier
    #[serde(default)]
    pub store_path: Option<PathBuf>,
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
}

pub(crate) fn default_storage_key() -> String {
    "agent_user_id".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            store_path: None,
            storage_key: default_storage_key(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Directory for daily rolling log files; console only when unset
    #[serde(default)]
    pub file_dir: Option<String>,
}

pub(crate) fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_dir: None,
        }
    }
}

/// Canned texts the assistant falls back on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    #[serde(default = "default_greeting")]
    pub greeting: String,
    #[serde(default = "default_suggested_questions")]
    pub suggested_questions: Vec<String>,
    /// Sent when a stream completes without a single answer fragment
    #[serde(default = "default_apology")]
    pub apology: String,
    /// `{error}` is replaced with the failure description
    #[serde(default = "default_error_intro")]
    pub error_intro: String,
    #[serde(default = "default_fact_sheet")]
    pub fact_sheet: Vec<String>,
    #[serde(default = "default_error_outro")]
    pub error_outro: String,
}

pub(crate) fn default_greeting() -> String {
    "Hi! I'm Chen Xin's AI assistant. I can answer questions about Chen Xin's background, \
     AI product work, model evaluation, prompt engineering and portfolio projects. \
     What would you like to know?"
        .to_string()
}

pub(crate) fn default_suggested_questions() -> Vec<String> {
    vec![
        "Tell me about your AI product experience".to_string(),
        "What prompt engineering work have you done?".to_string(),
        "Which large models have you evaluated?".to_string(),
        "Talk me through the AIGC courseware project".to_string(),
    ]
}

pub(crate) fn default_apology() -> String {
    "Sorry, I can't answer that question right now.".to_string()
}

pub(crate) fn default_error_intro() -> String {
    "Sorry, I ran into a technical problem: {error}. Here is what I can tell you anyway:"
        .to_string()
}

pub(crate) fn default_fact_sheet() -> Vec<String> {
    vec![
        "Chen Xin is an AI product manager focused on LLM applications and agent product design"
            .to_string(),
        "Chen Xin delivered an AIGC courseware generation platform end to end".to_string(),
        "Fluent in prompt engineering, with 50+ prompt versions iterated".to_string(),
        "Hands-on evaluation of several mainstream models (GPT-4, Gemini, Qwen and others)"
            .to_string(),
    ]
}

pub(crate) fn default_error_outro() -> String {
    "Have a look at the detailed experience section to learn more!".to_string()
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            greeting: default_greeting(),
            suggested_questions: default_suggested_questions(),
            apology: default_apology(),
            error_intro: default_error_intro(),
            fact_sheet: default_fact_sheet(),
            error_outro: default_error_outro(),
        }
    }
}

impl AssistantConfig {
    /// Build the reply shown when an exchange fails: the error, the fact sheet, a pointer onward
    pub fn failure_message(&self, error: &str) -> String {
        let intro = self.error_intro.replace("{error}", error);
        let facts = self
            .fact_sheet
            .iter()
            .map(|fact| format!("• {fact}"))
            .collect::<Vec<_>>()
            .join("\n");
        format!("{intro}\n\n{facts}\n\n{}", self.error_outro)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration, then apply environment overrides
    pub fn from_toml_str(content: &str) -> crate::Result<Self> {
        let mut config: Self = toml::from_str(content)?;
        config.override_api_token(std::env::var(API_TOKEN_ENV).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default config file path
    pub fn load() -> crate::Result<Self> {
        // Try to load from config.toml first, then fall back to config.example.toml
        if Path::new("config.toml").exists() {
            Self::from_file("config.toml")
        } else if Path::new("config.example.toml").exists() {
            eprintln!(
                "Warning: Using config.example.toml. Please create config.toml for production use."
            );
            Self::from_file("config.example.toml")
        } else {
            Err(crate::FolioChatError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "No config file found. Please create config.toml or config.example.toml",
            )))
        }
    }

    /// Replace the configured token when a non-empty override is given
    pub fn override_api_token(&mut self, token: Option<String>) {
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.agent.api_token = Some(token.trim().to_string());
        }
    }

    pub fn validate(&self) -> crate::Result<()> {
        url::Url::parse(&self.agent.endpoint).map_err(|e| {
            crate::FolioChatError::ConfigError(format!(
                "agent.endpoint '{}' is not a valid URL: {e}",
                self.agent.endpoint
            ))
        })?;
        if self.agent.bot_id.trim().is_empty() {
            return Err(crate::FolioChatError::ConfigError(
                "agent.bot_id must be set".to_string(),
            ));
        }
        if self.session.storage_key.trim().is_empty() {
            return Err(crate::FolioChatError::ConfigError(
                "session.storage_key must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Get agent endpoint
    pub fn agent_endpoint(&self) -> &str {
        &self.agent.endpoint
    }

    /// Get bot identifier sent with every request
    pub fn bot_id(&self) -> &str {
        &self.agent.bot_id
    }

    /// Get agent API token
    pub fn api_token(&self) -> Option<&str> {
        self.agent.api_token.as_deref()
    }

    /// Get request timeout
    pub fn request_timeout(&self) -> Option<Duration> {
        self.agent.request_timeout_secs.map(Duration::from_secs)
    }

    /// Path of the key-value file that persists the session identifier
    pub fn session_store_path(&self) -> PathBuf {
        self.session.store_path.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("foliochat")
                .join("state.json")
        })
    }

    /// Get the key under which the session identifier is stored
    pub fn storage_key(&self) -> &str {
        &self.session.storage_key
    }
}
